// crates/tally-core/src/interfaces/mod.rs
// ============================================================================
// Module: Tally Interfaces
// Description: Backend-agnostic interfaces for directory, membership, and billing stores.
// Purpose: Define the contract surfaces used by the Tally decision runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Tally integrates with a persistence backend without
//! embedding backend-specific details. Implementations must be deterministic
//! and fail closed on missing or invalid data: absence of a row is a normal
//! `None` or `false`, never an error. Only genuine infrastructure failures
//! surface as [`StoreError`].
//!
//! Security posture: interface implementations consume untrusted
//! identifiers supplied by the caller layer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;
use time::Date;

use crate::core::account::Account;
use crate::core::account::NewAccount;
use crate::core::account::UpdateAccount;
use crate::core::billing::Bill;
use crate::core::billing::BillSchedule;
use crate::core::billing::NewBill;
use crate::core::billing::NewSchedule;
use crate::core::identifiers::AccountId;
use crate::core::identifiers::BillId;
use crate::core::identifiers::HostName;
use crate::core::identifiers::LookupId;
use crate::core::identifiers::PrincipalId;
use crate::core::identifiers::RoleId;
use crate::core::identifiers::RoleName;
use crate::core::identifiers::ScheduleId;
use crate::core::identifiers::TenantId;
use crate::core::tenant::NewTenant;
use crate::core::tenant::Tenant;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Persistence-layer errors shared by every store interface.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - A [`StoreError`] is never used to signal an access denial or a missing
///   row; those are ordinary return values.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("store invalid data: {0}")]
    Invalid(String),
    /// Store backend reported an error.
    #[error("store error: {0}")]
    Store(String),
    /// Store cannot currently be reached; callers may retry at their layer.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

// ============================================================================
// SECTION: Tenant Directory
// ============================================================================

/// Persisted mapping from request origin to tenant.
pub trait TenantDirectory {
    /// Resolves a tenant identifier from an exact host-name match.
    ///
    /// Absence of a binding is a normal `None`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup cannot complete.
    fn tenant_by_host(&self, host: &HostName) -> Result<Option<TenantId>, StoreError>;

    /// Loads a tenant record by identifier, excluding disabled tenants.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup cannot complete.
    fn tenant_by_id(&self, tenant_id: TenantId) -> Result<Option<Tenant>, StoreError>;

    /// Provisions a tenant record (out-of-band provisioning surface).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn create_tenant(&self, tenant: NewTenant) -> Result<Tenant, StoreError>;

    /// Binds a host name to a tenant (out-of-band provisioning surface).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the binding conflicts or cannot be written.
    fn bind_host(&self, host: HostName, tenant_id: TenantId) -> Result<(), StoreError>;

    /// Reports directory readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the directory is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Membership Store
// ============================================================================

/// Persisted membership sets for the three trust tiers.
pub trait MembershipStore {
    /// Tests application-wide membership.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup cannot complete.
    fn is_application_member(&self, principal_id: PrincipalId) -> Result<bool, StoreError>;

    /// Tests tenant-level membership.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup cannot complete.
    fn is_tenant_member(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<bool, StoreError>;

    /// Tests account-level membership.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup cannot complete.
    fn is_account_member(
        &self,
        principal_id: PrincipalId,
        account_id: AccountId,
    ) -> Result<bool, StoreError>;

    /// Grants application-wide membership; idempotent on the pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn grant_application_membership(&self, principal_id: PrincipalId) -> Result<(), StoreError>;

    /// Grants tenant-level membership; idempotent on the pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn grant_tenant_membership(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<(), StoreError>;

    /// Grants account-level membership; idempotent on the pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn grant_account_membership(
        &self,
        principal_id: PrincipalId,
        account_id: AccountId,
    ) -> Result<(), StoreError>;

    /// Revokes application-wide membership; absent pairs are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn revoke_application_membership(&self, principal_id: PrincipalId) -> Result<(), StoreError>;

    /// Revokes tenant-level membership; absent pairs are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn revoke_tenant_membership(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<(), StoreError>;

    /// Revokes account-level membership; absent pairs are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn revoke_account_membership(
        &self,
        principal_id: PrincipalId,
        account_id: AccountId,
    ) -> Result<(), StoreError>;

    /// Reports membership store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Role Store
// ============================================================================

/// Persisted tenant-scoped roles and assignments.
pub trait RoleStore {
    /// Returns the role names held by a principal within a tenant.
    ///
    /// A principal with no assignments yields an empty set, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup cannot complete.
    fn role_names_for(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<Vec<RoleName>, StoreError>;

    /// Defines a role within a tenant; the name is unique per tenant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the role conflicts or cannot be written.
    fn define_role(&self, tenant_id: TenantId, name: RoleName) -> Result<RoleId, StoreError>;

    /// Assigns a role to a principal; idempotent on the pair.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn assign_role(&self, principal_id: PrincipalId, role_id: RoleId) -> Result<(), StoreError>;

    /// Revokes a role from a principal; absent pairs are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn revoke_role(&self, principal_id: PrincipalId, role_id: RoleId) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Account Store
// ============================================================================

/// Persisted account records.
pub trait AccountStore {
    /// Loads an account by identifier, excluding disabled accounts.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup cannot complete.
    fn account_by_id(&self, account_id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Loads an account by its tenant-scoped lookup identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup cannot complete.
    fn account_by_lookup(
        &self,
        tenant_id: TenantId,
        lookup_id: &LookupId,
    ) -> Result<Option<Account>, StoreError>;

    /// Lists enabled accounts owned by a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the listing cannot complete.
    fn accounts_for_tenant(&self, tenant_id: TenantId) -> Result<Vec<Account>, StoreError>;

    /// Creates an account, assigning its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when the tenant-scoped lookup
    /// identifier conflicts, and other variants when the write cannot
    /// complete.
    fn create_account(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Applies a partial update to an enabled account.
    ///
    /// Returns the updated record, or `None` when the account is missing or
    /// disabled.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn update_account(
        &self,
        account_id: AccountId,
        update: UpdateAccount,
        updated_at: Timestamp,
    ) -> Result<Option<Account>, StoreError>;

    /// Soft-disables an account; already-disabled accounts are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn disable_account(
        &self,
        account_id: AccountId,
        updated_at: Timestamp,
    ) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Schedule Store
// ============================================================================

/// Persisted recurring schedule descriptors.
pub trait ScheduleStore {
    /// Loads a schedule by identifier, excluding disabled schedules.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup cannot complete.
    fn schedule_by_id(&self, schedule_id: ScheduleId)
    -> Result<Option<BillSchedule>, StoreError>;

    /// Lists enabled schedules owned by an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the listing cannot complete.
    fn schedules_for_account(
        &self,
        account_id: AccountId,
    ) -> Result<Vec<BillSchedule>, StoreError>;

    /// Lists enabled schedules whose validity window contains `as_of`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the listing cannot complete.
    fn active_schedules(&self, as_of: Date) -> Result<Vec<BillSchedule>, StoreError>;

    /// Creates a schedule after descriptor validation, assigning its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] when descriptor validation fails, and
    /// other variants when the write cannot complete.
    fn create_schedule(&self, schedule: NewSchedule) -> Result<BillSchedule, StoreError>;

    /// Soft-disables a schedule; already-disabled schedules are a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn disable_schedule(
        &self,
        schedule_id: ScheduleId,
        updated_at: Timestamp,
    ) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Bill Store
// ============================================================================

/// Outcome of an idempotent schedule-driven bill creation.
///
/// # Invariants
/// - `AlreadyExists` means a bill for the (schedule, due date) pair was
///   already persisted; the call changed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillOutcome {
    /// A new bill row was created.
    Created(Bill),
    /// A bill for this occurrence already existed.
    AlreadyExists,
}

/// Persisted bill records.
pub trait BillStore {
    /// Loads a bill by identifier, excluding disabled bills.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the lookup cannot complete.
    fn bill_by_id(&self, bill_id: BillId) -> Result<Option<Bill>, StoreError>;

    /// Lists enabled bills owned by an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the listing cannot complete.
    fn bills_for_account(&self, account_id: AccountId) -> Result<Vec<Bill>, StoreError>;

    /// Creates a bill, assigning its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn create_bill(&self, bill: NewBill) -> Result<Bill, StoreError>;

    /// Creates a bill for a schedule occurrence, idempotent per
    /// (schedule id, due date).
    ///
    /// Safe under at-least-once invocation of a periodic generator job.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write cannot complete.
    fn create_from_schedule(
        &self,
        schedule: &BillSchedule,
        due_date: Date,
        created_at: Timestamp,
    ) -> Result<BillOutcome, StoreError>;
}
