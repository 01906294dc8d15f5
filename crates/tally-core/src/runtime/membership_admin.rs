// crates/tally-core/src/runtime/membership_admin.rs
// ============================================================================
// Module: Tally Membership Admin
// Description: Validated membership grant and revoke operations.
// Purpose: Guard membership writes against cross-tenant injection.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Membership and role rows are mutated only through dedicated endpoints,
//! themselves gated by the scope authorizer and role gate. This module adds
//! the one validation those endpoints need beyond gating: an account-level
//! membership grant must name an account that belongs to the expected
//! tenant, so a tenant administrator cannot inject members into another
//! tenant's accounts.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::PrincipalId;
use crate::core::identifiers::TenantId;
use crate::interfaces::AccountStore;
use crate::interfaces::MembershipStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Membership mutation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - `AccountNotFound` and `CrossTenant` are validation failures, not access
///   denials; the caller layer has already gated the request.
#[derive(Debug, Error)]
pub enum MembershipAdminError {
    /// Target account does not exist or is disabled.
    #[error("membership target account not found: {0}")]
    AccountNotFound(AccountId),
    /// Target account belongs to a different tenant than expected.
    #[error("membership target account {account_id} is not owned by tenant {tenant_id}")]
    CrossTenant {
        /// Target account identifier.
        account_id: AccountId,
        /// Tenant the grant was issued under.
        tenant_id: TenantId,
    },
    /// Underlying store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Membership Admin
// ============================================================================

/// Validated membership mutation service over injected stores.
#[derive(Debug, Clone)]
pub struct MembershipAdmin<M, A> {
    /// Membership sets being mutated.
    memberships: M,
    /// Account records used for ownership validation.
    accounts: A,
}

impl<M: MembershipStore, A: AccountStore> MembershipAdmin<M, A> {
    /// Creates a membership admin over the given stores.
    pub const fn new(memberships: M, accounts: A) -> Self {
        Self {
            memberships,
            accounts,
        }
    }

    /// Grants application-wide membership.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipAdminError::Store`] when the write cannot
    /// complete.
    pub fn grant_application_membership(
        &self,
        principal_id: PrincipalId,
    ) -> Result<(), MembershipAdminError> {
        Ok(self.memberships.grant_application_membership(principal_id)?)
    }

    /// Grants tenant-level membership.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipAdminError::Store`] when the write cannot
    /// complete.
    pub fn grant_tenant_membership(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<(), MembershipAdminError> {
        Ok(self.memberships.grant_tenant_membership(principal_id, tenant_id)?)
    }

    /// Grants account-level membership after validating account ownership.
    ///
    /// The target account must exist, be enabled, and be owned by
    /// `tenant_id` — the tenant the granting endpoint was gated under.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipAdminError::AccountNotFound`] for missing or
    /// disabled accounts, [`MembershipAdminError::CrossTenant`] when the
    /// account is owned by a different tenant, and
    /// [`MembershipAdminError::Store`] when a lookup or write cannot
    /// complete.
    pub fn grant_account_membership(
        &self,
        principal_id: PrincipalId,
        account_id: AccountId,
        tenant_id: TenantId,
    ) -> Result<(), MembershipAdminError> {
        let Some(account) = self.accounts.account_by_id(account_id)? else {
            return Err(MembershipAdminError::AccountNotFound(account_id));
        };
        if account.tenant_id != tenant_id {
            return Err(MembershipAdminError::CrossTenant {
                account_id,
                tenant_id,
            });
        }
        Ok(self.memberships.grant_account_membership(principal_id, account_id)?)
    }

    /// Revokes application-wide membership.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipAdminError::Store`] when the write cannot
    /// complete.
    pub fn revoke_application_membership(
        &self,
        principal_id: PrincipalId,
    ) -> Result<(), MembershipAdminError> {
        Ok(self.memberships.revoke_application_membership(principal_id)?)
    }

    /// Revokes tenant-level membership.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipAdminError::Store`] when the write cannot
    /// complete.
    pub fn revoke_tenant_membership(
        &self,
        principal_id: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<(), MembershipAdminError> {
        Ok(self.memberships.revoke_tenant_membership(principal_id, tenant_id)?)
    }

    /// Revokes account-level membership.
    ///
    /// Revocation needs no ownership validation: removing a pair that the
    /// grant path validated cannot widen access.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipAdminError::Store`] when the write cannot
    /// complete.
    pub fn revoke_account_membership(
        &self,
        principal_id: PrincipalId,
        account_id: AccountId,
    ) -> Result<(), MembershipAdminError> {
        Ok(self.memberships.revoke_account_membership(principal_id, account_id)?)
    }
}
