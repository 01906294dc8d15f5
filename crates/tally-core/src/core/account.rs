// crates/tally-core/src/core/account.rs
// ============================================================================
// Module: Tally Account Model
// Description: Billable account records owned by tenants.
// Purpose: Model accounts, their billing addresses, and mutation shapes.
// Dependencies: serde, crate::core
// ============================================================================

//! ## Overview
//! An account is a billable entity (for example a service address) owned by
//! exactly one tenant. Accounts carry an external lookup identifier that is
//! unique within the owning tenant and a soft-disable flag; disabled
//! accounts are excluded from all normal queries but never physically
//! deleted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::LookupId;
use crate::core::identifiers::TenantId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Account Records
// ============================================================================

/// Physical or billing address attached to an account.
///
/// # Invariants
/// - Free-form postal fields; no validation is applied by this type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Street line.
    pub street: String,
    /// City or locality.
    pub city: String,
    /// Region, state, or province.
    pub region: String,
    /// Postal or ZIP code.
    pub postal_code: String,
    /// Country name or code.
    pub country: String,
}

/// A billable account record.
///
/// # Invariants
/// - `lookup_id` is unique within `tenant_id` (composite uniqueness enforced
///   by stores).
/// - Disabled accounts are excluded from all normal queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub id: AccountId,
    /// Owning tenant identifier.
    pub tenant_id: TenantId,
    /// Human-readable display name.
    pub name: String,
    /// Physical or billing address.
    pub address: Address,
    /// External lookup identifier, unique within the owning tenant.
    pub lookup_id: LookupId,
    /// Soft-disable flag.
    pub disabled: bool,
    /// Creation timestamp supplied by the creating caller.
    pub created_at: Timestamp,
    /// Last-update timestamp supplied by the mutating caller.
    pub updated_at: Timestamp,
}

/// Fields required to create a new account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    /// Owning tenant identifier.
    pub tenant_id: TenantId,
    /// Human-readable display name.
    pub name: String,
    /// Physical or billing address.
    pub address: Address,
    /// External lookup identifier, unique within the owning tenant.
    pub lookup_id: LookupId,
    /// Creation timestamp supplied by the creating caller.
    pub created_at: Timestamp,
}

/// Fields that can be updated on an existing account.
///
/// # Invariants
/// - `None` fields are left unchanged; the owning tenant and lookup
///   identifier are immutable after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateAccount {
    /// Replacement display name.
    pub name: Option<String>,
    /// Replacement address.
    pub address: Option<Address>,
}
