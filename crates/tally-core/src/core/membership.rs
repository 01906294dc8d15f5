// crates/tally-core/src/core/membership.rs
// ============================================================================
// Module: Tally Membership Model
// Description: Scope memberships, roles, and role assignments.
// Purpose: Model the records backing the three-tier trust hierarchy.
// Dependencies: serde, crate::core
// ============================================================================

//! ## Overview
//! A membership records that a principal belongs to a scope. Scopes form a
//! ranked hierarchy: application membership implies access to every tenant
//! and account, tenant membership implies access to every account under that
//! tenant. Roles are tenant-scoped privilege labels granted through a
//! separate assignment relation and gate mutating operations only.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::PrincipalId;
use crate::core::identifiers::RoleId;
use crate::core::identifiers::RoleName;
use crate::core::identifiers::TenantId;

// ============================================================================
// SECTION: Membership Scopes
// ============================================================================

/// The scope a membership grants access to, ranked broadest first.
///
/// # Invariants
/// - Ordering of variants reflects trust rank: application membership
///   subsumes tenant membership, which subsumes account membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MembershipScope {
    /// Application-wide membership: an implicit super-user over every tenant.
    Application,
    /// Tenant-level membership: implicit member of every account under the tenant.
    Tenant(TenantId),
    /// Account-level membership: narrowest grant.
    Account(AccountId),
}

/// A (principal, scope) membership pair.
///
/// # Invariants
/// - The pair is unique; memberships carry no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Membership {
    /// Member principal.
    pub principal_id: PrincipalId,
    /// Granted scope.
    pub scope: MembershipScope,
}

// ============================================================================
// SECTION: Roles
// ============================================================================

/// A named role scoped to exactly one tenant.
///
/// # Invariants
/// - `name` is unique within `tenant_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role identifier.
    pub id: RoleId,
    /// Owning tenant identifier.
    pub tenant_id: TenantId,
    /// Privilege label, for example `Admin` or `Manager`.
    pub name: RoleName,
}

/// A (principal, role) assignment pair.
///
/// # Invariants
/// - The pair is unique; a principal may hold zero or more roles per tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleAssignment {
    /// Assigned principal.
    pub principal_id: PrincipalId,
    /// Assigned role identifier.
    pub role_id: RoleId,
}
