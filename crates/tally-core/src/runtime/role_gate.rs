// crates/tally-core/src/runtime/role_gate.rs
// ============================================================================
// Module: Tally Role Gate
// Description: Tenant-scoped role checks for mutating operations.
// Purpose: Require a privileged role in addition to scope access for writes.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The role gate layers on top of the scope authorizer for mutating
//! operations (create, update, disable). Pure reads require scope access
//! only; writes additionally require the caller to hold one of a fixed set
//! of privileged roles within the relevant tenant. A caller with
//! tenant-level scope access but no qualifying role can read everything in
//! the tenant but cannot write.
//!
//! Invariants:
//! - The gate is a pure decision function; the only state that changes is
//!   the persisted role rows, mutated by separately gated endpoints.
//! - No role assignments resolves to deny, never to an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::PrincipalId;
use crate::core::identifiers::RoleName;
use crate::core::identifiers::TenantId;
use crate::interfaces::RoleStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Role names that qualify a caller for mutating operations by default.
pub const DEFAULT_WRITE_ROLES: &[&str] = &["Admin", "Manager"];

// ============================================================================
// SECTION: Decisions
// ============================================================================

/// Role gate decision outcome.
///
/// # Invariants
/// - `allowed` is the authoritative decision for the request.
/// - `reason` is a stable label for audit sinks; on allow it names the
///   qualifying role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDecision {
    /// Whether the write is allowed.
    pub allowed: bool,
    /// Reason label for audit logs.
    pub reason: String,
}

// ============================================================================
// SECTION: Role Gate
// ============================================================================

/// Stateless role gate over an injected role store.
#[derive(Debug, Clone)]
pub struct RoleGate<R> {
    /// Role assignments backing the gate.
    roles: R,
    /// Role names that qualify a caller for writes.
    allowed_roles: BTreeSet<RoleName>,
}

impl<R: RoleStore> RoleGate<R> {
    /// Creates a role gate with the default `Admin`/`Manager` write roles.
    #[must_use]
    pub fn new(roles: R) -> Self {
        let allowed_roles =
            DEFAULT_WRITE_ROLES.iter().map(|name| RoleName::new(*name)).collect();
        Self {
            roles,
            allowed_roles,
        }
    }

    /// Creates a role gate with an explicit qualifying role set.
    ///
    /// An empty set denies every write; configuration validation should
    /// reject it upstream.
    #[must_use]
    pub const fn with_allowed_roles(roles: R, allowed_roles: BTreeSet<RoleName>) -> Self {
        Self {
            roles,
            allowed_roles,
        }
    }

    /// Returns the qualifying role set.
    #[must_use]
    pub const fn allowed_roles(&self) -> &BTreeSet<RoleName> {
        &self.allowed_roles
    }

    /// Decides whether the caller may perform a mutating operation within a
    /// tenant.
    ///
    /// Loads the caller's role assignments scoped to the tenant and allows
    /// when the intersection with the qualifying set is non-empty. This gate
    /// is applied in addition to scope access, never instead of it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the role lookup cannot complete.
    pub fn check_write_role(
        &self,
        caller: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<RoleDecision, StoreError> {
        let held = self.roles.role_names_for(caller, tenant_id)?;
        for name in held {
            if self.allowed_roles.contains(&name) {
                return Ok(RoleDecision {
                    allowed: true,
                    reason: format!("role:{name}"),
                });
            }
        }
        Ok(RoleDecision {
            allowed: false,
            reason: "no_qualifying_role".to_string(),
        })
    }
}
