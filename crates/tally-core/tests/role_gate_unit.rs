// crates/tally-core/tests/role_gate_unit.rs
// ============================================================================
// Module: Role Gate Tests
// Description: Tests for tenant-scoped write-role checks.
// ============================================================================
//! ## Overview
//! Validates the default qualifying set, custom sets, tenant scoping of role
//! assignments, and independence of the role gate from scope membership.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use std::collections::BTreeSet;

use tally_core::DEFAULT_WRITE_ROLES;
use tally_core::InMemoryStore;
use tally_core::MembershipStore;
use tally_core::NewTenant;
use tally_core::PrincipalId;
use tally_core::RoleGate;
use tally_core::RoleName;
use tally_core::RoleStore;
use tally_core::ScopeAuthorizer;
use tally_core::Tenant;
use tally_core::TenantDirectory;
use tally_core::Timestamp;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn now() -> Timestamp {
    Timestamp::from_unix_millis(1_700_000_000_000)
}

fn principal(raw: u64) -> PrincipalId {
    PrincipalId::from_raw(raw).unwrap()
}

fn seed_tenant(store: &InMemoryStore, name: &str) -> Tenant {
    store
        .create_tenant(NewTenant {
            name: name.to_string(),
            created_at: now(),
        })
        .unwrap()
}

fn assign(store: &InMemoryStore, tenant: &Tenant, caller: PrincipalId, role: &str) {
    let role_id = store.define_role(tenant.id, RoleName::new(role)).unwrap();
    store.assign_role(caller, role_id).unwrap();
}

// ============================================================================
// SECTION: Default Qualifying Set
// ============================================================================

#[test]
fn admin_and_manager_pass_the_default_gate() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let admin = principal(1);
    let manager = principal(2);
    assign(&store, &tenant, admin, "Admin");
    assign(&store, &tenant, manager, "Manager");

    let gate = RoleGate::new(store);
    let admin_decision = gate.check_write_role(admin, tenant.id).unwrap();
    assert!(admin_decision.allowed);
    assert_eq!(admin_decision.reason, "role:Admin");
    assert!(gate.check_write_role(manager, tenant.id).unwrap().allowed);
}

#[test]
fn non_qualifying_role_is_denied() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let viewer = principal(3);
    assign(&store, &tenant, viewer, "Viewer");

    let gate = RoleGate::new(store);
    let decision = gate.check_write_role(viewer, tenant.id).unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.reason, "no_qualifying_role");
}

#[test]
fn no_assignments_is_denied_not_an_error() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let gate = RoleGate::new(store);
    let decision = gate.check_write_role(principal(4), tenant.id).unwrap();
    assert!(!decision.allowed);
}

#[test]
fn default_set_matches_published_constant() {
    let store = InMemoryStore::new();
    let gate = RoleGate::new(store);
    let expected: BTreeSet<RoleName> =
        DEFAULT_WRITE_ROLES.iter().map(|name| RoleName::new(*name)).collect();
    assert_eq!(*gate.allowed_roles(), expected);
}

// ============================================================================
// SECTION: Custom Qualifying Set
// ============================================================================

#[test]
fn custom_gate_replaces_the_default_set() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let admin = principal(5);
    let auditor = principal(6);
    assign(&store, &tenant, admin, "Admin");
    assign(&store, &tenant, auditor, "Auditor");

    let allowed: BTreeSet<RoleName> = [RoleName::new("Auditor")].into_iter().collect();
    let gate = RoleGate::with_allowed_roles(store, allowed);
    assert!(!gate.check_write_role(admin, tenant.id).unwrap().allowed);
    assert!(gate.check_write_role(auditor, tenant.id).unwrap().allowed);
}

// ============================================================================
// SECTION: Tenant Scoping and Independence
// ============================================================================

#[test]
fn role_in_one_tenant_does_not_qualify_in_another() {
    let store = InMemoryStore::new();
    let home = seed_tenant(&store, "acme");
    let other = seed_tenant(&store, "globex");
    let caller = principal(7);
    assign(&store, &home, caller, "Admin");

    let gate = RoleGate::new(store);
    assert!(gate.check_write_role(caller, home.id).unwrap().allowed);
    assert!(!gate.check_write_role(caller, other.id).unwrap().allowed);
}

#[test]
fn role_check_is_independent_of_scope_membership() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let with_role = principal(8);
    let with_scope = principal(9);
    assign(&store, &tenant, with_role, "Admin");
    store.grant_tenant_membership(with_scope, tenant.id).unwrap();

    let gate = RoleGate::new(store.clone());
    let authz = ScopeAuthorizer::new(store.clone(), store);

    // Role without scope: gate passes, scope check denies.
    assert!(gate.check_write_role(with_role, tenant.id).unwrap().allowed);
    assert!(!authz.check_tenant_access(with_role, tenant.id).unwrap().allowed);

    // Scope without role: scope check allows, gate denies.
    assert!(!gate.check_write_role(with_scope, tenant.id).unwrap().allowed);
    assert!(authz.check_tenant_access(with_scope, tenant.id).unwrap().allowed);
}

#[test]
fn duplicate_role_definition_is_rejected() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    store.define_role(tenant.id, RoleName::new("Admin")).unwrap();
    assert!(store.define_role(tenant.id, RoleName::new("Admin")).is_err());
}

#[test]
fn revoked_role_no_longer_qualifies() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let caller = principal(10);
    let role_id = store.define_role(tenant.id, RoleName::new("Admin")).unwrap();
    store.assign_role(caller, role_id).unwrap();

    let gate = RoleGate::new(store.clone());
    assert!(gate.check_write_role(caller, tenant.id).unwrap().allowed);

    store.revoke_role(caller, role_id).unwrap();
    assert!(!gate.check_write_role(caller, tenant.id).unwrap().allowed);
}
