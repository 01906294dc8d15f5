// crates/tally-core/tests/authorization.rs
// ============================================================================
// Module: Authorization Tests
// Description: Tests for ranked scope access decisions and membership admin.
// ============================================================================
//! ## Overview
//! Validates tier escalation, fail-closed denial, cross-tenant isolation,
//! and the tenant-ownership guard on account membership grants.

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

use tally_core::AccessScope;
use tally_core::Account;
use tally_core::AccountId;
use tally_core::AccountStore;
use tally_core::Address;
use tally_core::InMemoryStore;
use tally_core::LookupId;
use tally_core::MembershipAdmin;
use tally_core::MembershipAdminError;
use tally_core::MembershipStore;
use tally_core::NewAccount;
use tally_core::NewTenant;
use tally_core::PrincipalId;
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

fn seed_account(store: &InMemoryStore, tenant: &Tenant, lookup: &str) -> Account {
    store
        .create_account(NewAccount {
            tenant_id: tenant.id,
            name: format!("{lookup} account"),
            address: Address {
                street: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                region: "IL".to_string(),
                postal_code: "62701".to_string(),
                country: "US".to_string(),
            },
            lookup_id: LookupId::new(lookup),
            created_at: now(),
        })
        .unwrap()
}

fn authorizer(store: &InMemoryStore) -> ScopeAuthorizer<InMemoryStore, InMemoryStore> {
    ScopeAuthorizer::new(store.clone(), store.clone())
}

// ============================================================================
// SECTION: Tier Escalation
// ============================================================================

#[test]
fn account_member_allowed_at_account_scope_only() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let account = seed_account(&store, &tenant, "acct-1");
    let caller = principal(10);
    store.grant_account_membership(caller, account.id).unwrap();

    let authz = authorizer(&store);
    let at_account = authz.check_account_access(caller, account.id).unwrap();
    assert!(at_account.allowed);
    assert_eq!(at_account.reason, "account_member");

    let at_tenant = authz.check_tenant_access(caller, tenant.id).unwrap();
    assert!(!at_tenant.allowed);
    let at_app = authz.check_application_access(caller).unwrap();
    assert!(!at_app.allowed);
}

#[test]
fn tenant_member_allowed_for_every_owned_account() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let first = seed_account(&store, &tenant, "acct-1");
    let second = seed_account(&store, &tenant, "acct-2");
    let caller = principal(11);
    store.grant_tenant_membership(caller, tenant.id).unwrap();

    let authz = authorizer(&store);
    for account in [first, second] {
        let decision = authz.check_account_access(caller, account.id).unwrap();
        assert!(decision.allowed);
        assert_eq!(decision.reason, "tenant_member");
    }
    assert!(authz.check_tenant_access(caller, tenant.id).unwrap().allowed);
    assert!(!authz.check_application_access(caller).unwrap().allowed);
}

#[test]
fn application_member_allowed_everywhere() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let account = seed_account(&store, &tenant, "acct-1");
    let caller = principal(12);
    store.grant_application_membership(caller).unwrap();

    let authz = authorizer(&store);
    let decision = authz.check_account_access(caller, account.id).unwrap();
    assert!(decision.allowed);
    assert_eq!(decision.reason, "application_member");
    assert!(authz.check_tenant_access(caller, tenant.id).unwrap().allowed);
    assert!(authz.check_application_access(caller).unwrap().allowed);
}

#[test]
fn generic_check_matches_scope_wrappers() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let account = seed_account(&store, &tenant, "acct-1");
    let caller = principal(13);
    store.grant_tenant_membership(caller, tenant.id).unwrap();

    let authz = authorizer(&store);
    let generic = authz
        .check_access(caller, AccessScope::Account(account.id))
        .unwrap();
    let wrapper = authz.check_account_access(caller, account.id).unwrap();
    assert_eq!(generic, wrapper);
}

// ============================================================================
// SECTION: Fail-Closed Denial
// ============================================================================

#[test]
fn principal_with_no_memberships_denied_at_every_scope() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let account = seed_account(&store, &tenant, "acct-1");
    let caller = principal(20);

    let authz = authorizer(&store);
    for scope in [
        AccessScope::Account(account.id),
        AccessScope::Tenant(tenant.id),
        AccessScope::Application,
    ] {
        let decision = authz.check_access(caller, scope).unwrap();
        assert!(!decision.allowed);
        assert_eq!(decision.reason, "no_membership");
    }
}

#[test]
fn missing_account_still_consults_application_tier() {
    let store = InMemoryStore::new();
    let ghost = AccountId::from_raw(999).unwrap();
    let operator = principal(21);
    let stranger = principal(22);
    store.grant_application_membership(operator).unwrap();

    let authz = authorizer(&store);
    let allowed = authz.check_account_access(operator, ghost).unwrap();
    assert!(allowed.allowed);
    assert_eq!(allowed.reason, "application_member");

    let denied = authz.check_account_access(stranger, ghost).unwrap();
    assert!(!denied.allowed);
}

#[test]
fn disabled_account_treated_as_missing() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let account = seed_account(&store, &tenant, "acct-1");
    let caller = principal(23);
    store.grant_account_membership(caller, account.id).unwrap();
    store.disable_account(account.id, now()).unwrap();

    let authz = authorizer(&store);
    let decision = authz.check_account_access(caller, account.id).unwrap();
    assert!(!decision.allowed);
}

#[test]
fn revocation_returns_to_denial() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let caller = principal(24);
    store.grant_tenant_membership(caller, tenant.id).unwrap();

    let authz = authorizer(&store);
    assert!(authz.check_tenant_access(caller, tenant.id).unwrap().allowed);

    store.revoke_tenant_membership(caller, tenant.id).unwrap();
    assert!(!authz.check_tenant_access(caller, tenant.id).unwrap().allowed);
}

// ============================================================================
// SECTION: Cross-Tenant Isolation
// ============================================================================

#[test]
fn tenant_member_denied_for_other_tenants_accounts() {
    let store = InMemoryStore::new();
    let home = seed_tenant(&store, "acme");
    let other = seed_tenant(&store, "globex");
    let foreign_account = seed_account(&store, &other, "acct-x");
    let caller = principal(30);
    store.grant_tenant_membership(caller, home.id).unwrap();

    let authz = authorizer(&store);
    let at_foreign_tenant = authz.check_tenant_access(caller, other.id).unwrap();
    assert!(!at_foreign_tenant.allowed);
    let at_foreign_account = authz.check_account_access(caller, foreign_account.id).unwrap();
    assert!(!at_foreign_account.allowed);
}

// ============================================================================
// SECTION: Membership Admin
// ============================================================================

#[test]
fn account_grant_rejects_foreign_tenant() {
    let store = InMemoryStore::new();
    let home = seed_tenant(&store, "acme");
    let other = seed_tenant(&store, "globex");
    let account = seed_account(&store, &home, "acct-1");
    let admin = MembershipAdmin::new(store.clone(), store.clone());

    let err = admin
        .grant_account_membership(principal(40), account.id, other.id)
        .unwrap_err();
    assert!(matches!(err, MembershipAdminError::CrossTenant { .. }));
    assert!(!store.is_account_member(principal(40), account.id).unwrap());
}

#[test]
fn account_grant_rejects_missing_account() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let admin = MembershipAdmin::new(store.clone(), store.clone());

    let ghost = AccountId::from_raw(777).unwrap();
    let err = admin
        .grant_account_membership(principal(41), ghost, tenant.id)
        .unwrap_err();
    assert!(matches!(err, MembershipAdminError::AccountNotFound(id) if id == ghost));
}

#[test]
fn account_grant_and_revoke_round_trip() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let account = seed_account(&store, &tenant, "acct-1");
    let admin = MembershipAdmin::new(store.clone(), store.clone());
    let caller = principal(42);

    admin
        .grant_account_membership(caller, account.id, tenant.id)
        .unwrap();
    assert!(store.is_account_member(caller, account.id).unwrap());

    admin.revoke_account_membership(caller, account.id).unwrap();
    assert!(!store.is_account_member(caller, account.id).unwrap());
}
