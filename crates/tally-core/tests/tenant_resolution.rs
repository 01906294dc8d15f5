// crates/tally-core/tests/tenant_resolution.rs
// ============================================================================
// Module: Tenant Resolution Tests
// Description: Tests for host-based and explicit tenant resolution.
// ============================================================================
//! ## Overview
//! Validates host binding uniqueness, normalization, disabled-tenant
//! filtering, and origin precedence in the resolver.

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

use tally_core::HostName;
use tally_core::InMemoryStore;
use tally_core::NewTenant;
use tally_core::RequestOrigin;
use tally_core::StoreError;
use tally_core::Tenant;
use tally_core::TenantDirectory;
use tally_core::TenantResolver;
use tally_core::Timestamp;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn now() -> Timestamp {
    Timestamp::from_unix_millis(1_700_000_000_000)
}

fn seed_tenant(store: &InMemoryStore, name: &str) -> Tenant {
    store
        .create_tenant(NewTenant {
            name: name.to_string(),
            created_at: now(),
        })
        .unwrap()
}

// ============================================================================
// SECTION: Host Bindings
// ============================================================================

#[test]
fn multiple_hosts_resolve_to_one_tenant() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "aiken");
    let dev = HostName::new("aiken.dev-1.example.com");
    let uat = HostName::new("aiken.uat-1.example.com");
    store.bind_host(dev.clone(), tenant.id).unwrap();
    store.bind_host(uat.clone(), tenant.id).unwrap();

    let resolver = TenantResolver::new(store);
    assert_eq!(resolver.resolve_by_host(&dev).unwrap(), Some(tenant.id));
    assert_eq!(resolver.resolve_by_host(&uat).unwrap(), Some(tenant.id));
}

#[test]
fn host_cannot_be_bound_to_two_tenants() {
    let store = InMemoryStore::new();
    let first = seed_tenant(&store, "acme");
    let second = seed_tenant(&store, "globex");
    let host = HostName::new("billing.example.com");
    store.bind_host(host.clone(), first.id).unwrap();

    let err = store.bind_host(host.clone(), second.id).unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
    assert_eq!(store.tenant_by_host(&host).unwrap(), Some(first.id));
}

#[test]
fn rebinding_host_to_same_tenant_is_idempotent() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let host = HostName::new("billing.example.com");
    store.bind_host(host.clone(), tenant.id).unwrap();
    store.bind_host(host.clone(), tenant.id).unwrap();
    assert_eq!(store.tenant_by_host(&host).unwrap(), Some(tenant.id));
}

#[test]
fn host_matching_is_case_insensitive_via_normalization() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    store
        .bind_host(HostName::new("Billing.Example.COM"), tenant.id)
        .unwrap();

    let resolver = TenantResolver::new(store);
    let lookup = HostName::new("billing.example.com");
    assert_eq!(resolver.resolve_by_host(&lookup).unwrap(), Some(tenant.id));
}

#[test]
fn unknown_host_resolves_to_none() {
    let store = InMemoryStore::new();
    seed_tenant(&store, "acme");
    let resolver = TenantResolver::new(store);
    let host = HostName::new("nowhere.example.com");
    assert_eq!(resolver.resolve_by_host(&host).unwrap(), None);
}

// ============================================================================
// SECTION: Origin Precedence
// ============================================================================

#[test]
fn explicit_tenant_id_wins_over_host() {
    let store = InMemoryStore::new();
    let by_host = seed_tenant(&store, "acme");
    let explicit = seed_tenant(&store, "globex");
    let host = HostName::new("acme.example.com");
    store.bind_host(host.clone(), by_host.id).unwrap();

    let resolver = TenantResolver::new(store);
    let origin = RequestOrigin {
        host: Some(host),
        tenant_id: Some(explicit.id),
    };
    let resolved = resolver.resolve_current(&origin).unwrap().unwrap();
    assert_eq!(resolved.id, explicit.id);
}

#[test]
fn host_origin_resolves_full_record() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let host = HostName::new("acme.example.com");
    store.bind_host(host.clone(), tenant.id).unwrap();

    let resolver = TenantResolver::new(store);
    let resolved = resolver
        .resolve_current(&RequestOrigin::from_host(host))
        .unwrap()
        .unwrap();
    assert_eq!(resolved.id, tenant.id);
    assert_eq!(resolved.name, "acme");
}

#[test]
fn empty_origin_resolves_to_none() {
    let store = InMemoryStore::new();
    seed_tenant(&store, "acme");
    let resolver = TenantResolver::new(store);
    let origin = RequestOrigin {
        host: None,
        tenant_id: None,
    };
    assert_eq!(resolver.resolve_current(&origin).unwrap(), None);
}

// ============================================================================
// SECTION: Disabled Tenants
// ============================================================================

#[test]
fn disabled_tenant_resolves_to_none() {
    let store = InMemoryStore::new();
    let tenant = seed_tenant(&store, "acme");
    let host = HostName::new("acme.example.com");
    store.bind_host(host.clone(), tenant.id).unwrap();
    store.disable_tenant(tenant.id).unwrap();

    let resolver = TenantResolver::new(store);
    assert_eq!(
        resolver.resolve_current(&RequestOrigin::from_host(host)).unwrap(),
        None
    );
    assert_eq!(resolver.resolve_by_id(tenant.id).unwrap(), None);
}
