// crates/tally-core/src/lib.rs
// ============================================================================
// Module: Tally Core Library
// Description: Domain model, store interfaces, and decision runtime for Tally.
// Purpose: Provide the multi-tenant authorization and billing schedule core.
// Dependencies: serde, thiserror, bigdecimal, time
// ============================================================================

//! ## Overview
//! Tally Core is the decision heart of a multi-tenant billing back end. It
//! resolves the acting tenant from a request origin, extracts the caller from
//! a verified principal, answers scoped access questions over a three-tier
//! trust hierarchy (application > tenant > account), gates mutating
//! operations behind tenant-scoped roles, and models recurring bill
//! schedules with deterministic occurrence math.
//!
//! Invariants:
//! - Every access decision fails closed: missing data is a deny, never an
//!   exception a caller could mishandle into an allow.
//! - Denials are ordinary values; only infrastructure failures surface as
//!   [`StoreError`].
//! - The core never reads wall-clock time; hosts supply dates and timestamps.
//!
//! Security posture: callers, claims, and request origins are untrusted
//! input at this boundary.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::account::Account;
pub use core::account::Address;
pub use core::account::NewAccount;
pub use core::account::UpdateAccount;
pub use core::billing::Bill;
pub use core::billing::BillSchedule;
pub use core::billing::NewBill;
pub use core::billing::NewSchedule;
pub use core::billing::ScheduleValidationError;
pub use core::identifiers::AccountId;
pub use core::identifiers::BillId;
pub use core::identifiers::HostName;
pub use core::identifiers::LookupId;
pub use core::identifiers::PrincipalId;
pub use core::identifiers::RoleId;
pub use core::identifiers::RoleName;
pub use core::identifiers::ScheduleId;
pub use core::identifiers::TenantId;
pub use core::membership::Membership;
pub use core::membership::MembershipScope;
pub use core::membership::Role;
pub use core::membership::RoleAssignment;
pub use core::money::CurrencyCode;
pub use core::money::CurrencyCodeError;
pub use core::money::Money;
pub use core::principal::PRINCIPAL_ID_CLAIM;
pub use core::principal::VerifiedPrincipal;
pub use core::principal::resolve_caller;
pub use core::tenant::NewTenant;
pub use core::tenant::Tenant;
pub use core::tenant::TenantHost;
pub use core::time::FAR_FUTURE;
pub use core::time::Timestamp;
pub use core::time::format_date;
pub use core::time::parse_date;
pub use interfaces::AccountStore;
pub use interfaces::BillOutcome;
pub use interfaces::BillStore;
pub use interfaces::MembershipStore;
pub use interfaces::RoleStore;
pub use interfaces::ScheduleStore;
pub use interfaces::StoreError;
pub use interfaces::TenantDirectory;
pub use runtime::authorizer::AccessDecision;
pub use runtime::authorizer::AccessScope;
pub use runtime::authorizer::ScopeAuthorizer;
pub use runtime::generator::BillGenerator;
pub use runtime::generator::GenerationReport;
pub use runtime::membership_admin::MembershipAdmin;
pub use runtime::membership_admin::MembershipAdminError;
pub use runtime::memory::InMemoryStore;
pub use runtime::recurrence::is_active;
pub use runtime::recurrence::next_occurrence;
pub use runtime::recurrence::occurrences_through;
pub use runtime::role_gate::DEFAULT_WRITE_ROLES;
pub use runtime::role_gate::RoleDecision;
pub use runtime::role_gate::RoleGate;
pub use runtime::tenant_resolver::RequestOrigin;
pub use runtime::tenant_resolver::TenantResolver;
