// crates/tally-core/src/core/mod.rs
// ============================================================================
// Module: Tally Core Domain
// Description: Domain types for tenants, accounts, memberships, and billing.
// Purpose: Group the pure data model consumed by interfaces and runtime.
// Dependencies: serde, bigdecimal, time
// ============================================================================

//! ## Overview
//! The domain model is pure data: identifiers, calendar values, money, and
//! the persisted record shapes. No module here performs storage access or
//! holds mutable state.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod account;
pub mod billing;
pub mod identifiers;
pub mod membership;
pub mod money;
pub mod principal;
pub mod tenant;
pub mod time;
