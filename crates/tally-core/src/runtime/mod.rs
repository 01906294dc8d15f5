// crates/tally-core/src/runtime/mod.rs
// ============================================================================
// Module: Tally Runtime
// Description: Decision services composed over the store interfaces.
// Purpose: Group tenant resolution, authorization, and schedule generation.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Runtime services are stateless decision functions over injected stores.
//! Each call takes explicit arguments (caller id, scope id, as-of date)
//! rather than reading ambient request state, and every decision fails
//! closed on missing data.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod authorizer;
pub mod generator;
pub mod membership_admin;
pub mod memory;
pub mod recurrence;
pub mod role_gate;
pub mod tenant_resolver;
