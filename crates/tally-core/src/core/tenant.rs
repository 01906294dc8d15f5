// crates/tally-core/src/core/tenant.rs
// ============================================================================
// Module: Tally Tenant Model
// Description: Tenant records and host-name bindings for tenant resolution.
// Purpose: Model the top-level multi-tenancy boundary and its inbound origins.
// Dependencies: serde, crate::core
// ============================================================================

//! ## Overview
//! A tenant is an isolated customer organization. Tenants own zero or more
//! host names (used only for inbound tenant resolution) and zero or more
//! accounts. Tenant and host rows are created by out-of-band provisioning,
//! never by normal CRUD traffic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::HostName;
use crate::core::identifiers::TenantId;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Tenant Records
// ============================================================================

/// A tenant record.
///
/// # Invariants
/// - Disabled tenants remain persisted; they are excluded from resolution by
///   stores, not deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant identifier.
    pub id: TenantId,
    /// Human-readable display name.
    pub name: String,
    /// Soft-disable flag.
    pub disabled: bool,
    /// Creation timestamp supplied by the provisioning caller.
    pub created_at: Timestamp,
    /// Last-update timestamp supplied by the mutating caller.
    pub updated_at: Timestamp,
}

/// Fields required to provision a new tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTenant {
    /// Human-readable display name.
    pub name: String,
    /// Creation timestamp supplied by the provisioning caller.
    pub created_at: Timestamp,
}

/// A host name bound to a tenant for inbound resolution.
///
/// # Invariants
/// - `host` is globally unique; many hosts may bind to one tenant.
/// - Rows are provisioning data and are never mutated by CRUD traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantHost {
    /// Normalized host name.
    pub host: HostName,
    /// Owning tenant identifier.
    pub tenant_id: TenantId,
}
