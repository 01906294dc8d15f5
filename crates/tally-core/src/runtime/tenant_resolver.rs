// crates/tally-core/src/runtime/tenant_resolver.rs
// ============================================================================
// Module: Tally Tenant Resolver
// Description: Resolves the acting tenant from an inbound request origin.
// Purpose: Map host headers and explicit parameters onto tenant records.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Tenant resolution maps an inbound request origin onto a tenant record.
//! An explicit tenant-id parameter wins over the host header; host matching
//! is exact with no wildcard or subdomain logic. Absence of a match is a
//! normal `None` outcome — the caller layer decides how to surface it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::identifiers::HostName;
use crate::core::identifiers::TenantId;
use crate::core::tenant::Tenant;
use crate::interfaces::StoreError;
use crate::interfaces::TenantDirectory;

// ============================================================================
// SECTION: Request Origin
// ============================================================================

/// The tenant-bearing facts extracted from an inbound request.
///
/// # Invariants
/// - This is a pure request container; values are untrusted caller input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin {
    /// Host header value, when present.
    pub host: Option<HostName>,
    /// Explicit tenant-id parameter, when supplied by the caller.
    pub tenant_id: Option<TenantId>,
}

impl RequestOrigin {
    /// Creates an origin from a host header only.
    #[must_use]
    pub const fn from_host(host: HostName) -> Self {
        Self {
            host: Some(host),
            tenant_id: None,
        }
    }

    /// Creates an origin from an explicit tenant-id parameter only.
    #[must_use]
    pub const fn from_tenant_id(tenant_id: TenantId) -> Self {
        Self {
            host: None,
            tenant_id: Some(tenant_id),
        }
    }
}

// ============================================================================
// SECTION: Tenant Resolver
// ============================================================================

/// Stateless tenant resolution service over an injected directory.
#[derive(Debug, Clone)]
pub struct TenantResolver<D> {
    /// Tenant directory backing resolution.
    directory: D,
}

impl<D: TenantDirectory> TenantResolver<D> {
    /// Creates a resolver over the given directory.
    pub const fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Resolves a tenant identifier from an exact host-name match.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the directory lookup cannot complete.
    pub fn resolve_by_host(&self, host: &HostName) -> Result<Option<TenantId>, StoreError> {
        self.directory.tenant_by_host(host)
    }

    /// Loads a tenant record from an explicitly supplied identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the directory lookup cannot complete.
    pub fn resolve_by_id(&self, tenant_id: TenantId) -> Result<Option<Tenant>, StoreError> {
        self.directory.tenant_by_id(tenant_id)
    }

    /// Resolves the acting tenant for a request origin.
    ///
    /// An explicit tenant-id parameter takes precedence over the host
    /// header. A request with neither, or with an unregistered host,
    /// resolves to `None`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a directory lookup cannot complete.
    pub fn resolve_current(&self, origin: &RequestOrigin) -> Result<Option<Tenant>, StoreError> {
        if let Some(tenant_id) = origin.tenant_id {
            return self.directory.tenant_by_id(tenant_id);
        }
        let Some(host) = &origin.host else {
            return Ok(None);
        };
        match self.directory.tenant_by_host(host)? {
            Some(tenant_id) => self.directory.tenant_by_id(tenant_id),
            None => Ok(None),
        }
    }
}
