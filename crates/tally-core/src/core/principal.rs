// crates/tally-core/src/core/principal.rs
// ============================================================================
// Module: Tally Principal Model
// Description: Verified principal claims and caller identity extraction.
// Purpose: Turn identity-provider output into an opaque caller identifier.
// Dependencies: serde, crate::core
// ============================================================================

//! ## Overview
//! Token signing and verification belong to an external identity provider;
//! this module consumes only its output: an already-verified principal
//! carrying a claims map. Identity extraction is total and side-effect
//! free — a missing or malformed claim yields `None`, never an error, so
//! downstream checks fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::PrincipalId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Claim key carrying the opaque caller identifier.
pub const PRINCIPAL_ID_CLAIM: &str = "tally:principal_id";

// ============================================================================
// SECTION: Verified Principal
// ============================================================================

/// An already-authenticated principal handed over by the identity provider.
///
/// # Invariants
/// - Verification happened upstream; claim values are still untrusted text
///   and must be parsed defensively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedPrincipal {
    /// Opaque provider-side subject label.
    pub subject: String,
    /// Claim map as issued by the provider.
    pub claims: BTreeMap<String, String>,
}

impl VerifiedPrincipal {
    /// Creates a principal from a subject and claims map.
    #[must_use]
    pub fn new(subject: impl Into<String>, claims: BTreeMap<String, String>) -> Self {
        Self {
            subject: subject.into(),
            claims,
        }
    }

    /// Returns a claim value by key.
    #[must_use]
    pub fn claim(&self, key: &str) -> Option<&str> {
        self.claims.get(key).map(String::as_str)
    }
}

// ============================================================================
// SECTION: Identity Extraction
// ============================================================================

/// Resolves the caller identifier from a verified principal.
///
/// Reads the [`PRINCIPAL_ID_CLAIM`] claim and parses it as a non-zero
/// fixed-width identifier. Absent, unparseable, or zero values yield `None`.
#[must_use]
pub fn resolve_caller(principal: &VerifiedPrincipal) -> Option<PrincipalId> {
    principal
        .claim(PRINCIPAL_ID_CLAIM)
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .and_then(PrincipalId::from_raw)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    fn principal_with(claim: Option<&str>) -> VerifiedPrincipal {
        let mut claims = BTreeMap::new();
        if let Some(value) = claim {
            claims.insert(PRINCIPAL_ID_CLAIM.to_string(), value.to_string());
        }
        VerifiedPrincipal::new("subject-1", claims)
    }

    #[test]
    fn resolves_well_formed_claim() {
        let caller = resolve_caller(&principal_with(Some("42"))).unwrap();
        assert_eq!(caller.get(), 42);
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        let caller = resolve_caller(&principal_with(Some("  7 "))).unwrap();
        assert_eq!(caller.get(), 7);
    }

    #[test]
    fn absent_claim_is_none() {
        assert!(resolve_caller(&principal_with(None)).is_none());
    }

    #[test]
    fn malformed_and_zero_claims_are_none() {
        assert!(resolve_caller(&principal_with(Some("not-a-number"))).is_none());
        assert!(resolve_caller(&principal_with(Some("0"))).is_none());
        assert!(resolve_caller(&principal_with(Some("-3"))).is_none());
    }
}
