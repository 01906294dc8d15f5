// crates/tally-core/src/runtime/authorizer.rs
// ============================================================================
// Module: Tally Scope Authorizer
// Description: Ranked three-tier access decisions for tenants and accounts.
// Purpose: Answer scoped access questions with deterministic, fail-closed results.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The scope authorizer answers one question: may this caller act within
//! this scope? Scopes form a ranked hierarchy (application > tenant >
//! account) and the decision is a logical OR across tiers — a membership at
//! any tier at or above the target allows. Checks short-circuit from the
//! narrowest applicable tier outward purely for efficiency; ordering never
//! changes the result.
//!
//! Invariants:
//! - Decisions are deterministic for identical store contents.
//! - Missing data (absent account, no membership rows) is a deny, never an
//!   error; only infrastructure failures surface as [`StoreError`].
//! - The authorizer holds no mutable state and reads no ambient request
//!   context; every input is an explicit argument.
//!
//! An access check against a nonexistent account does not deny outright:
//! it escalates to the application tier, so operators with application-wide
//! membership see a uniform decision surface regardless of row existence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::PrincipalId;
use crate::core::identifiers::TenantId;
use crate::interfaces::AccountStore;
use crate::interfaces::MembershipStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: Scopes and Decisions
// ============================================================================

/// Target scope of an access check, ranked broadest first.
///
/// # Invariants
/// - Application > Tenant > Account in trust rank; access at a broader tier
///   implies access at every narrower tier beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AccessScope {
    /// Application-wide scope: the narrowest, most privileged check.
    Application,
    /// A tenant and everything under it.
    Tenant(TenantId),
    /// A single account.
    Account(AccountId),
}

/// Access decision outcome.
///
/// # Invariants
/// - `allowed` is the authoritative decision for the request.
/// - `reason` is a stable label for audit sinks, never an input echo.
///
/// The caller layer owns the transport mapping. The recommended
/// anti-enumeration policy is: surface denied reads as not-found and denied
/// writes as forbidden, so unauthorized callers cannot probe for resource
/// existence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Whether access is allowed.
    pub allowed: bool,
    /// Reason label for audit logs.
    pub reason: String,
}

impl AccessDecision {
    /// Creates an allow decision with a matched-tier label.
    fn allow(reason: &str) -> Self {
        Self {
            allowed: true,
            reason: reason.to_string(),
        }
    }

    /// Creates the deny decision.
    fn deny() -> Self {
        Self {
            allowed: false,
            reason: "no_membership".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Scope Authorizer
// ============================================================================

/// Stateless scope authorization service over injected stores.
///
/// # Invariants
/// - No shared mutable fields; safe to share across concurrent requests.
#[derive(Debug, Clone)]
pub struct ScopeAuthorizer<M, A> {
    /// Membership sets for the three trust tiers.
    memberships: M,
    /// Account records, used to walk account -> owning tenant.
    accounts: A,
}

impl<M: MembershipStore, A: AccountStore> ScopeAuthorizer<M, A> {
    /// Creates an authorizer over the given stores.
    pub const fn new(memberships: M, accounts: A) -> Self {
        Self {
            memberships,
            accounts,
        }
    }

    /// Decides whether the caller may act at or above the target scope.
    ///
    /// Walks tiers narrowest-first: account membership, then the owning
    /// tenant's membership, then application membership. A missing account
    /// row skips the inner tiers and still consults the application tier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a membership or account lookup cannot
    /// complete. An error is never a deny; the caller layer decides whether
    /// to retry or surface an outage.
    pub fn check_access(
        &self,
        caller: PrincipalId,
        scope: AccessScope,
    ) -> Result<AccessDecision, StoreError> {
        match scope {
            AccessScope::Account(account_id) => {
                if let Some(account) = self.accounts.account_by_id(account_id)? {
                    if self.memberships.is_account_member(caller, account_id)? {
                        return Ok(AccessDecision::allow("account_member"));
                    }
                    if self.memberships.is_tenant_member(caller, account.tenant_id)? {
                        return Ok(AccessDecision::allow("tenant_member"));
                    }
                }
                self.application_tier(caller)
            }
            AccessScope::Tenant(tenant_id) => {
                if self.memberships.is_tenant_member(caller, tenant_id)? {
                    return Ok(AccessDecision::allow("tenant_member"));
                }
                self.application_tier(caller)
            }
            AccessScope::Application => self.application_tier(caller),
        }
    }

    /// Decides whether the caller may read or act on an account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a lookup cannot complete.
    pub fn check_account_access(
        &self,
        caller: PrincipalId,
        account_id: AccountId,
    ) -> Result<AccessDecision, StoreError> {
        self.check_access(caller, AccessScope::Account(account_id))
    }

    /// Decides whether the caller may act within a tenant.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a lookup cannot complete.
    pub fn check_tenant_access(
        &self,
        caller: PrincipalId,
        tenant_id: TenantId,
    ) -> Result<AccessDecision, StoreError> {
        self.check_access(caller, AccessScope::Tenant(tenant_id))
    }

    /// Decides whether the caller holds application-wide membership.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a lookup cannot complete.
    pub fn check_application_access(
        &self,
        caller: PrincipalId,
    ) -> Result<AccessDecision, StoreError> {
        self.check_access(caller, AccessScope::Application)
    }

    /// Consults the application-wide tier, the shared outermost fallback.
    fn application_tier(&self, caller: PrincipalId) -> Result<AccessDecision, StoreError> {
        if self.memberships.is_application_member(caller)? {
            return Ok(AccessDecision::allow("application_member"));
        }
        Ok(AccessDecision::deny())
    }
}
