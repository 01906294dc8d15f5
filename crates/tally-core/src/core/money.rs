// crates/tally-core/src/core/money.rs
// ============================================================================
// Module: Tally Money Model
// Description: Fixed-point currency amounts with validated currency codes.
// Purpose: Represent bill and schedule amounts without binary float drift.
// Dependencies: serde, bigdecimal, thiserror
// ============================================================================

//! ## Overview
//! Monetary values pair an arbitrary-precision decimal amount with an
//! ISO-4217 currency code. Amounts are decimal-aware with a stable string
//! representation so equality and storage round-trips are deterministic.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Currency Codes
// ============================================================================

/// Currency code validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CurrencyCodeError {
    /// Code is not exactly three characters.
    #[error("currency code must be exactly 3 characters: {0}")]
    Length(String),
    /// Code contains non-uppercase-ASCII-alphabetic characters.
    #[error("currency code must be uppercase ASCII letters: {0}")]
    Alphabet(String),
}

/// Validated ISO-4217 alphabetic currency code.
///
/// # Invariants
/// - Exactly three uppercase ASCII letters; enforced at every construction
///   boundary, including deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a currency code after validating shape.
    ///
    /// # Errors
    ///
    /// Returns [`CurrencyCodeError`] when the code is not three uppercase
    /// ASCII letters.
    pub fn new(code: impl Into<String>) -> Result<Self, CurrencyCodeError> {
        let code = code.into();
        if code.len() != 3 {
            return Err(CurrencyCodeError::Length(code));
        }
        if !code.bytes().all(|byte| byte.is_ascii_uppercase()) {
            return Err(CurrencyCodeError::Alphabet(code));
        }
        Ok(Self(code))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = CurrencyCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

// ============================================================================
// SECTION: Money
// ============================================================================

/// A currency amount attached to a bill or schedule.
///
/// # Invariants
/// - `amount` carries exact decimal semantics; comparisons never pass
///   through binary floating point.
/// - Sign is not constrained; credits are negative amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Decimal amount with a stable string form.
    pub amount: BigDecimal,
    /// Validated ISO-4217 currency code.
    pub currency: CurrencyCode,
}

impl Money {
    /// Creates a money value.
    #[must_use]
    pub const fn new(amount: BigDecimal, currency: CurrencyCode) -> Self {
        Self { amount, currency }
    }

    /// Parses a money value from a decimal string and currency code.
    ///
    /// Returns `None` when the amount does not parse as a decimal.
    #[must_use]
    pub fn parse(amount: &str, currency: CurrencyCode) -> Option<Self> {
        BigDecimal::from_str(amount).ok().map(|amount| Self { amount, currency })
    }

    /// Renders the amount as a canonical decimal string for storage.
    #[must_use]
    pub fn amount_text(&self) -> String {
        self.amount.to_string()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.amount, self.currency)
    }
}
