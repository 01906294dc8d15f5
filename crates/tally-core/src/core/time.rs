// crates/tally-core/src/core/time.rs
// ============================================================================
// Module: Tally Time Model
// Description: Canonical timestamp and calendar date helpers.
// Purpose: Provide deterministic, host-supplied time values across Tally records.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Tally uses explicit time values embedded in records and generator runs to
//! keep decisions replayable. The core never reads wall-clock time; hosts
//! supply audit timestamps and "as of" dates at every call site. Calendar
//! dates use ISO-8601 `YYYY-MM-DD` text on the wire and in storage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::Month;
use time::macros::date;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default schedule end date standing in for "far future".
pub const FAR_FUTURE: Date = date!(9999 - 12 - 31);

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Audit timestamp in unix epoch milliseconds.
///
/// # Invariants
/// - Values are explicitly provided by callers; the core never reads wall-clock time.
/// - No validation is performed; monotonicity is a caller responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from unix epoch milliseconds.
    #[must_use]
    pub const fn from_unix_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as unix milliseconds.
    #[must_use]
    pub const fn as_unix_millis(self) -> i64 {
        self.0
    }
}

// ============================================================================
// SECTION: Date Text
// ============================================================================

/// Formats a calendar date as ISO-8601 `YYYY-MM-DD` text.
#[must_use]
pub fn format_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Parses an ISO-8601 date-only value (`YYYY-MM-DD`).
#[must_use]
pub fn parse_date(value: &str) -> Option<Date> {
    let mut parts = value.split('-');
    let year: i32 = parts.next()?.parse().ok()?;
    let month: u8 = parts.next()?.parse().ok()?;
    let day: u8 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    let month = Month::try_from(month).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use super::*;

    #[test]
    fn date_text_round_trips() {
        let day = date!(2021 - 02 - 01);
        let text = format_date(day);
        assert_eq!(text, "2021-02-01");
        assert_eq!(parse_date(&text).unwrap(), day);
    }

    #[test]
    fn parse_rejects_trailing_segments() {
        assert!(parse_date("2021-02-01T00:00:00").is_none());
        assert!(parse_date("2021-02").is_none());
        assert!(parse_date("2021-13-01").is_none());
    }
}
