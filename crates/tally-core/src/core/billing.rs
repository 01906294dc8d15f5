// crates/tally-core/src/core/billing.rs
// ============================================================================
// Module: Tally Billing Model
// Description: Recurring schedule descriptors and concrete bill records.
// Purpose: Model periodic obligations and the bills they spawn.
// Dependencies: serde, thiserror, time, crate::core
// ============================================================================

//! ## Overview
//! A [`BillSchedule`] is a pure recurrence descriptor: a day of month, a
//! month interval, and a validity window on an owning account. The calendar
//! math over these descriptors lives in [`crate::runtime::recurrence`]. A
//! [`Bill`] is a concrete obligation, optionally linked back to the schedule
//! occurrence that spawned it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use time::Date;

use crate::core::identifiers::AccountId;
use crate::core::identifiers::BillId;
use crate::core::identifiers::ScheduleId;
use crate::core::money::Money;
use crate::core::time::FAR_FUTURE;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Schedule Validation
// ============================================================================

/// Schedule descriptor validation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleValidationError {
    /// Day of month is outside 1..=31.
    #[error("schedule day of month out of range: {0} (expected 1..=31)")]
    DayOutOfRange(u8),
    /// Month interval is zero.
    #[error("schedule month interval must be at least 1")]
    IntervalZero,
    /// Validity window is inverted.
    #[error("schedule begin date {begin} is after end date {end}")]
    WindowInverted {
        /// Window begin date.
        begin: Date,
        /// Window end date.
        end: Date,
    },
}

/// Validates schedule recurrence fields.
///
/// Day-of-month calendar feasibility (for example day 31 against February)
/// is intentionally not validated; infeasible months are skipped by the
/// recurrence math.
///
/// # Errors
///
/// Returns [`ScheduleValidationError`] when the day, interval, or validity
/// window is out of range.
pub fn validate_schedule_terms(
    day_of_month: u8,
    month_interval: u32,
    begin_date: Date,
    end_date: Date,
) -> Result<(), ScheduleValidationError> {
    if day_of_month == 0 || day_of_month > 31 {
        return Err(ScheduleValidationError::DayOutOfRange(day_of_month));
    }
    if month_interval == 0 {
        return Err(ScheduleValidationError::IntervalZero);
    }
    if begin_date > end_date {
        return Err(ScheduleValidationError::WindowInverted {
            begin: begin_date,
            end: end_date,
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Schedule Records
// ============================================================================

/// A recurring bill or payment schedule descriptor.
///
/// # Invariants
/// - `begin_date <= end_date`.
/// - `day_of_month` is within 1..=31 and `month_interval >= 1`.
/// - Disabled schedules are excluded from all normal queries and never
///   produce occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillSchedule {
    /// Schedule identifier.
    pub id: ScheduleId,
    /// Owning account identifier.
    pub account_id: AccountId,
    /// Human-readable display name.
    pub name: String,
    /// Amount charged per occurrence.
    pub money: Money,
    /// Day of month each occurrence falls on (1..=31).
    pub day_of_month: u8,
    /// Whole months between occurrences (>= 1).
    pub month_interval: u32,
    /// First date the schedule is valid.
    pub begin_date: Date,
    /// Last date the schedule is valid; defaults to [`FAR_FUTURE`].
    pub end_date: Date,
    /// Soft-disable flag.
    pub disabled: bool,
    /// Creation timestamp supplied by the creating caller.
    pub created_at: Timestamp,
    /// Last-update timestamp supplied by the mutating caller.
    pub updated_at: Timestamp,
}

/// Fields required to create a new schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSchedule {
    /// Owning account identifier.
    pub account_id: AccountId,
    /// Human-readable display name.
    pub name: String,
    /// Amount charged per occurrence.
    pub money: Money,
    /// Day of month each occurrence falls on (1..=31).
    pub day_of_month: u8,
    /// Whole months between occurrences (>= 1).
    pub month_interval: u32,
    /// First date the schedule is valid.
    pub begin_date: Date,
    /// Last date the schedule is valid; `None` means [`FAR_FUTURE`].
    pub end_date: Option<Date>,
    /// Creation timestamp supplied by the creating caller.
    pub created_at: Timestamp,
}

impl NewSchedule {
    /// Returns the effective end date, defaulting to [`FAR_FUTURE`].
    #[must_use]
    pub fn effective_end_date(&self) -> Date {
        self.end_date.unwrap_or(FAR_FUTURE)
    }

    /// Validates recurrence fields against descriptor invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleValidationError`] when the day, interval, or
    /// validity window is out of range.
    pub fn validate(&self) -> Result<(), ScheduleValidationError> {
        validate_schedule_terms(
            self.day_of_month,
            self.month_interval,
            self.begin_date,
            self.effective_end_date(),
        )
    }
}

// ============================================================================
// SECTION: Bill Records
// ============================================================================

/// A concrete bill or payment obligation.
///
/// # Invariants
/// - When `schedule_id` is set, (`schedule_id`, `due_date`) is unique; this
///   is the idempotency key for generated bills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Bill identifier.
    pub id: BillId,
    /// Owning account identifier.
    pub account_id: AccountId,
    /// Human-readable display name.
    pub name: String,
    /// Amount due.
    pub money: Money,
    /// Date the obligation falls due.
    pub due_date: Date,
    /// Originating schedule, when generated from one.
    pub schedule_id: Option<ScheduleId>,
    /// External transaction reference, when settled out of band.
    pub external_ref: Option<String>,
    /// Soft-disable flag.
    pub disabled: bool,
    /// Creation timestamp supplied by the creating caller.
    pub created_at: Timestamp,
    /// Last-update timestamp supplied by the mutating caller.
    pub updated_at: Timestamp,
}

/// Fields required to create a new bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBill {
    /// Owning account identifier.
    pub account_id: AccountId,
    /// Human-readable display name.
    pub name: String,
    /// Amount due.
    pub money: Money,
    /// Date the obligation falls due.
    pub due_date: Date,
    /// Originating schedule, when generated from one.
    pub schedule_id: Option<ScheduleId>,
    /// External transaction reference, when settled out of band.
    pub external_ref: Option<String>,
    /// Creation timestamp supplied by the creating caller.
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, reason = "Test-only assertions are permitted.")]

    use time::macros::date;

    use super::*;
    use crate::core::money::CurrencyCode;

    fn terms() -> NewSchedule {
        NewSchedule {
            account_id: AccountId::from_raw(1).unwrap(),
            name: "water".to_string(),
            money: Money::parse("42.00", CurrencyCode::new("USD").unwrap()).unwrap(),
            day_of_month: 15,
            month_interval: 1,
            begin_date: date!(2021 - 01 - 01),
            end_date: None,
            created_at: Timestamp::from_unix_millis(0),
        }
    }

    #[test]
    fn end_date_defaults_far_future() {
        assert_eq!(terms().effective_end_date(), FAR_FUTURE);
    }

    #[test]
    fn validation_rejects_out_of_range_terms() {
        let mut schedule = terms();
        schedule.day_of_month = 0;
        assert!(matches!(schedule.validate(), Err(ScheduleValidationError::DayOutOfRange(0))));

        let mut schedule = terms();
        schedule.day_of_month = 32;
        assert!(matches!(schedule.validate(), Err(ScheduleValidationError::DayOutOfRange(32))));

        let mut schedule = terms();
        schedule.month_interval = 0;
        assert!(matches!(schedule.validate(), Err(ScheduleValidationError::IntervalZero)));

        let mut schedule = terms();
        schedule.end_date = Some(date!(2020 - 12 - 31));
        assert!(matches!(
            schedule.validate(),
            Err(ScheduleValidationError::WindowInverted { .. })
        ));
    }

    #[test]
    fn validation_accepts_calendar_infeasible_days() {
        // Day 31 with a February window is allowed by design; the recurrence
        // math skips infeasible months.
        let mut schedule = terms();
        schedule.day_of_month = 31;
        assert!(schedule.validate().is_ok());
    }
}
