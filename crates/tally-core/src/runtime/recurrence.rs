// crates/tally-core/src/runtime/recurrence.rs
// ============================================================================
// Module: Tally Recurrence Math
// Description: Occurrence calculations over schedule descriptors.
// Purpose: Provide deterministic, pure calendar math for the bill generator.
// Dependencies: time, crate::core
// ============================================================================

//! ## Overview
//! Recurrence math is pure: no storage access, no wall clock, no side
//! effects. An occurrence of a schedule is a date whose day-of-month equals
//! the schedule day and whose whole-month offset from the begin date is a
//! non-negative multiple of the month interval. Months lacking the schedule
//! day (for example day 31 against February) produce no occurrence and are
//! skipped; descriptor validation deliberately does not reject such days.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Date;
use time::Month;

use crate::core::billing::BillSchedule;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum interval steps scanned for the next feasible occurrence.
///
/// Bounds the search for descriptors whose day never lands in any scanned
/// month (day 30 on an annual February schedule never becomes feasible).
const MAX_OCCURRENCE_SCAN: u32 = 1_200;

// ============================================================================
// SECTION: Validity
// ============================================================================

/// Returns whether a schedule is active on the given date.
///
/// Active means enabled and within the inclusive validity window.
#[must_use]
pub fn is_active(schedule: &BillSchedule, as_of: Date) -> bool {
    !schedule.disabled && schedule.begin_date <= as_of && as_of <= schedule.end_date
}

// ============================================================================
// SECTION: Occurrence Math
// ============================================================================

/// Returns the smallest occurrence date on or after `after`.
///
/// Yields `None` when the schedule is disabled, when every remaining
/// occurrence falls past the end date, or when no feasible month exists
/// within the scan bound.
#[must_use]
pub fn next_occurrence(schedule: &BillSchedule, after: Date) -> Option<Date> {
    if schedule.disabled || schedule.month_interval == 0 {
        return None;
    }
    let floor = after.max(schedule.begin_date);
    let interval = i64::from(schedule.month_interval);
    let begin_ordinal = month_ordinal(schedule.begin_date);
    let mut ordinal = month_ordinal(floor);
    let remainder = (ordinal - begin_ordinal).rem_euclid(interval);
    if remainder != 0 {
        ordinal += interval - remainder;
    }
    for _ in 0..MAX_OCCURRENCE_SCAN {
        let month_start = date_in_month(ordinal, 1)?;
        if month_start > schedule.end_date {
            return None;
        }
        if let Some(candidate) = date_in_month(ordinal, schedule.day_of_month) {
            if candidate > schedule.end_date {
                return None;
            }
            if candidate >= floor {
                return Some(candidate);
            }
        }
        ordinal += interval;
    }
    None
}

/// Returns every occurrence within `window_start..=through`, ascending.
#[must_use]
pub fn occurrences_through(
    schedule: &BillSchedule,
    window_start: Date,
    through: Date,
) -> Vec<Date> {
    let mut occurrences = Vec::new();
    let mut cursor = window_start;
    while let Some(occurrence) = next_occurrence(schedule, cursor) {
        if occurrence > through {
            break;
        }
        occurrences.push(occurrence);
        let Some(next) = occurrence.next_day() else {
            break;
        };
        cursor = next;
    }
    occurrences
}

// ============================================================================
// SECTION: Month Arithmetic
// ============================================================================

/// Returns the zero-based month ordinal (`year * 12 + month - 1`).
fn month_ordinal(date: Date) -> i64 {
    i64::from(date.year()) * 12 + i64::from(u8::from(date.month())) - 1
}

/// Builds a date inside the given month ordinal, `None` when infeasible.
fn date_in_month(ordinal: i64, day: u8) -> Option<Date> {
    let year = i32::try_from(ordinal.div_euclid(12)).ok()?;
    let month_number = u8::try_from(ordinal.rem_euclid(12) + 1).ok()?;
    let month = Month::try_from(month_number).ok()?;
    Date::from_calendar_date(year, month, day).ok()
}
