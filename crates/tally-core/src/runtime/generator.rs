// crates/tally-core/src/runtime/generator.rs
// ============================================================================
// Module: Tally Bill Generator
// Description: Periodic job body that spawns bills from active schedules.
// Purpose: Materialize due schedule occurrences into bills, idempotently.
// Dependencies: time, crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! The bill generator walks every schedule active as of a host-supplied
//! date and materializes one bill per due occurrence through the bill
//! store's idempotent creation path. Runs are safe under at-least-once
//! invocation: occurrences that already produced a bill are counted as
//! skipped, never duplicated. The generator takes its run date and audit
//! timestamp as explicit arguments; it never reads the wall clock.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::Duration;

use crate::core::time::Timestamp;
use crate::interfaces::BillOutcome;
use crate::interfaces::BillStore;
use crate::interfaces::ScheduleStore;
use crate::interfaces::StoreError;
use crate::runtime::recurrence::occurrences_through;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of past days a run backfills missed occurrences for.
pub const DEFAULT_HORIZON_DAYS: u32 = 365;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Summary of one generator run.
///
/// # Invariants
/// - `bills_created + bills_existing` equals the due occurrences visited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Schedules that were active for the run date.
    pub schedules_seen: u64,
    /// Bills newly created by this run.
    pub bills_created: u64,
    /// Due occurrences that already had a bill.
    pub bills_existing: u64,
}

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Schedule-driven bill generator over injected stores.
#[derive(Debug, Clone)]
pub struct BillGenerator<S, B> {
    /// Schedule descriptors backing the run.
    schedules: S,
    /// Bill records receiving idempotent creations.
    bills: B,
    /// Number of past days a run backfills missed occurrences for.
    horizon_days: u32,
}

impl<S: ScheduleStore, B: BillStore> BillGenerator<S, B> {
    /// Creates a generator with the default backfill horizon.
    pub const fn new(schedules: S, bills: B) -> Self {
        Self {
            schedules,
            bills,
            horizon_days: DEFAULT_HORIZON_DAYS,
        }
    }

    /// Creates a generator with an explicit backfill horizon in days.
    pub const fn with_horizon_days(schedules: S, bills: B, horizon_days: u32) -> Self {
        Self {
            schedules,
            bills,
            horizon_days,
        }
    }

    /// Runs one generation pass for the given date.
    ///
    /// Visits every schedule active on `as_of` and creates a bill for each
    /// occurrence inside the backfill window ending at `as_of`. Repeating a
    /// run for the same date changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when a schedule listing or bill write cannot
    /// complete; occurrences already materialized before the failure remain
    /// persisted and are skipped by the retry.
    pub fn run(&self, as_of: Date, now: Timestamp) -> Result<GenerationReport, StoreError> {
        let window_start = window_start(as_of, self.horizon_days);
        let mut report = GenerationReport::default();
        for schedule in self.schedules.active_schedules(as_of)? {
            report.schedules_seen += 1;
            for due_date in occurrences_through(&schedule, window_start, as_of) {
                match self.bills.create_from_schedule(&schedule, due_date, now)? {
                    BillOutcome::Created(_) => report.bills_created += 1,
                    BillOutcome::AlreadyExists => report.bills_existing += 1,
                }
            }
        }
        Ok(report)
    }
}

/// Returns the first date of the backfill window.
fn window_start(as_of: Date, horizon_days: u32) -> Date {
    as_of
        .checked_sub(Duration::days(i64::from(horizon_days)))
        .unwrap_or(Date::MIN)
}
