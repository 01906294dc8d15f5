// crates/tally-core/tests/generator_unit.rs
// ============================================================================
// Module: Bill Generator Tests
// Description: Tests for idempotent schedule-driven bill generation.
// ============================================================================
//! ## Overview
//! Validates that repeated generation runs create each occurrence exactly
//! once, that the backfill window bounds materialization, and that inactive
//! schedules are ignored.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use tally_core::Account;
use tally_core::AccountStore;
use tally_core::Address;
use tally_core::BillGenerator;
use tally_core::BillSchedule;
use tally_core::BillStore;
use tally_core::CurrencyCode;
use tally_core::InMemoryStore;
use tally_core::LookupId;
use tally_core::Money;
use tally_core::NewAccount;
use tally_core::NewSchedule;
use tally_core::NewTenant;
use tally_core::ScheduleStore;
use tally_core::TenantDirectory;
use tally_core::Timestamp;
use time::Date;
use time::macros::date;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn now() -> Timestamp {
    Timestamp::from_unix_millis(1_700_000_000_000)
}

fn seed_account(store: &InMemoryStore) -> Account {
    let tenant = store
        .create_tenant(NewTenant {
            name: "acme".to_string(),
            created_at: now(),
        })
        .unwrap();
    store
        .create_account(NewAccount {
            tenant_id: tenant.id,
            name: "water service".to_string(),
            address: Address {
                street: "1 Main St".to_string(),
                city: "Springfield".to_string(),
                region: "IL".to_string(),
                postal_code: "62701".to_string(),
                country: "US".to_string(),
            },
            lookup_id: LookupId::new("acct-1"),
            created_at: now(),
        })
        .unwrap()
}

fn seed_schedule(
    store: &InMemoryStore,
    account: &Account,
    begin: Date,
    end: Option<Date>,
) -> BillSchedule {
    store
        .create_schedule(NewSchedule {
            account_id: account.id,
            name: "water".to_string(),
            money: Money::parse("42.00", CurrencyCode::new("USD").unwrap()).unwrap(),
            day_of_month: 1,
            month_interval: 1,
            begin_date: begin,
            end_date: end,
            created_at: now(),
        })
        .unwrap()
}

// ============================================================================
// SECTION: Idempotency
// ============================================================================

#[test]
fn repeated_runs_create_each_occurrence_once() {
    let store = InMemoryStore::new();
    let account = seed_account(&store);
    seed_schedule(&store, &account, date!(2021 - 01 - 01), None);

    let generator = BillGenerator::with_horizon_days(store.clone(), store.clone(), 90);
    let first = generator.run(date!(2021 - 03 - 15), now()).unwrap();
    assert_eq!(first.schedules_seen, 1);
    assert_eq!(first.bills_created, 3);
    assert_eq!(first.bills_existing, 0);

    let second = generator.run(date!(2021 - 03 - 15), now()).unwrap();
    assert_eq!(second.bills_created, 0);
    assert_eq!(second.bills_existing, 3);
    assert_eq!(store.bills_for_account(account.id).unwrap().len(), 3);
}

#[test]
fn later_run_materializes_only_new_occurrences() {
    let store = InMemoryStore::new();
    let account = seed_account(&store);
    seed_schedule(&store, &account, date!(2021 - 01 - 01), None);

    let generator = BillGenerator::with_horizon_days(store.clone(), store.clone(), 365);
    generator.run(date!(2021 - 03 - 15), now()).unwrap();

    let next = generator.run(date!(2021 - 05 - 15), now()).unwrap();
    assert_eq!(next.bills_created, 2);
    assert_eq!(next.bills_existing, 3);
    assert_eq!(store.bills_for_account(account.id).unwrap().len(), 5);
}

#[test]
fn generated_bill_copies_schedule_terms() {
    let store = InMemoryStore::new();
    let account = seed_account(&store);
    let schedule = seed_schedule(&store, &account, date!(2021 - 03 - 01), None);

    let generator = BillGenerator::with_horizon_days(store.clone(), store.clone(), 30);
    generator.run(date!(2021 - 03 - 02), now()).unwrap();

    let bills = store.bills_for_account(account.id).unwrap();
    assert_eq!(bills.len(), 1);
    let bill = &bills[0];
    assert_eq!(bill.schedule_id, Some(schedule.id));
    assert_eq!(bill.due_date, date!(2021 - 03 - 01));
    assert_eq!(bill.money, schedule.money);
    assert_eq!(bill.account_id, account.id);
}

// ============================================================================
// SECTION: Window and Activity Bounds
// ============================================================================

#[test]
fn occurrences_before_the_backfill_window_are_skipped() {
    let store = InMemoryStore::new();
    let account = seed_account(&store);
    seed_schedule(&store, &account, date!(2020 - 01 - 01), None);

    // A 60-day window ending 2021-03-15 reaches back to mid-January.
    let generator = BillGenerator::with_horizon_days(store.clone(), store.clone(), 60);
    let report = generator.run(date!(2021 - 03 - 15), now()).unwrap();
    assert_eq!(report.bills_created, 2);

    let mut due_dates: Vec<Date> = store
        .bills_for_account(account.id)
        .unwrap()
        .iter()
        .map(|bill| bill.due_date)
        .collect();
    due_dates.sort_unstable();
    assert_eq!(due_dates, vec![date!(2021 - 02 - 01), date!(2021 - 03 - 01)]);
}

#[test]
fn expired_schedule_is_not_visited() {
    let store = InMemoryStore::new();
    let account = seed_account(&store);
    seed_schedule(
        &store,
        &account,
        date!(2020 - 01 - 01),
        Some(date!(2020 - 06 - 30)),
    );

    let generator = BillGenerator::new(store.clone(), store.clone());
    let report = generator.run(date!(2021 - 03 - 15), now()).unwrap();
    assert_eq!(report.schedules_seen, 0);
    assert_eq!(report.bills_created, 0);
}

#[test]
fn disabled_schedule_is_not_visited() {
    let store = InMemoryStore::new();
    let account = seed_account(&store);
    let schedule = seed_schedule(&store, &account, date!(2021 - 01 - 01), None);
    store.disable_schedule(schedule.id, now()).unwrap();

    let generator = BillGenerator::new(store.clone(), store.clone());
    let report = generator.run(date!(2021 - 03 - 15), now()).unwrap();
    assert_eq!(report.schedules_seen, 0);
    assert!(store.bills_for_account(account.id).unwrap().is_empty());
}
