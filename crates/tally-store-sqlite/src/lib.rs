// crates/tally-store-sqlite/src/lib.rs
// ============================================================================
// Module: Tally SQLite Store Crate
// Description: Durable billing-domain stores backed by SQLite.
// Purpose: Provide the persistence backend for the Tally runtime services.
// Dependencies: tally-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! `tally-store-sqlite` implements every `tally-core` store interface over a
//! single `SQLite` database file. Writes are serialized through one writer
//! connection; reads go through a small round-robin pool of additional
//! connections for isolation under WAL.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use store::SqliteJournalMode;
pub use store::SqliteStore;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteSyncMode;
