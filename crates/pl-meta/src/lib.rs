//! pl-meta - Version ledger for Plover
//!
//! Records which migration versions have been applied to a target database.
//! The [`VersionLedger`] enforces uniqueness and the revert policy; records
//! are persisted through a [`LedgerStore`], either in memory or in a DuckDB
//! table.

pub mod duckdb_store;
pub mod error;
pub mod ledger;
pub mod store;

pub use duckdb_store::DuckDbLedgerStore;
pub use error::{LedgerError, LedgerResult};
pub use ledger::VersionLedger;
pub use store::{AppliedVersionRecord, LedgerStore, MemoryLedgerStore};
