//! Error types for the version ledger.

use thiserror::Error;

/// Version ledger errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The version is already recorded (L001).
    #[error("[L001] Migration version {version} has already been applied")]
    DuplicateVersion { version: i64 },

    /// The version has no active record (L002).
    #[error("[L002] Migration version {version} is not applied")]
    NotApplied { version: i64 },

    /// The backing store failed (L003).
    #[error("[L003] Ledger store failed: {0}")]
    Store(String),

    /// Ledger mutex poisoned (L004).
    #[error("[L004] Ledger mutex poisoned: {0}")]
    MutexPoisoned(String),

    /// DuckDB driver error with preserved source chain (L005).
    #[error("[L005] DuckDB error")]
    DuckDb(#[source] duckdb::Error),
}

/// Result type alias for [`LedgerError`].
pub type LedgerResult<T> = Result<T, LedgerError>;

impl From<duckdb::Error> for LedgerError {
    fn from(err: duckdb::Error) -> Self {
        LedgerError::DuckDb(err)
    }
}
