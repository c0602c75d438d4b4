//! Error types for pl-runner

use pl_core::BuildError;
use pl_db::DbError;
use pl_meta::LedgerError;
use thiserror::Error;

/// Execution context guard errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// G001: The calling thread already holds the context
    #[error("[G001] Execution context is already held by this thread (bound to migration {version})")]
    ReentrantAcquisition { version: i64 },

    /// G002: Internal lock poisoned
    #[error("[G002] Execution context lock poisoned: {0}")]
    Poisoned(String),
}

/// Result type alias for GuardError
pub type GuardResult<T> = Result<T, GuardError>;

/// Migration run errors
#[derive(Error, Debug)]
pub enum RunnerError {
    /// Manifest could not be turned into operations
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Ledger read or write failed
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Execution context could not be acquired
    #[error(transparent)]
    Guard(#[from] GuardError),

    /// E001: The executor rejected an operation
    #[error("[E001] {operation} failed: {source}")]
    Execution {
        operation: String,
        #[source]
        source: DbError,
    },

    /// E002: A batch names the same version twice
    #[error("[E002] Migration version {version} appears more than once in the batch")]
    DuplicateBatchVersion { version: i64 },
}

/// Result type alias for RunnerError
pub type RunnerResult<T> = Result<T, RunnerError>;
