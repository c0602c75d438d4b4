//! pl-runner - Migration runner for Plover
//!
//! Checks the version ledger, builds a migration's operations, asks for
//! confirmation, and dispatches the operations to a schema executor while
//! holding the execution context guard.

pub mod confirm;
pub mod error;
pub mod guard;
pub mod runner;

pub use confirm::{AutoConfirm, Confirmation};
pub use error::{GuardError, GuardResult, RunnerError, RunnerResult};
pub use guard::{ExecutionContext, ExecutionContextGuard};
pub use runner::{MigrationRunner, RunOutcome, RunStatus, SkipReason};
