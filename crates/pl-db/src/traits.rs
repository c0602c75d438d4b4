//! Schema executor trait definition

use crate::error::DbResult;
use pl_core::SchemaOperation;

/// Receives schema operations one at a time and applies them to a target.
///
/// Dialect translation belongs to the implementation. Implementations must be
/// Send + Sync so a runner can hand them across the execution context guard.
pub trait SchemaExecutor: Send + Sync {
    /// Apply a single operation
    fn execute(&self, operation: &SchemaOperation) -> DbResult<()>;

    /// Executor type identifier for logging
    fn executor_type(&self) -> &'static str;
}

impl<T: SchemaExecutor + ?Sized> SchemaExecutor for &T {
    fn execute(&self, operation: &SchemaOperation) -> DbResult<()> {
        (**self).execute(operation)
    }

    fn executor_type(&self) -> &'static str {
        (**self).executor_type()
    }
}

impl<T: SchemaExecutor + ?Sized> SchemaExecutor for Box<T> {
    fn execute(&self, operation: &SchemaOperation) -> DbResult<()> {
        (**self).execute(operation)
    }

    fn executor_type(&self) -> &'static str {
        (**self).executor_type()
    }
}
