//! In-memory executor that records operations instead of applying them.
//!
//! Used for `--dry-run` and as the observable collaborator in runner tests.

use crate::error::{DbError, DbResult};
use crate::traits::SchemaExecutor;
use pl_core::SchemaOperation;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Recorded {
    operations: Vec<SchemaOperation>,
    calls: usize,
}

/// Records every accepted operation in dispatch order
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    state: Mutex<Recorded>,
    fail_at: Option<usize>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the call with the given zero-based index; every other call succeeds
    pub fn failing_at(call: usize) -> Self {
        Self {
            state: Mutex::default(),
            fail_at: Some(call),
        }
    }

    /// Operations accepted so far
    pub fn operations(&self) -> DbResult<Vec<SchemaOperation>> {
        Ok(self.lock()?.operations.clone())
    }

    /// Number of `execute` calls, including rejected ones
    pub fn call_count(&self) -> DbResult<usize> {
        Ok(self.lock()?.calls)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Recorded>> {
        self.state
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }
}

impl SchemaExecutor for RecordingExecutor {
    fn execute(&self, operation: &SchemaOperation) -> DbResult<()> {
        let mut state = self.lock()?;
        let call = state.calls;
        state.calls += 1;

        if self.fail_at == Some(call) {
            return Err(DbError::Rejected {
                operation: operation.to_string(),
                reason: format!("scripted failure at call {call}"),
            });
        }

        log::debug!("recorded {operation}");
        state.operations.push(operation.clone());
        Ok(())
    }

    fn executor_type(&self) -> &'static str {
        "recording"
    }
}
