//! Execution context guard.
//!
//! The execution context (bound migration version plus operation sink) is the
//! only shared mutable state in a run. The guard hands it to one closure at a
//! time: callers on other threads block until it is released, and the binding
//! is cleared on every exit path, unwinding included.

use crate::error::{GuardError, GuardResult};
use pl_db::{DbResult, SchemaExecutor};
use pl_core::SchemaOperation;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

#[derive(Debug, Default)]
struct GuardState {
    owner: Option<ThreadId>,
    bound_version: Option<i64>,
}

/// Single-writer guard around the execution context
#[derive(Debug, Default)]
pub struct ExecutionContextGuard {
    state: Mutex<GuardState>,
    released: Condvar,
}

/// The context visible to the closure passed to
/// [`ExecutionContextGuard::with_context`]
pub struct ExecutionContext<'a> {
    version: i64,
    sink: &'a dyn SchemaExecutor,
}

impl ExecutionContext<'_> {
    /// Version of the migration this context is bound to
    pub fn version(&self) -> i64 {
        self.version
    }

    /// Hand one operation to the bound sink
    pub fn execute(&self, operation: &SchemaOperation) -> DbResult<()> {
        self.sink.execute(operation)
    }

    pub fn sink(&self) -> &dyn SchemaExecutor {
        self.sink
    }
}

impl ExecutionContextGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `version` and `sink`, run `f`, then clear the binding.
    ///
    /// Blocks while another thread holds the context. Acquiring again from
    /// the thread that already holds it fails with
    /// [`GuardError::ReentrantAcquisition`] instead of deadlocking.
    pub fn with_context<T>(
        &self,
        version: i64,
        sink: &dyn SchemaExecutor,
        f: impl FnOnce(&ExecutionContext<'_>) -> T,
    ) -> GuardResult<T> {
        let _binding = self.acquire(version)?;
        let context = ExecutionContext { version, sink };
        Ok(f(&context))
    }

    /// Version currently bound, if any
    pub fn bound_version(&self) -> GuardResult<Option<i64>> {
        Ok(self.lock()?.bound_version)
    }

    pub fn is_held(&self) -> GuardResult<bool> {
        Ok(self.lock()?.owner.is_some())
    }

    fn acquire(&self, version: i64) -> GuardResult<Binding<'_>> {
        let me = thread::current().id();
        let mut state = self.lock()?;
        loop {
            match state.owner {
                None => break,
                Some(owner) if owner == me => {
                    return Err(GuardError::ReentrantAcquisition {
                        version: state.bound_version.unwrap_or(version),
                    });
                }
                Some(_) => {
                    state = self
                        .released
                        .wait(state)
                        .map_err(|e| GuardError::Poisoned(e.to_string()))?;
                }
            }
        }

        state.owner = Some(me);
        state.bound_version = Some(version);
        log::debug!("Execution context bound to migration {version}");
        Ok(Binding { guard: self })
    }

    fn lock(&self) -> GuardResult<MutexGuard<'_, GuardState>> {
        self.state
            .lock()
            .map_err(|e| GuardError::Poisoned(e.to_string()))
    }
}

/// Clears the binding when dropped
struct Binding<'a> {
    guard: &'a ExecutionContextGuard,
}

impl Drop for Binding<'_> {
    fn drop(&mut self) {
        // The state lock is never held while user code runs, so recovering a
        // poisoned lock here only skips the poison flag.
        let mut state = match self.guard.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(version) = state.bound_version.take() {
            log::debug!("Execution context released by migration {version}");
        }
        state.owner = None;
        drop(state);
        self.guard.released.notify_one();
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
