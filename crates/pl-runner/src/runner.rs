//! Migration runner.
//!
//! One run walks `ledger check -> build -> confirm -> guarded (re-check ->
//! execution -> record)`. Skips and failures stop the walk early; a failed
//! apply never touches the ledger, and the execution context is released on
//! every path.

use crate::confirm::{AutoConfirm, Confirmation};
use crate::error::{RunnerError, RunnerResult};
use crate::guard::ExecutionContextGuard;
use pl_core::{Direction, MigrationLogic, RevertPolicy, SchemaOperation};
use pl_db::SchemaExecutor;
use pl_meta::{LedgerResult, VersionLedger};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Why a migration was not run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Apply requested for a version the ledger already holds
    AlreadyApplied,
    /// Confirmation returned false
    Declined,
    /// Revert requested for a version with no active ledger record
    NotApplied,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AlreadyApplied => write!(f, "already applied"),
            SkipReason::Declined => write!(f, "declined"),
            SkipReason::NotApplied => write!(f, "not applied"),
        }
    }
}

/// Terminal state of one run
#[derive(Debug)]
pub enum RunStatus {
    Skipped(SkipReason),
    Committed,
    Failed(RunnerError),
}

/// Report for one migration run
#[derive(Debug)]
pub struct RunOutcome {
    pub version: i64,
    pub description: String,
    pub direction: Direction,
    pub status: RunStatus,
    /// Operation sequence built for this run (empty if the run stopped before building)
    pub operations: Vec<SchemaOperation>,
    /// Number of operations the executor accepted
    pub executed: usize,
}

impl RunOutcome {
    fn new(migration: &dyn MigrationLogic, direction: Direction) -> Self {
        Self {
            version: migration.version(),
            description: migration.description().to_string(),
            direction,
            status: RunStatus::Committed,
            operations: Vec::new(),
            executed: 0,
        }
    }

    fn skipped(mut self, reason: SkipReason) -> Self {
        match reason {
            SkipReason::Declined => log::warn!("{}: {} declined", self.label(), self.direction),
            _ => log::info!("{}: {} skipped ({reason})", self.label(), self.direction),
        }
        self.status = RunStatus::Skipped(reason);
        self
    }

    fn failed(mut self, error: RunnerError) -> Self {
        log::error!("{}: {} failed: {error}", self.label(), self.direction);
        self.status = RunStatus::Failed(error);
        self
    }

    fn committed(mut self) -> Self {
        log::info!(
            "{}: {} committed ({} operation(s))",
            self.label(),
            self.direction,
            self.executed
        );
        self.status = RunStatus::Committed;
        self
    }

    /// `"<version>: <description>"`
    pub fn label(&self) -> String {
        format!("{}: {}", self.version, self.description)
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.status, RunStatus::Committed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, RunStatus::Failed(_))
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self.status {
            RunStatus::Skipped(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RunnerError> {
        match &self.status {
            RunStatus::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Runs migrations against one executor and ledger
pub struct MigrationRunner {
    executor: Arc<dyn SchemaExecutor>,
    ledger: Arc<VersionLedger>,
    guard: Arc<ExecutionContextGuard>,
    confirmation: Arc<dyn Confirmation>,
    revert_policy: RevertPolicy,
}

impl MigrationRunner {
    /// Runner with its own guard, automatic confirmation and the default revert policy
    pub fn new(executor: Arc<dyn SchemaExecutor>, ledger: Arc<VersionLedger>) -> Self {
        Self {
            executor,
            ledger,
            guard: Arc::new(ExecutionContextGuard::new()),
            confirmation: Arc::new(AutoConfirm),
            revert_policy: RevertPolicy::default(),
        }
    }

    /// Share an execution context guard with other runners
    pub fn with_guard(mut self, guard: Arc<ExecutionContextGuard>) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_confirmation(mut self, confirmation: impl Confirmation + 'static) -> Self {
        self.confirmation = Arc::new(confirmation);
        self
    }

    pub fn with_revert_policy(mut self, policy: RevertPolicy) -> Self {
        self.revert_policy = policy;
        self
    }

    pub fn ledger(&self) -> &VersionLedger {
        &self.ledger
    }

    pub fn revert_policy(&self) -> RevertPolicy {
        self.revert_policy
    }

    /// Apply one migration
    pub fn apply(&self, migration: &dyn MigrationLogic) -> RunOutcome {
        self.run(migration, Direction::Apply)
    }

    /// Revert one migration
    pub fn revert(&self, migration: &dyn MigrationLogic) -> RunOutcome {
        self.run(migration, Direction::Revert)
    }

    /// Apply every migration in ascending version order.
    ///
    /// Applied versions are reported as skipped. The batch stops after the
    /// first migration that fails or is declined, since later versions may
    /// build on it.
    pub fn run_pending<M: MigrationLogic>(&self, migrations: &[M]) -> RunnerResult<Vec<RunOutcome>> {
        let mut seen = HashSet::new();
        for migration in migrations {
            if !seen.insert(migration.version()) {
                return Err(RunnerError::DuplicateBatchVersion {
                    version: migration.version(),
                });
            }
        }

        let mut ordered: Vec<&M> = migrations.iter().collect();
        ordered.sort_by_key(|m| m.version());

        let mut outcomes = Vec::with_capacity(ordered.len());
        for migration in ordered {
            let outcome = self.apply(migration);
            let stop = outcome.is_failed() || outcome.skip_reason() == Some(SkipReason::Declined);
            outcomes.push(outcome);
            if stop {
                break;
            }
        }
        Ok(outcomes)
    }

    /// Run one migration in one direction.
    ///
    /// The ledger is checked once up front so that applied versions skip
    /// building and confirmation, and again once the execution context is
    /// held. Dispatch and recording both happen under the context, so two
    /// runners sharing a guard cannot both execute the same version.
    pub fn run(&self, migration: &dyn MigrationLogic, direction: Direction) -> RunOutcome {
        let mut outcome = RunOutcome::new(migration, direction);
        let version = outcome.version;
        log::debug!("{}: {direction} started", outcome.label());

        match self.ledger_skip(version, direction) {
            Ok(Some(reason)) => return outcome.skipped(reason),
            Ok(None) => {}
            Err(e) => return outcome.failed(e.into()),
        }
        log::debug!("{}: ledger checked", outcome.label());

        match migration.operations(direction) {
            Ok(operations) => outcome.operations = operations,
            Err(e) => return outcome.failed(e.into()),
        }
        log::debug!(
            "{}: built {} operation(s)",
            outcome.label(),
            outcome.operations.len()
        );

        if !self.confirmation.confirm(version, &outcome.description) {
            return outcome.skipped(SkipReason::Declined);
        }
        log::debug!("{}: confirmed", outcome.label());

        let mut executed = 0;
        let dispatched = self.guard.with_context(
            version,
            self.executor.as_ref(),
            |ctx| -> RunnerResult<Option<SkipReason>> {
                if let Some(reason) = self.ledger_skip(version, direction)? {
                    return Ok(Some(reason));
                }
                for operation in &outcome.operations {
                    log::debug!("{}: executing {operation}", outcome.label());
                    ctx.execute(operation)
                        .map_err(|source| RunnerError::Execution {
                            operation: operation.to_string(),
                            source,
                        })?;
                    executed += 1;
                }
                match direction {
                    Direction::Apply => self.ledger.record_applied(version).map(|_| ())?,
                    Direction::Revert => {
                        self.ledger.record_reverted(version, self.revert_policy)?
                    }
                }
                Ok(None)
            },
        );
        outcome.executed = executed;

        match dispatched {
            Ok(Ok(None)) => outcome.committed(),
            Ok(Ok(Some(reason))) => outcome.skipped(reason),
            Ok(Err(e)) => outcome.failed(e),
            Err(e) => outcome.failed(e.into()),
        }
    }

    /// Why the ledger rules out running `version` in `direction`, if it does
    fn ledger_skip(
        &self,
        version: i64,
        direction: Direction,
    ) -> LedgerResult<Option<SkipReason>> {
        Ok(match direction {
            Direction::Apply => self
                .ledger
                .has_applied(version)?
                .then_some(SkipReason::AlreadyApplied),
            Direction::Revert => {
                (!self.ledger.is_active(version)?).then_some(SkipReason::NotApplied)
            }
        })
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
