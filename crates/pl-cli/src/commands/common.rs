//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use pl_core::{Config, Manifest, ManifestMigration, MigrationLogic};
use pl_db::DuckDbExecutor;
use pl_meta::{DuckDbLedgerStore, VersionLedger};
use pl_runner::{AutoConfirm, Confirmation, MigrationRunner, RunOutcome, RunStatus};
use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and the database is closed cleanly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main.rs downcasts before printing.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Loaded configuration plus the manifest's migrations
pub(crate) struct Project {
    pub root: PathBuf,
    pub config: Config,
    pub migrations: Vec<ManifestMigration>,
}

impl Project {
    /// Find a migration by version
    pub fn migration(&self, version: i64) -> Result<&ManifestMigration> {
        self.migrations
            .iter()
            .find(|m| m.version() == version)
            .with_context(|| {
                format!(
                    "Version {version} is not in manifest {}",
                    self.config.manifest_path_absolute(&self.root).display()
                )
            })
    }
}

/// Load plover.yml (or `--config`) and the manifest it points at
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project config")?;

    let manifest_path = config.manifest_path_absolute(&root);
    if global.verbose {
        eprintln!("[verbose] Loading manifest from: {}", manifest_path.display());
    }
    let manifest = Manifest::load(&manifest_path).context("Failed to load manifest")?;

    let migrations = manifest
        .migrations
        .into_iter()
        .map(|descriptor| ManifestMigration::with_ordering(descriptor, config.ordering))
        .collect::<Vec<_>>();
    if global.verbose {
        eprintln!(
            "[verbose] Loaded {} migration(s) for project '{}'",
            migrations.len(),
            config.name
        );
    }

    Ok(Project {
        root,
        config,
        migrations,
    })
}

/// Executor and ledger sharing one DuckDB database
pub(crate) struct Target {
    pub executor: Arc<DuckDbExecutor>,
    pub ledger: Arc<VersionLedger>,
}

/// Open the configured database and its version ledger
pub(crate) fn open_target(project: &Project, global: &GlobalArgs) -> Result<Target> {
    let path = project.config.database_path_absolute(&project.root);
    if !project.config.database.is_in_memory() {
        if let Some(parent) = Path::new(&path).parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }
    if global.verbose {
        eprintln!(
            "[verbose] Opening {} database: {path}",
            project.config.database.db_type
        );
    }

    let executor = DuckDbExecutor::new(&path).context("Failed to open database")?;
    let conn = executor
        .try_clone_connection()
        .context("Failed to open ledger connection")?;
    let store = DuckDbLedgerStore::from_connection(conn, &project.config.ledger)
        .context("Failed to open version ledger")?;
    if global.verbose {
        eprintln!("[verbose] Version ledger: {}", store.qualified_table());
    }

    Ok(Target {
        executor: Arc::new(executor),
        ledger: Arc::new(VersionLedger::new(store)),
    })
}

/// Prompt on stdin, accepting `y` or `Y`
pub(crate) struct StdinConfirmation {
    action: &'static str,
}

impl StdinConfirmation {
    pub fn new(action: &'static str) -> Self {
        Self { action }
    }
}

impl Confirmation for StdinConfirmation {
    fn confirm(&self, version: i64, description: &str) -> bool {
        print!("{} {version}: {description}? [y/N] ", self.action);
        if let Err(e) = std::io::stdout().flush() {
            log::warn!("Confirmation prompt: failed to flush stdout: {e}");
            return false;
        }
        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                log::warn!("Confirmation prompt: failed to read stdin: {e}");
                false
            }
        }
    }
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "Y")
}

/// Build a runner honouring `--yes`, `confirm:` and `revert_policy:`
pub(crate) fn build_runner(
    project: &Project,
    target: &Target,
    yes: bool,
    action: &'static str,
) -> MigrationRunner {
    let runner = MigrationRunner::new(target.executor.clone(), Arc::clone(&target.ledger))
        .with_revert_policy(project.config.revert_policy);
    if yes || !project.config.confirm {
        runner.with_confirmation(AutoConfirm)
    } else {
        runner.with_confirmation(StdinConfirmation::new(action))
    }
}

/// Print one outcome line, plus its operations when verbose
pub(crate) fn print_outcome(outcome: &RunOutcome, verbose: bool) {
    match &outcome.status {
        RunStatus::Committed => println!(
            "  ✓ {} {} ({} operation(s))",
            outcome.label(),
            past_tense(outcome),
            outcome.executed
        ),
        RunStatus::Skipped(reason) => println!("  - {} skipped ({reason})", outcome.label()),
        RunStatus::Failed(err) => println!("  ✗ {} failed: {err}", outcome.label()),
    }
    if verbose {
        for (i, operation) in outcome.operations.iter().enumerate() {
            let marker = if i < outcome.executed { "done" } else { "----" };
            eprintln!("[verbose]   [{marker}] {operation}");
        }
    }
}

fn past_tense(outcome: &RunOutcome) -> &'static str {
    match outcome.direction {
        pl_core::Direction::Apply => "applied",
        pl_core::Direction::Revert => "reverted",
    }
}

/// Print a summary and request exit code 1 if anything failed
pub(crate) fn finish(outcomes: &[RunOutcome]) -> Result<()> {
    let committed = outcomes.iter().filter(|o| o.is_committed()).count();
    let failed = outcomes.iter().filter(|o| o.is_failed()).count();
    let skipped = outcomes.len() - committed - failed;

    println!();
    println!("Completed: {committed} committed, {skipped} skipped, {failed} failed");

    if failed > 0 {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
