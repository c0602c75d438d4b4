//! Apply command implementation

use anyhow::{Context, Result};
use pl_db::RecordingExecutor;
use pl_meta::VersionLedger;
use pl_runner::{AutoConfirm, MigrationRunner};
use std::sync::Arc;

use crate::cli::{ApplyArgs, GlobalArgs};
use crate::commands::common::{self, load_project, open_target, Project, Target};

/// Execute the apply command
pub(crate) fn execute(args: &ApplyArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let target = open_target(&project, global)?;

    if args.dry_run {
        return dry_run(&project, &target, args, global);
    }

    let runner = common::build_runner(&project, &target, args.yes, "Apply");
    let outcomes = match args.target_version {
        Some(version) => {
            println!("Applying version {version}...\n");
            vec![runner.apply(project.migration(version)?)]
        }
        None => {
            println!("Applying {} migration(s)...\n", project.migrations.len());
            runner.run_pending(&project.migrations)?
        }
    };

    for outcome in &outcomes {
        common::print_outcome(outcome, global.verbose);
    }
    common::finish(&outcomes)
}

/// Run the same batch against a recording executor and a scratch ledger
/// seeded from the real one, then print what would have executed.
fn dry_run(project: &Project, target: &Target, args: &ApplyArgs, global: &GlobalArgs) -> Result<()> {
    let scratch = VersionLedger::in_memory();
    for record in target.ledger.applied().context("Failed to read version ledger")? {
        scratch.record_applied(record.version)?;
    }

    let runner = MigrationRunner::new(Arc::new(RecordingExecutor::new()), Arc::new(scratch))
        .with_confirmation(AutoConfirm);
    let outcomes = match args.target_version {
        Some(version) => vec![runner.apply(project.migration(version)?)],
        None => runner.run_pending(&project.migrations)?,
    };

    println!("Dry run: nothing will be executed\n");
    let mut pending = 0;
    for outcome in &outcomes {
        if let Some(reason) = outcome.skip_reason() {
            if global.verbose {
                eprintln!("[verbose] {} skipped ({reason})", outcome.label());
            }
            continue;
        }
        if let Some(err) = outcome.error() {
            println!("  ✗ {} would fail: {err}", outcome.label());
            continue;
        }
        pending += 1;
        println!("  {}", outcome.label());
        for operation in &outcome.operations {
            println!("    {operation}");
        }
    }

    println!();
    println!("{pending} migration(s) would be applied");
    if outcomes.iter().any(|o| o.is_failed()) {
        return Err(common::ExitCode(1).into());
    }
    Ok(())
}
