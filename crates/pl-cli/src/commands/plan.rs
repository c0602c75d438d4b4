//! Plan command implementation

use anyhow::Result;
use pl_core::{Direction, ManifestMigration, MigrationLogic, SchemaOperation};
use serde::Serialize;

use crate::cli::{GlobalArgs, PlanArgs};
use crate::commands::common::{load_project, ExitCode};

#[derive(Debug, Serialize)]
struct PlannedMigration<'a> {
    version: i64,
    description: &'a str,
    direction: Direction,
    #[serde(skip_serializing_if = "Option::is_none")]
    operations: Option<Vec<SchemaOperation>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the plan command
pub(crate) fn execute(args: &PlanArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let direction = if args.revert {
        Direction::Revert
    } else {
        Direction::Apply
    };

    let selected: Vec<&ManifestMigration> = match args.target_version {
        Some(version) => vec![project.migration(version)?],
        None => project.migrations.iter().collect(),
    };
    let planned = plan(selected, direction);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&planned)?);
    } else {
        for entry in &planned {
            println!("{}: {} ({direction})", entry.version, entry.description);
            match (&entry.operations, &entry.error) {
                (Some(operations), _) => {
                    for operation in operations {
                        println!("  {operation}");
                    }
                }
                (None, Some(err)) => println!("  ✗ {err}"),
                (None, None) => {}
            }
        }
        if global.verbose {
            eprintln!(
                "[verbose] Table ordering: {:?}",
                project.config.ordering
            );
        }
    }

    if planned.iter().any(|p| p.error.is_some()) {
        return Err(ExitCode(1).into());
    }
    Ok(())
}

/// Apply plans run by ascending version; revert plans by descending version
fn plan(mut selected: Vec<&ManifestMigration>, direction: Direction) -> Vec<PlannedMigration<'_>> {
    selected.sort_by_key(|m| m.version());
    if direction == Direction::Revert {
        selected.reverse();
    }

    selected
        .into_iter()
        .map(|migration| {
            let (operations, error) = match migration.operations(direction) {
                Ok(ops) => (Some(ops), None),
                Err(e) => (None, Some(e.to_string())),
            };
            PlannedMigration {
                version: migration.version(),
                description: migration.description(),
                direction,
                operations,
                error,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "plan_test.rs"]
mod tests;
