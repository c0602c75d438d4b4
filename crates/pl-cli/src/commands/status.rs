//! Status command implementation

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pl_core::MigrationLogic;
use pl_meta::AppliedVersionRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{load_project, open_target};

/// Ledger state of one version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum VersionState {
    Applied,
    Reverted,
    Pending,
    /// Recorded in the ledger but missing from the manifest
    Unknown,
}

impl fmt::Display for VersionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionState::Applied => write!(f, "applied"),
            VersionState::Reverted => write!(f, "reverted"),
            VersionState::Pending => write!(f, "pending"),
            VersionState::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct StatusRow {
    pub version: i64,
    pub description: Option<String>,
    pub state: VersionState,
    pub applied_at: Option<DateTime<Utc>>,
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let target = open_target(&project, global)?;
    let records = target
        .ledger
        .applied()
        .context("Failed to read version ledger")?;

    let manifest: Vec<(i64, &str)> = project
        .migrations
        .iter()
        .map(|m| (m.version(), m.description()))
        .collect();
    let rows = build_rows(&manifest, &records);

    match args.output {
        StatusOutput::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        StatusOutput::Table => print_table(&rows),
    }
    Ok(())
}

/// Merge manifest versions with ledger records, ascending by version
pub(crate) fn build_rows(
    manifest: &[(i64, &str)],
    records: &[AppliedVersionRecord],
) -> Vec<StatusRow> {
    let by_version: BTreeMap<i64, &AppliedVersionRecord> =
        records.iter().map(|r| (r.version, r)).collect();

    let mut rows: BTreeMap<i64, StatusRow> = BTreeMap::new();
    for &(version, description) in manifest {
        let record = by_version.get(&version);
        let state = match record {
            Some(r) if r.is_active() => VersionState::Applied,
            Some(_) => VersionState::Reverted,
            None => VersionState::Pending,
        };
        rows.insert(
            version,
            StatusRow {
                version,
                description: Some(description.to_string()),
                state,
                applied_at: record.map(|r| r.applied_at),
            },
        );
    }

    for (version, record) in by_version {
        rows.entry(version).or_insert_with(|| StatusRow {
            version,
            description: None,
            state: VersionState::Unknown,
            applied_at: Some(record.applied_at),
        });
    }

    rows.into_values().collect()
}

fn print_table(rows: &[StatusRow]) {
    if rows.is_empty() {
        println!("No migrations found.");
        return;
    }

    let width = rows
        .iter()
        .filter_map(|r| r.description.as_deref())
        .map(str::len)
        .max()
        .unwrap_or(0)
        .max("DESCRIPTION".len());

    println!(
        "{:>8}  {:<width$}  {:<8}  APPLIED AT",
        "VERSION", "DESCRIPTION", "STATE"
    );
    for row in rows {
        let applied_at = row
            .applied_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>8}  {:<width$}  {:<8}  {applied_at}",
            row.version,
            row.description.as_deref().unwrap_or("-"),
            row.state.to_string(),
        );
    }

    let pending = rows
        .iter()
        .filter(|r| r.state == VersionState::Pending)
        .count();
    println!();
    println!("{} version(s), {pending} pending", rows.len());
}

#[cfg(test)]
#[path = "status_test.rs"]
mod tests;
