//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Plover - apply and revert schema migrations described by a manifest
#[derive(Parser, Debug)]
#[command(name = "plover")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations, or a single version
    Apply(ApplyArgs),

    /// Revert one applied migration
    Revert(RevertArgs),

    /// Show applied, reverted and pending versions
    Status(StatusArgs),

    /// Print the operation sequence without touching the database
    Plan(PlanArgs),
}

/// Arguments for the apply command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Apply only this version
    #[arg(long = "version", value_name = "VERSION")]
    pub target_version: Option<i64>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Show what would run without executing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the revert command
#[derive(Args, Debug)]
pub struct RevertArgs {
    /// Version to revert
    #[arg(long = "version", value_name = "VERSION")]
    pub target_version: i64,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Human-readable table
    Table,
    /// JSON array of versions
    Json,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Plan only this version (default: all)
    #[arg(long = "version", value_name = "VERSION")]
    pub target_version: Option<i64>,

    /// Plan the revert direction
    #[arg(long)]
    pub revert: bool,

    /// Print operations as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
