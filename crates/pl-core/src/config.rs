//! Configuration types and parsing for plover.yml

use crate::builder::TableOrdering;
use crate::error::{CoreError, CoreResult};
use crate::serde_helpers::default_true;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main project configuration from plover.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Manifest file, relative to the project directory
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Where the version ledger is stored
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// What reverting does to the ledger record
    #[serde(default)]
    pub revert_policy: RevertPolicy,

    /// Table ordering within one migration
    #[serde(default)]
    pub ordering: TableOrdering,

    /// Prompt before running a migration
    #[serde(default = "default_true")]
    pub confirm: bool,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database file path, or `:memory:`
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DbType::default(),
            path: default_db_path(),
        }
    }
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.path == ":memory:"
    }
}

/// Location of the version ledger table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    #[serde(default = "default_ledger_schema")]
    pub schema: String,

    #[serde(default = "default_ledger_table")]
    pub table: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            schema: default_ledger_schema(),
            table: default_ledger_table(),
        }
    }
}

/// Effect of a successful revert on the version ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RevertPolicy {
    /// Keep the record and mark it reverted; the version cannot be applied again
    #[default]
    Retain,
    /// Remove the record; the version becomes pending again
    Release,
}

impl std::fmt::Display for RevertPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RevertPolicy::Retain => write!(f, "retain"),
            RevertPolicy::Release => write!(f, "release"),
        }
    }
}

fn default_manifest() -> String {
    "manifest.json".to_string()
}

fn default_db_path() -> String {
    "target/plover.duckdb".to_string()
}

fn default_ledger_schema() -> String {
    "pl_meta".to_string()
}

fn default_ledger_table() -> String {
    "version_info".to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for plover.yml or plover.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("plover.yml");
        let yaml_path = dir.join("plover.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: yml_path.display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.name.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.manifest.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "manifest path cannot be empty".to_string(),
            });
        }

        if self.database.path.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "database.path cannot be empty".to_string(),
            });
        }

        for (field, value) in [
            ("ledger.schema", &self.ledger.schema),
            ("ledger.table", &self.ledger.table),
        ] {
            if !is_plain_identifier(value) {
                return Err(CoreError::ConfigInvalid {
                    message: format!(
                        "{field} '{value}' must start with a letter or underscore and contain only letters, digits and underscores"
                    ),
                });
            }
        }

        Ok(())
    }

    /// Absolute path of the manifest file
    pub fn manifest_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.manifest)
    }

    /// Absolute database path; `:memory:` is returned unchanged
    pub fn database_path_absolute(&self, root: &Path) -> String {
        if self.database.is_in_memory() {
            return self.database.path.clone();
        }
        root.join(&self.database.path).display().to_string()
    }
}

/// Ledger schema and table names are interpolated into DDL, so they are
/// restricted to unquoted-safe identifiers.
fn is_plain_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
