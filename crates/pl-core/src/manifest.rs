//! Migration manifest model and loading.
//!
//! A manifest is a list of migration descriptors. Each descriptor names a
//! version, a description, and the tables it creates. Descriptors are
//! immutable once loaded; structural checks (empty tables, duplicate names)
//! happen in the builder, not here, so that a bad descriptor fails the same way
//! whether it came from a file or from code.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// A set of migration descriptors loaded from one manifest file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Descriptors in file order
    #[serde(default)]
    pub migrations: Vec<MigrationDescriptor>,
}

/// One versioned, described unit of schema change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationDescriptor {
    /// Externally assigned, unique version
    pub version: i64,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tables in creation order
    #[serde(default)]
    pub tables: Vec<TableSpec>,
}

/// A table and its ordered columns.
///
/// `columns[0]` is created together with the table; the rest are added
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSpec {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

/// A column as declared in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ColumnSpec {
    pub name: String,

    /// Logical type name, resolved by [`crate::column_type::LogicalType::parse`]
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub is_primary_key: bool,

    #[serde(default)]
    pub is_identity: bool,

    #[serde(default)]
    pub is_nullable: bool,

    /// Table/column this column points at, used for dependency ordering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<ColumnReference>,
}

/// Foreign-key style pointer from a column to another table's column
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColumnReference {
    pub table: String,
    pub column: String,
}

impl Manifest {
    /// Load a manifest from a `.json`, `.yml` or `.yaml` file
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ManifestNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let manifest = match extension.as_deref() {
            Some("json") => Self::from_json_str(&content)?,
            Some("yml") | Some("yaml") => Self::from_yaml_str(&content)?,
            _ => {
                return Err(CoreError::UnsupportedManifestFormat {
                    path: path.display().to_string(),
                })
            }
        };

        log::debug!(
            "Loaded manifest {} with {} migration(s)",
            path.display(),
            manifest.migrations.len()
        );
        Ok(manifest)
    }

    /// Parse and validate a JSON manifest
    pub fn from_json_str(content: &str) -> CoreResult<Self> {
        let manifest: Manifest = serde_json::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Parse and validate a YAML manifest
    pub fn from_yaml_str(content: &str) -> CoreResult<Self> {
        let manifest: Manifest = serde_yaml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reject manifests that declare the same version twice
    pub fn validate(&self) -> CoreResult<()> {
        let mut seen = HashSet::new();
        for migration in &self.migrations {
            if !seen.insert(migration.version) {
                return Err(CoreError::DuplicateVersion {
                    version: migration.version,
                });
            }
        }
        Ok(())
    }

    /// Look up a descriptor by version
    pub fn get(&self, version: i64) -> Option<&MigrationDescriptor> {
        self.migrations.iter().find(|m| m.version == version)
    }

    /// Descriptors sorted by ascending version
    pub fn sorted(&self) -> Vec<&MigrationDescriptor> {
        let mut sorted: Vec<_> = self.migrations.iter().collect();
        sorted.sort_by_key(|m| m.version);
        sorted
    }
}

impl MigrationDescriptor {
    pub fn new(version: i64, description: impl Into<String>, tables: Vec<TableSpec>) -> Self {
        Self {
            version,
            description: description.into(),
            tables,
        }
    }

    /// `"<version>: <description>"`, used in logs and reports
    pub fn label(&self) -> String {
        format!("{}: {}", self.version, self.description)
    }
}

impl TableSpec {
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// The column materialized at table creation
    pub fn first_column(&self) -> Option<&ColumnSpec> {
        self.columns.first()
    }

    /// Columns materialized by subsequent add-column operations
    pub fn remaining_columns(&self) -> &[ColumnSpec] {
        self.columns.get(1..).unwrap_or(&[])
    }

    /// Names of other tables this table references, in column order, deduplicated
    pub fn referenced_tables(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.columns
            .iter()
            .filter_map(|c| c.references.as_ref())
            .map(|r| r.table.as_str())
            .filter(|t| *t != self.name && seen.insert(*t))
            .collect()
    }
}

impl ColumnSpec {
    /// A non-key, non-nullable column of the given logical type name
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_primary_key: false,
            is_identity: false,
            is_nullable: false,
            references: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.references = Some(ColumnReference {
            table: table.into(),
            column: column.into(),
        });
        self
    }
}

#[cfg(test)]
#[path = "manifest_test.rs"]
mod tests;
