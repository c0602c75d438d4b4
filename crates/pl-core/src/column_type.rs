//! Column type resolution.
//!
//! Maps a manifest [`ColumnSpec`] to a [`ColumnDefinition`]. Every combination
//! of logical type and flags resolves to either a definition or an explicit
//! [`ResolveError`]; no flag is ever dropped silently.

use crate::error::{ResolveError, ResolveResult};
use crate::manifest::{ColumnReference, ColumnSpec};
use crate::names::ColumnName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dialect-independent column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalType {
    Integer16,
    Integer32,
    Integer64,
    Boolean,
    Double,
    Decimal,
    Text,
    Date,
    DateTime,
    Uuid,
}

impl LogicalType {
    /// Every supported type, in declaration order
    pub const ALL: [LogicalType; 10] = [
        LogicalType::Integer16,
        LogicalType::Integer32,
        LogicalType::Integer64,
        LogicalType::Boolean,
        LogicalType::Double,
        LogicalType::Decimal,
        LogicalType::Text,
        LogicalType::Date,
        LogicalType::DateTime,
        LogicalType::Uuid,
    ];

    /// Parse a manifest type name (case-insensitive, common aliases accepted)
    pub fn parse(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        let ty = match lowered.as_str() {
            "integer16" | "int16" | "smallint" | "short" => LogicalType::Integer16,
            "integer32" | "int32" | "int" | "integer" => LogicalType::Integer32,
            "integer64" | "int64" | "bigint" | "long" => LogicalType::Integer64,
            "boolean" | "bool" => LogicalType::Boolean,
            "double" | "float" => LogicalType::Double,
            "decimal" | "numeric" => LogicalType::Decimal,
            "text" | "string" | "ansistring" => LogicalType::Text,
            "date" => LogicalType::Date,
            "datetime" | "timestamp" => LogicalType::DateTime,
            "uuid" | "guid" => LogicalType::Uuid,
            _ => return None,
        };
        Some(ty)
    }

    /// Whether the type can back an identity (auto-increment) column
    pub fn is_incrementable(self) -> bool {
        matches!(
            self,
            LogicalType::Integer16 | LogicalType::Integer32 | LogicalType::Integer64
        )
    }

    /// Short lowercase name used in operation display
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalType::Integer16 => "int16",
            LogicalType::Integer32 => "int32",
            LogicalType::Integer64 => "int64",
            LogicalType::Boolean => "boolean",
            LogicalType::Double => "double",
            LogicalType::Decimal => "decimal",
            LogicalType::Text => "text",
            LogicalType::Date => "date",
            LogicalType::DateTime => "datetime",
            LogicalType::Uuid => "uuid",
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key role of a column, covering all four primary-key/identity combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKey {
    PrimaryKeyIdentity,
    PrimaryKey,
    Identity,
    Plain,
}

impl ColumnKey {
    pub fn from_flags(primary_key: bool, identity: bool) -> Self {
        match (primary_key, identity) {
            (true, true) => ColumnKey::PrimaryKeyIdentity,
            (true, false) => ColumnKey::PrimaryKey,
            (false, true) => ColumnKey::Identity,
            (false, false) => ColumnKey::Plain,
        }
    }

    pub fn is_primary_key(self) -> bool {
        matches!(self, ColumnKey::PrimaryKeyIdentity | ColumnKey::PrimaryKey)
    }

    pub fn is_identity(self) -> bool {
        matches!(self, ColumnKey::PrimaryKeyIdentity | ColumnKey::Identity)
    }
}

/// A resolved column, ready to be placed in a schema operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    pub name: ColumnName,
    pub data_type: LogicalType,
    pub key: ColumnKey,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<ColumnReference>,
}

impl fmt::Display for ColumnDefinition {
    /// `Id: int64 pk identity`, `Name: text nullable`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.data_type)?;
        if self.key.is_primary_key() {
            f.write_str(" pk")?;
        }
        if self.key.is_identity() {
            f.write_str(" identity")?;
        }
        if self.nullable {
            f.write_str(" nullable")?;
        }
        if let Some(r) = &self.references {
            write!(f, " -> {}.{}", r.table, r.column)?;
        }
        Ok(())
    }
}

/// Resolve the column materialized together with its table.
///
/// Carries the primary-key and identity flags. Identity requires an integer
/// type and key columns are never nullable.
pub fn resolve_first_column(spec: &ColumnSpec) -> ResolveResult<ColumnDefinition> {
    let name = resolve_name(spec)?;
    let data_type = resolve_type(spec)?;
    let key = ColumnKey::from_flags(spec.is_primary_key, spec.is_identity);

    if key.is_identity() && !data_type.is_incrementable() {
        return Err(invalid_flags(
            spec,
            format!("identity requires an integer type, found {data_type}"),
        ));
    }
    if key != ColumnKey::Plain && spec.is_nullable {
        return Err(invalid_flags(
            spec,
            "primary key and identity columns cannot be nullable".to_string(),
        ));
    }

    Ok(ColumnDefinition {
        name,
        data_type,
        key,
        nullable: spec.is_nullable,
        references: spec.references.clone(),
    })
}

/// Resolve a column added after table creation.
///
/// Carries the nullable flag. Keys can only be declared at creation, so a
/// primary-key or identity flag here is rejected.
pub fn resolve_subsequent_column(spec: &ColumnSpec) -> ResolveResult<ColumnDefinition> {
    let name = resolve_name(spec)?;
    let data_type = resolve_type(spec)?;

    if spec.is_primary_key || spec.is_identity {
        return Err(invalid_flags(
            spec,
            "primary key and identity can only be declared on the first column of a table"
                .to_string(),
        ));
    }

    Ok(ColumnDefinition {
        name,
        data_type,
        key: ColumnKey::Plain,
        nullable: spec.is_nullable,
        references: spec.references.clone(),
    })
}

fn resolve_name(spec: &ColumnSpec) -> ResolveResult<ColumnName> {
    ColumnName::try_new(spec.name.as_str()).ok_or(ResolveError::EmptyColumnName)
}

fn resolve_type(spec: &ColumnSpec) -> ResolveResult<LogicalType> {
    LogicalType::parse(&spec.type_name).ok_or_else(|| ResolveError::UnsupportedType {
        column: spec.name.clone(),
        type_name: spec.type_name.clone(),
    })
}

fn invalid_flags(spec: &ColumnSpec, reason: String) -> ResolveError {
    ResolveError::InvalidFlagCombination {
        column: spec.name.clone(),
        reason,
    }
}

#[cfg(test)]
#[path = "column_type_test.rs"]
mod tests;
