//! Schema operations handed to the execution collaborator.

use crate::column_type::ColumnDefinition;
use crate::names::TableName;
use serde::Serialize;
use std::fmt;

/// A single schema-change instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SchemaOperation {
    /// Create a table with its first column
    CreateTable {
        table: TableName,
        first_column: ColumnDefinition,
    },
    /// Add a column to an existing table
    AddColumn {
        table: TableName,
        column: ColumnDefinition,
    },
    /// Drop a table
    DropTable { table: TableName },
}

impl SchemaOperation {
    /// The table this operation targets
    pub fn table(&self) -> &TableName {
        match self {
            SchemaOperation::CreateTable { table, .. }
            | SchemaOperation::AddColumn { table, .. }
            | SchemaOperation::DropTable { table } => table,
        }
    }

    /// Operation kind for logs
    pub fn kind(&self) -> &'static str {
        match self {
            SchemaOperation::CreateTable { .. } => "CreateTable",
            SchemaOperation::AddColumn { .. } => "AddColumn",
            SchemaOperation::DropTable { .. } => "DropTable",
        }
    }
}

impl fmt::Display for SchemaOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaOperation::CreateTable {
                table,
                first_column,
            } => write!(f, "CreateTable({table}, {first_column})"),
            SchemaOperation::AddColumn { table, column } => {
                write!(f, "AddColumn({table}, {column})")
            }
            SchemaOperation::DropTable { table } => write!(f, "DropTable({table})"),
        }
    }
}
