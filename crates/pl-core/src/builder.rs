//! Operation building.
//!
//! Turns a [`MigrationDescriptor`] into an ordered sequence of
//! [`SchemaOperation`]s. The apply sequence creates each table with its first
//! column and then adds the remaining columns one by one; the revert sequence
//! drops the tables in the opposite order. Both are pure and deterministic.

use crate::column_type::{resolve_first_column, resolve_subsequent_column};
use crate::error::{BuildError, BuildResult, ResolveError};
use crate::manifest::{ColumnSpec, MigrationDescriptor, TableSpec};
use crate::names::TableName;
use crate::operation::SchemaOperation;
use crate::ordering::TableGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How tables of one descriptor are sequenced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableOrdering {
    /// Manifest order, trusted as written
    #[default]
    Declared,
    /// Referenced tables are created before the tables that reference them
    Dependency,
}

/// Accumulates schema operations in emission order
#[derive(Debug, Default)]
pub struct OperationBuilder {
    operations: Vec<SchemaOperation>,
}

impl OperationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `CreateTable` with the resolved first column
    pub fn create_table(
        &mut self,
        table: &str,
        first_column: &ColumnSpec,
    ) -> BuildResult<&mut Self> {
        let table_name = table_name(table)?;
        let first_column =
            resolve_first_column(first_column).map_err(|e| resolution_error(table, e))?;
        self.operations.push(SchemaOperation::CreateTable {
            table: table_name,
            first_column,
        });
        Ok(self)
    }

    /// Emit `AddColumn` for a column added after creation
    pub fn add_column(&mut self, table: &str, column: &ColumnSpec) -> BuildResult<&mut Self> {
        let table_name = table_name(table)?;
        let column = resolve_subsequent_column(column).map_err(|e| resolution_error(table, e))?;
        self.operations.push(SchemaOperation::AddColumn {
            table: table_name,
            column,
        });
        Ok(self)
    }

    /// Emit `DropTable`
    pub fn drop_table(&mut self, table: &str) -> BuildResult<&mut Self> {
        let table = table_name(table)?;
        self.operations.push(SchemaOperation::DropTable { table });
        Ok(self)
    }

    /// Emit one `CreateTable` followed by one `AddColumn` per remaining column
    pub fn table(&mut self, spec: &TableSpec) -> BuildResult<&mut Self> {
        let first = spec.first_column().ok_or_else(|| BuildError::EmptyTable {
            table: spec.name.clone(),
        })?;
        self.create_table(&spec.name, first)?;
        for column in spec.remaining_columns() {
            self.add_column(&spec.name, column)?;
        }
        Ok(self)
    }

    /// Emit the apply sequence of a whole descriptor
    pub fn apply_descriptor(
        &mut self,
        descriptor: &MigrationDescriptor,
        ordering: TableOrdering,
    ) -> BuildResult<&mut Self> {
        for table in ordered_tables(descriptor, ordering)? {
            self.table(table)?;
        }
        Ok(self)
    }

    /// Emit the revert sequence of a whole descriptor
    pub fn revert_descriptor(
        &mut self,
        descriptor: &MigrationDescriptor,
        ordering: TableOrdering,
    ) -> BuildResult<&mut Self> {
        for table in ordered_tables(descriptor, ordering)?.into_iter().rev() {
            self.drop_table(&table.name)?;
        }
        Ok(self)
    }

    /// Operations emitted so far
    pub fn operations(&self) -> &[SchemaOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Consume the builder and return the operation sequence
    pub fn finish(self) -> Vec<SchemaOperation> {
        self.operations
    }
}

/// Build the apply sequence in manifest order
pub fn build_apply_operations(
    descriptor: &MigrationDescriptor,
) -> BuildResult<Vec<SchemaOperation>> {
    build_apply_operations_with(descriptor, TableOrdering::Declared)
}

/// Build the apply sequence with an explicit table ordering
pub fn build_apply_operations_with(
    descriptor: &MigrationDescriptor,
    ordering: TableOrdering,
) -> BuildResult<Vec<SchemaOperation>> {
    let mut builder = OperationBuilder::new();
    builder.apply_descriptor(descriptor, ordering)?;
    Ok(builder.finish())
}

/// Build the revert sequence in reverse manifest order
pub fn build_revert_operations(
    descriptor: &MigrationDescriptor,
) -> BuildResult<Vec<SchemaOperation>> {
    build_revert_operations_with(descriptor, TableOrdering::Declared)
}

/// Build the revert sequence with an explicit table ordering
pub fn build_revert_operations_with(
    descriptor: &MigrationDescriptor,
    ordering: TableOrdering,
) -> BuildResult<Vec<SchemaOperation>> {
    let mut builder = OperationBuilder::new();
    builder.revert_descriptor(descriptor, ordering)?;
    Ok(builder.finish())
}

/// Check table and column structure without resolving types.
///
/// Runs for both directions so a malformed descriptor cannot be reverted
/// either.
pub fn validate_descriptor(descriptor: &MigrationDescriptor) -> BuildResult<()> {
    let mut table_names = HashSet::new();
    for table in &descriptor.tables {
        if table.name.is_empty() {
            return Err(BuildError::EmptyTableName);
        }
        if !table_names.insert(table.name.as_str()) {
            return Err(BuildError::DuplicateTable {
                table: table.name.clone(),
            });
        }
        if table.columns.is_empty() {
            return Err(BuildError::EmptyTable {
                table: table.name.clone(),
            });
        }

        let mut column_names = HashSet::new();
        for column in &table.columns {
            if !column_names.insert(column.name.as_str()) {
                return Err(BuildError::DuplicateColumn {
                    table: table.name.clone(),
                    column: column.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Validated tables in creation order
pub fn ordered_tables(
    descriptor: &MigrationDescriptor,
    ordering: TableOrdering,
) -> BuildResult<Vec<&TableSpec>> {
    validate_descriptor(descriptor)?;
    match ordering {
        TableOrdering::Declared => Ok(descriptor.tables.iter().collect()),
        TableOrdering::Dependency => {
            let order = TableGraph::build(&descriptor.tables).order()?;
            Ok(order.into_iter().map(|i| &descriptor.tables[i]).collect())
        }
    }
}

fn table_name(table: &str) -> BuildResult<TableName> {
    TableName::try_new(table).ok_or(BuildError::EmptyTableName)
}

fn resolution_error(table: &str, source: ResolveError) -> BuildError {
    BuildError::Resolution {
        table: table.to_string(),
        source,
    }
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
