//! DuckDB DDL rendering for schema operations.
//!
//! Each operation renders to one or more statements that the executor runs
//! inside a single transaction. DuckDB accepts no constraints in
//! `ALTER TABLE ... ADD COLUMN`, so a non-nullable added column becomes an
//! add followed by `SET NOT NULL`, and identity columns draw their values from
//! a sequence created alongside the table and dropped with it.

use crate::error::{DbError, DbResult};
use pl_core::{ColumnDefinition, ColumnKey, LogicalType, SchemaOperation, TableName};

const BACKEND: &str = "duckdb";

/// DuckDB column type for a logical type
pub(crate) fn sql_type(data_type: LogicalType) -> &'static str {
    match data_type {
        LogicalType::Integer16 => "SMALLINT",
        LogicalType::Integer32 => "INTEGER",
        LogicalType::Integer64 => "BIGINT",
        LogicalType::Boolean => "BOOLEAN",
        LogicalType::Double => "DOUBLE",
        LogicalType::Decimal => "DECIMAL(18, 3)",
        LogicalType::Text => "VARCHAR",
        LogicalType::Date => "DATE",
        LogicalType::DateTime => "TIMESTAMP",
        LogicalType::Uuid => "UUID",
    }
}

/// Render the statements for one operation, in execution order
pub(crate) fn render_operation(operation: &SchemaOperation) -> DbResult<Vec<String>> {
    match operation {
        SchemaOperation::CreateTable {
            table,
            first_column,
        } => Ok(render_create_table(table, first_column)),
        SchemaOperation::AddColumn { table, column } => render_add_column(table, column),
        SchemaOperation::DropTable { table } => Ok(render_drop_table(table, &[])),
    }
}

/// Drop a table, then any identity sequences of its `columns`
pub(crate) fn render_drop_table(table: &TableName, columns: &[String]) -> Vec<String> {
    let mut statements = vec![format!("DROP TABLE IF EXISTS {}", table.quoted())];
    statements.extend(columns.iter().map(|column| {
        format!(
            "DROP SEQUENCE IF EXISTS {}",
            quote(&sequence_name(table.as_str(), column))
        )
    }));
    statements
}

fn render_create_table(table: &TableName, column: &ColumnDefinition) -> Vec<String> {
    let mut statements = Vec::with_capacity(2);
    let mut column_sql = format!("{} {}", column.name.quoted(), sql_type(column.data_type));

    if column.key.is_primary_key() {
        column_sql.push_str(" PRIMARY KEY");
    } else if !column.nullable {
        column_sql.push_str(" NOT NULL");
    }

    if column.key.is_identity() {
        let sequence = quote(&sequence_name(table.as_str(), column.name.as_str()));
        statements.push(format!("CREATE SEQUENCE IF NOT EXISTS {sequence}"));
        column_sql.push_str(&format!(
            " DEFAULT nextval('{}')",
            sequence.replace('\'', "''")
        ));
    }

    if let Some(reference) = &column.references {
        column_sql.push_str(&format!(
            " REFERENCES {} ({})",
            quote(&reference.table),
            quote(&reference.column)
        ));
    }

    statements.push(format!("CREATE TABLE {} ({column_sql})", table.quoted()));
    statements
}

fn render_add_column(table: &TableName, column: &ColumnDefinition) -> DbResult<Vec<String>> {
    if column.key != ColumnKey::Plain {
        return Err(DbError::NotImplemented {
            backend: BACKEND.to_string(),
            feature: format!("adding key column '{}' to an existing table", column.name),
        });
    }
    if column.references.is_some() {
        return Err(DbError::NotImplemented {
            backend: BACKEND.to_string(),
            feature: format!(
                "foreign key on added column '{}'; declare it as the first column of the table",
                column.name
            ),
        });
    }

    let mut statements = vec![format!(
        "ALTER TABLE {} ADD COLUMN {} {}",
        table.quoted(),
        column.name.quoted(),
        sql_type(column.data_type)
    )];
    if !column.nullable {
        statements.push(format!(
            "ALTER TABLE {} ALTER COLUMN {} SET NOT NULL",
            table.quoted(),
            column.name.quoted()
        ));
    }
    Ok(statements)
}

/// Sequence backing an identity column.
///
/// The trailing table length keeps names distinct when table or column names
/// contain underscores (`A_B`.`C` vs `A`.`B_C`).
fn sequence_name(table: &str, column: &str) -> String {
    format!("{table}_{column}_seq_{}", table.chars().count())
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

#[cfg(test)]
#[path = "ddl_test.rs"]
mod tests;
