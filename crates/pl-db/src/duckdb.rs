//! DuckDB schema executor implementation

use crate::ddl::{render_drop_table, render_operation};
use crate::error::{DbError, DbResult};
use crate::traits::SchemaExecutor;
use duckdb::Connection;
use pl_core::SchemaOperation;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Applies schema operations to a DuckDB database
pub struct DuckDbExecutor {
    conn: Mutex<Connection>,
}

impl DuckDbExecutor {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// A second connection to the same database, e.g. for the version ledger.
    ///
    /// In-memory databases are only reachable this way.
    pub fn try_clone_connection(&self) -> DbResult<Connection> {
        let conn = self.lock()?;
        conn.try_clone()
            .map_err(|e| DbError::ConnectionError(e.to_string()))
    }

    /// Check if a table exists in the main schema
    pub fn relation_exists(&self, name: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = 'main' AND table_name = ?",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Column names of a table in ordinal order
    pub fn column_names(&self, table: &str) -> DbResult<Vec<String>> {
        let conn = self.lock()?;
        let names = table_columns(&conn, table)?;
        if names.is_empty() {
            return Err(DbError::TableNotFound(table.to_string()));
        }
        Ok(names)
    }

    /// Execute raw SQL, for seeding and inspection
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::ExecutionError(e.to_string()))
    }

    /// Count rows returned by a query
    pub fn query_count(&self, sql: &str) -> DbResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM ({sql})"), [], |row| {
                row.get(0)
            })
            .map_err(|e| DbError::ExecutionError(e.to_string()))?;
        Ok(count as usize)
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }
}

fn table_columns(conn: &Connection, table: &str) -> DbResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT column_name FROM information_schema.columns \
         WHERE table_schema = 'main' AND table_name = ? ORDER BY ordinal_position",
    )?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

impl SchemaExecutor for DuckDbExecutor {
    fn execute(&self, operation: &SchemaOperation) -> DbResult<()> {
        let mut conn = self.lock()?;
        let statements = match operation {
            SchemaOperation::DropTable { table } => {
                render_drop_table(table, &table_columns(&conn, table.as_str())?)
            }
            other => render_operation(other)?,
        };
        let tx = conn.transaction()?;
        for sql in &statements {
            log::debug!("duckdb: {sql}");
            tx.execute_batch(sql)
                .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))?;
        }
        tx.commit()?;
        Ok(())
    }

    fn executor_type(&self) -> &'static str {
        "duckdb"
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
