//! DuckDB-backed ledger store.
//!
//! Records live in `<schema>.<table>` (default `pl_meta.version_info`),
//! created on open. The store can share a database with the schema executor
//! by taking a cloned connection.

use crate::error::{LedgerError, LedgerResult};
use crate::store::{AppliedVersionRecord, LedgerStore};
use chrono::{DateTime, Utc};
use duckdb::Connection;
use pl_core::LedgerConfig;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Ledger store persisted in a DuckDB table
pub struct DuckDbLedgerStore {
    conn: Mutex<Connection>,
    qualified_table: String,
}

impl DuckDbLedgerStore {
    /// Open (or create) a database file and ensure the default ledger table
    pub fn open(path: &Path) -> LedgerResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| LedgerError::Store(format!("{e}: {}", path.display())))?;
        Self::from_connection(conn, &LedgerConfig::default())
    }

    /// Open an in-memory database
    pub fn in_memory() -> LedgerResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, &LedgerConfig::default())
    }

    /// Use an existing connection and ensure the configured ledger table.
    ///
    /// Schema and table names are interpolated unquoted; `Config::validate`
    /// restricts them to plain identifiers.
    pub fn from_connection(conn: Connection, config: &LedgerConfig) -> LedgerResult<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            qualified_table: format!("{}.{}", config.schema, config.table),
        };
        store.ensure_table(&config.schema)?;
        Ok(store)
    }

    /// `<schema>.<table>`
    pub fn qualified_table(&self) -> &str {
        &self.qualified_table
    }

    fn ensure_table(&self, schema: &str) -> LedgerResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(&format!(
            "CREATE SCHEMA IF NOT EXISTS {schema};
             CREATE TABLE IF NOT EXISTS {table} (
                 version        BIGINT PRIMARY KEY,
                 applied_order  BIGINT NOT NULL,
                 applied_at     VARCHAR NOT NULL,
                 reverted_order BIGINT
             );",
            table = self.qualified_table
        ))
        .map_err(|e| {
            LedgerError::Store(format!(
                "failed to create ledger table {}: {e}",
                self.qualified_table
            ))
        })?;
        log::debug!("Ledger table {} ready", self.qualified_table);
        Ok(())
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| LedgerError::MutexPoisoned(e.to_string()))
    }
}

impl LedgerStore for DuckDbLedgerStore {
    fn load(&self) -> LedgerResult<Vec<AppliedVersionRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT version, applied_order, applied_at, reverted_order FROM {} ORDER BY applied_order",
            self.qualified_table
        ))?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(version, applied_order, applied_at, reverted_order)| {
                Ok(AppliedVersionRecord {
                    version,
                    applied_order,
                    applied_at: parse_timestamp(&applied_at)?,
                    reverted_order,
                })
            })
            .collect()
    }

    fn insert(&self, record: &AppliedVersionRecord) -> LedgerResult<()> {
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (version, applied_order, applied_at, reverted_order) VALUES (?, ?, ?, ?)",
                self.qualified_table
            ),
            duckdb::params![
                record.version,
                record.applied_order,
                record.applied_at.to_rfc3339(),
                record.reverted_order
            ],
        )?;
        Ok(())
    }

    fn mark_reverted(&self, version: i64, reverted_order: i64) -> LedgerResult<()> {
        let conn = self.lock()?;
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET reverted_order = ? WHERE version = ?",
                self.qualified_table
            ),
            duckdb::params![reverted_order, version],
        )?;
        if updated == 0 {
            return Err(LedgerError::NotApplied { version });
        }
        Ok(())
    }

    fn remove(&self, version: i64) -> LedgerResult<()> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE version = ?", self.qualified_table),
            duckdb::params![version],
        )?;
        if deleted == 0 {
            return Err(LedgerError::NotApplied { version });
        }
        Ok(())
    }

    fn store_type(&self) -> &'static str {
        "duckdb"
    }
}

fn parse_timestamp(value: &str) -> LedgerResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| LedgerError::Store(format!("invalid applied_at '{value}': {e}")))
}

#[cfg(test)]
#[path = "duckdb_store_test.rs"]
mod tests;
