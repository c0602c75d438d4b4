//! Ledger records and the storage trait behind them.

use crate::error::{LedgerError, LedgerResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// One applied migration version
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedVersionRecord {
    pub version: i64,

    /// Position in the ledger's logical clock when the version was applied
    pub applied_order: i64,

    /// Wall-clock time of the apply
    pub applied_at: DateTime<Utc>,

    /// Logical clock position of a retained revert, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reverted_order: Option<i64>,
}

impl AppliedVersionRecord {
    pub fn new(version: i64, applied_order: i64) -> Self {
        Self {
            version,
            applied_order,
            applied_at: Utc::now(),
            reverted_order: None,
        }
    }

    /// Applied and not since reverted
    pub fn is_active(&self) -> bool {
        self.reverted_order.is_none()
    }

    /// Highest logical clock value this record carries
    pub fn last_order(&self) -> i64 {
        self.reverted_order.unwrap_or(self.applied_order)
    }
}

/// Persistence for ledger records.
///
/// Stores are plain persistence; duplicate and policy checks live in
/// [`crate::VersionLedger`].
pub trait LedgerStore: Send + Sync {
    /// All records ordered by `applied_order`
    fn load(&self) -> LedgerResult<Vec<AppliedVersionRecord>>;

    /// Insert a new record
    fn insert(&self, record: &AppliedVersionRecord) -> LedgerResult<()>;

    /// Set `reverted_order` on an existing record
    fn mark_reverted(&self, version: i64, reverted_order: i64) -> LedgerResult<()>;

    /// Delete a record
    fn remove(&self, version: i64) -> LedgerResult<()>;

    /// Store type identifier for logging
    fn store_type(&self) -> &'static str;
}

/// Ledger store that lives for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryLedgerStore {
    records: Mutex<BTreeMap<i64, AppliedVersionRecord>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> LedgerResult<MutexGuard<'_, BTreeMap<i64, AppliedVersionRecord>>> {
        self.records
            .lock()
            .map_err(|e| LedgerError::MutexPoisoned(e.to_string()))
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn load(&self) -> LedgerResult<Vec<AppliedVersionRecord>> {
        let mut records: Vec<_> = self.lock()?.values().cloned().collect();
        records.sort_by_key(|r| r.applied_order);
        Ok(records)
    }

    fn insert(&self, record: &AppliedVersionRecord) -> LedgerResult<()> {
        let mut records = self.lock()?;
        if records.contains_key(&record.version) {
            return Err(LedgerError::DuplicateVersion {
                version: record.version,
            });
        }
        records.insert(record.version, record.clone());
        Ok(())
    }

    fn mark_reverted(&self, version: i64, reverted_order: i64) -> LedgerResult<()> {
        let mut records = self.lock()?;
        let record = records
            .get_mut(&version)
            .ok_or(LedgerError::NotApplied { version })?;
        record.reverted_order = Some(reverted_order);
        Ok(())
    }

    fn remove(&self, version: i64) -> LedgerResult<()> {
        self.lock()?
            .remove(&version)
            .map(|_| ())
            .ok_or(LedgerError::NotApplied { version })
    }

    fn store_type(&self) -> &'static str {
        "memory"
    }
}
