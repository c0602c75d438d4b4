//! The version ledger.
//!
//! Answers "has this version been applied?" and records new applications.
//! Uniqueness is enforced here, under a write lock, regardless of what the
//! backing store guarantees.

use crate::error::{LedgerError, LedgerResult};
use crate::store::{AppliedVersionRecord, LedgerStore, MemoryLedgerStore};
use pl_core::RevertPolicy;
use std::sync::Mutex;

/// Durable record of applied migration versions
pub struct VersionLedger {
    store: Box<dyn LedgerStore>,
    write_lock: Mutex<()>,
}

impl VersionLedger {
    pub fn new(store: impl LedgerStore + 'static) -> Self {
        Self::from_boxed(Box::new(store))
    }

    pub fn from_boxed(store: Box<dyn LedgerStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Ledger backed by a [`MemoryLedgerStore`]
    pub fn in_memory() -> Self {
        Self::new(MemoryLedgerStore::new())
    }

    pub fn store_type(&self) -> &'static str {
        self.store.store_type()
    }

    /// Whether `version` has a record.
    ///
    /// A version reverted under [`RevertPolicy::Retain`] keeps its record and
    /// therefore still counts as applied.
    pub fn has_applied(&self, version: i64) -> LedgerResult<bool> {
        Ok(self.get(version)?.is_some())
    }

    /// Whether `version` has a record that has not been reverted
    pub fn is_active(&self, version: i64) -> LedgerResult<bool> {
        Ok(self.get(version)?.is_some_and(|r| r.is_active()))
    }

    /// Whether `version` was reverted and its record retained
    pub fn is_reverted(&self, version: i64) -> LedgerResult<bool> {
        Ok(self.get(version)?.is_some_and(|r| !r.is_active()))
    }

    pub fn get(&self, version: i64) -> LedgerResult<Option<AppliedVersionRecord>> {
        Ok(self
            .store
            .load()?
            .into_iter()
            .find(|r| r.version == version))
    }

    /// All records in the order they were applied
    pub fn applied(&self) -> LedgerResult<Vec<AppliedVersionRecord>> {
        self.store.load()
    }

    /// Highest version whose record is active
    pub fn latest_applied(&self) -> LedgerResult<Option<i64>> {
        Ok(self
            .store
            .load()?
            .iter()
            .filter(|r| r.is_active())
            .map(|r| r.version)
            .max())
    }

    /// Record a successful apply.
    ///
    /// Fails with [`LedgerError::DuplicateVersion`] if the version already has
    /// a record; the ledger is left unchanged.
    pub fn record_applied(&self, version: i64) -> LedgerResult<AppliedVersionRecord> {
        let _write = self.write_guard()?;
        let records = self.store.load()?;
        if records.iter().any(|r| r.version == version) {
            return Err(LedgerError::DuplicateVersion { version });
        }

        let record = AppliedVersionRecord::new(version, next_order(&records));
        self.store.insert(&record)?;
        log::debug!(
            "Ledger ({}) recorded v{version} at order {}",
            self.store.store_type(),
            record.applied_order
        );
        Ok(record)
    }

    /// Record a successful revert under `policy`.
    ///
    /// Fails with [`LedgerError::NotApplied`] when the version has no active
    /// record.
    pub fn record_reverted(&self, version: i64, policy: RevertPolicy) -> LedgerResult<()> {
        let _write = self.write_guard()?;
        let records = self.store.load()?;
        if !records.iter().any(|r| r.version == version && r.is_active()) {
            return Err(LedgerError::NotApplied { version });
        }

        match policy {
            RevertPolicy::Retain => {
                let order = next_order(&records);
                self.store.mark_reverted(version, order)?;
                log::debug!("Ledger marked v{version} reverted at order {order}");
            }
            RevertPolicy::Release => {
                self.store.remove(version)?;
                log::debug!("Ledger released v{version}");
            }
        }
        Ok(())
    }

    fn write_guard(&self) -> LedgerResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| LedgerError::MutexPoisoned(e.to_string()))
    }
}

fn next_order(records: &[AppliedVersionRecord]) -> i64 {
    records.iter().map(|r| r.last_order()).max().unwrap_or(0) + 1
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
