//! Up/down migration logic.
//!
//! A migration is anything that can describe its apply and revert steps to an
//! [`OperationBuilder`]. Manifest descriptors and hand-written migrations go
//! through the same runner path.

use crate::builder::{OperationBuilder, TableOrdering};
use crate::error::BuildResult;
use crate::manifest::MigrationDescriptor;
use crate::operation::SchemaOperation;
use serde::Serialize;
use std::fmt;

/// Which half of a migration is being run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Apply,
    Revert,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Apply => write!(f, "apply"),
            Direction::Revert => write!(f, "revert"),
        }
    }
}

/// A versioned unit of schema change with apply and revert logic
pub trait MigrationLogic: Send + Sync {
    /// Externally assigned version
    fn version(&self) -> i64;

    /// Human-readable description
    fn description(&self) -> &str;

    /// Emit the operations that apply this migration
    fn apply(&self, builder: &mut OperationBuilder) -> BuildResult<()>;

    /// Emit the operations that undo this migration
    fn revert(&self, builder: &mut OperationBuilder) -> BuildResult<()>;

    /// `"<version>: <description>"`
    fn name(&self) -> String {
        format!("{}: {}", self.version(), self.description())
    }

    /// Build the operation sequence for one direction
    fn operations(&self, direction: Direction) -> BuildResult<Vec<SchemaOperation>> {
        let mut builder = OperationBuilder::new();
        match direction {
            Direction::Apply => self.apply(&mut builder)?,
            Direction::Revert => self.revert(&mut builder)?,
        }
        Ok(builder.finish())
    }
}

impl<T: MigrationLogic + ?Sized> MigrationLogic for Box<T> {
    fn version(&self) -> i64 {
        (**self).version()
    }

    fn description(&self) -> &str {
        (**self).description()
    }

    fn apply(&self, builder: &mut OperationBuilder) -> BuildResult<()> {
        (**self).apply(builder)
    }

    fn revert(&self, builder: &mut OperationBuilder) -> BuildResult<()> {
        (**self).revert(builder)
    }
}

/// Migration logic backed by a manifest descriptor
#[derive(Debug, Clone)]
pub struct ManifestMigration {
    descriptor: MigrationDescriptor,
    ordering: TableOrdering,
}

impl ManifestMigration {
    pub fn new(descriptor: MigrationDescriptor) -> Self {
        Self::with_ordering(descriptor, TableOrdering::default())
    }

    pub fn with_ordering(descriptor: MigrationDescriptor, ordering: TableOrdering) -> Self {
        Self {
            descriptor,
            ordering,
        }
    }

    pub fn ordering(&self) -> TableOrdering {
        self.ordering
    }
}

impl From<MigrationDescriptor> for ManifestMigration {
    fn from(descriptor: MigrationDescriptor) -> Self {
        Self::new(descriptor)
    }
}

impl MigrationLogic for ManifestMigration {
    fn version(&self) -> i64 {
        self.descriptor.version
    }

    fn description(&self) -> &str {
        &self.descriptor.description
    }

    fn apply(&self, builder: &mut OperationBuilder) -> BuildResult<()> {
        builder.apply_descriptor(&self.descriptor, self.ordering)?;
        Ok(())
    }

    fn revert(&self, builder: &mut OperationBuilder) -> BuildResult<()> {
        builder.revert_descriptor(&self.descriptor, self.ordering)?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "logic_test.rs"]
mod tests;
