//! pl-core - Core library for Plover
//!
//! This crate provides the manifest model, column type resolution, the
//! operation builder, up/down migration logic, and project configuration
//! shared by the executor, ledger, runner and CLI crates.

pub mod builder;
pub mod column_type;
pub mod config;
pub mod error;
pub mod logic;
pub mod manifest;
pub mod names;
mod newtype_string;
pub mod operation;
mod ordering;
pub(crate) mod serde_helpers;

pub use builder::{
    build_apply_operations, build_apply_operations_with, build_revert_operations,
    build_revert_operations_with, validate_descriptor, OperationBuilder, TableOrdering,
};
pub use column_type::{
    resolve_first_column, resolve_subsequent_column, ColumnDefinition, ColumnKey, LogicalType,
};
pub use config::{Config, DatabaseConfig, DbType, LedgerConfig, RevertPolicy};
pub use error::{BuildError, CoreError, ResolveError};
pub use logic::{Direction, ManifestMigration, MigrationLogic};
pub use manifest::{ColumnReference, ColumnSpec, Manifest, MigrationDescriptor, TableSpec};
pub use names::{ColumnName, TableName};
pub use operation::SchemaOperation;
