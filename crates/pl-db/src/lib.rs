//! pl-db - Schema execution for Plover
//!
//! This crate provides the `SchemaExecutor` trait that receives schema
//! operations one at a time, a DuckDB implementation that renders and runs
//! them, and a recording implementation for dry runs and tests.

pub(crate) mod ddl;
pub mod duckdb;
pub mod error;
pub mod recording;
pub mod traits;

pub use duckdb::DuckDbExecutor;
pub use error::{DbError, DbResult};
pub use recording::RecordingExecutor;
pub use traits::SchemaExecutor;
