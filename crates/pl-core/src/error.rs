//! Error types for pl-core

use thiserror::Error;

/// Configuration and manifest loading errors
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Manifest file not found
    #[error("[C003] Manifest not found: {path}")]
    ManifestNotFound { path: String },

    /// C004: Manifest file extension is not a known format
    #[error("[C004] Unsupported manifest format for '{path}': expected .json, .yml or .yaml")]
    UnsupportedManifestFormat { path: String },

    /// C005: Two descriptors in one manifest share a version
    #[error("[C005] Duplicate migration version {version} in manifest")]
    DuplicateVersion { version: i64 },

    /// C006: IO error with file path context
    #[error("[C006] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C007: YAML parse error
    #[error("[C007] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// C008: JSON parse error
    #[error("[C008] JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Column resolution errors.
///
/// Raised while mapping a column spec to a column definition, always before
/// any database interaction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// R001: Logical type name not recognized
    #[error("[R001] Unsupported type '{type_name}' for column '{column}'")]
    UnsupportedType { column: String, type_name: String },

    /// R002: Flags cannot be combined on this column
    #[error("[R002] Invalid flag combination on column '{column}': {reason}")]
    InvalidFlagCombination { column: String, reason: String },

    /// R003: Column has no name
    #[error("[R003] Column name must not be empty")]
    EmptyColumnName,
}

/// Result type alias for ResolveError
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Structural manifest errors raised while building an operation sequence
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// B001: Table declares no columns
    #[error("[B001] Table '{table}' declares no columns")]
    EmptyTable { table: String },

    /// B002: Table has no name
    #[error("[B002] Table name must not be empty")]
    EmptyTableName,

    /// B003: Table declared twice in one descriptor
    #[error("[B003] Duplicate table '{table}'")]
    DuplicateTable { table: String },

    /// B004: Column declared twice in one table
    #[error("[B004] Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// B005: Tables reference each other in a cycle
    #[error("[B005] Circular table reference: {cycle}")]
    CircularReference { cycle: String },

    /// B006: A column of the table failed to resolve
    #[error("[B006] Table '{table}': {source}")]
    Resolution {
        table: String,
        #[source]
        source: ResolveError,
    },
}

/// Result type alias for BuildError
pub type BuildResult<T> = Result<T, BuildError>;

impl BuildError {
    /// The underlying resolution error, if this build failed while resolving a column.
    pub fn resolution(&self) -> Option<&ResolveError> {
        match self {
            BuildError::Resolution { source, .. } => Some(source),
            _ => None,
        }
    }
}
