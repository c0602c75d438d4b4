//! Serde default functions shared by configuration types.

/// Serde default for boolean settings that are on unless disabled.
pub fn default_true() -> bool {
    true
}
