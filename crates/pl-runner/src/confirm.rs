//! Confirmation before a migration runs.

/// Asked once per migration, after its operations are built and before the
/// execution context is acquired. Returning `false` skips the migration.
pub trait Confirmation: Send + Sync {
    fn confirm(&self, version: i64, description: &str) -> bool;
}

/// Non-interactive confirmation that accepts every migration
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl Confirmation for AutoConfirm {
    fn confirm(&self, _version: i64, _description: &str) -> bool {
        true
    }
}

impl<F> Confirmation for F
where
    F: Fn(i64, &str) -> bool + Send + Sync,
{
    fn confirm(&self, version: i64, description: &str) -> bool {
        self(version, description)
    }
}
