//! Error taxonomy for the migration layer.
//!
//! `StoreError` covers the storage crates; `MigrateError` covers the
//! offline tools and maps onto their process exit codes. Per-record
//! failures inside batch loops are caught and counted by the caller,
//! never propagated through these types.

use thiserror::Error;

/// Errors from the legacy connector and the target relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Schema migration failed at version {version}: {message}")]
    MigrationFailed { version: u32, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection lock poisoned")]
    PoolPoisoned,
}

/// Fatal errors for the offline backfill/validation tools.
#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("Legacy store unavailable: {reason}")]
    LegacyUnavailable { reason: String },

    #[error("Refusing to run in guarded environment: {environment}")]
    EnvironmentGuard { environment: String },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}

impl MigrateError {
    /// Process exit code for this failure: 2 for precondition gates,
    /// 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            MigrateError::LegacyUnavailable { .. } | MigrateError::EnvironmentGuard { .. } => 2,
            MigrateError::Store(_) => 1,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
pub type MigrateResult<T> = Result<T, MigrateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precondition_failures_exit_2() {
        let err = MigrateError::LegacyUnavailable {
            reason: "not configured".into(),
        };
        assert_eq!(err.exit_code(), 2);

        let err = MigrateError::EnvironmentGuard {
            environment: "production".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn storage_failures_exit_1() {
        let err = MigrateError::Store(StoreError::PoolPoisoned);
        assert_eq!(err.exit_code(), 1);
    }
}
