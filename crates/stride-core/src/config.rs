//! Migration-layer configuration.
//!
//! Store handles are constructed from this config and injected into
//! each component — there is no process-global connection state.

use serde::{Deserialize, Serialize};

/// Environment variable naming the legacy document-store database.
pub const LEGACY_DB_ENV: &str = "STRIDE_LEGACY_DB";
/// Environment variable naming the target relational database.
pub const TARGET_DB_ENV: &str = "STRIDE_TARGET_DB";
/// Environment variable naming the deployment environment.
pub const ENVIRONMENT_ENV: &str = "STRIDE_ENV";

/// Configuration for the migration layer and its offline tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrateConfig {
    /// Path to the legacy document-store database.
    /// `None` means the legacy store is not configured — a normal state
    /// for the application, a fatal precondition for the offline tools.
    pub legacy_db_path: Option<String>,
    /// Path to the target relational database.
    pub target_db_path: Option<String>,
    /// Deployment environment ("development", "staging", "production", ...).
    pub environment: String,
    /// Number of reader connections in the target-store pool.
    pub read_pool_size: usize,
}

impl Default for MigrateConfig {
    fn default() -> Self {
        Self {
            legacy_db_path: None,
            target_db_path: None,
            environment: "development".to_string(),
            read_pool_size: 2,
        }
    }
}

impl MigrateConfig {
    /// Build a config from the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(path) = std::env::var(LEGACY_DB_ENV) {
            if !path.is_empty() {
                config.legacy_db_path = Some(path);
            }
        }
        if let Ok(path) = std::env::var(TARGET_DB_ENV) {
            if !path.is_empty() {
                config.target_db_path = Some(path);
            }
        }
        if let Ok(env) = std::env::var(ENVIRONMENT_ENV) {
            if !env.is_empty() {
                config.environment = env;
            }
        }
        config
    }

    /// Effective target database path, defaulting to `stride.db`.
    pub fn effective_target_db_path(&self) -> &str {
        self.target_db_path.as_deref().unwrap_or("stride.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unconfigured_development() {
        let config = MigrateConfig::default();
        assert!(config.legacy_db_path.is_none());
        assert_eq!(config.environment, "development");
        assert_eq!(config.effective_target_db_path(), "stride.db");
    }
}
