//! Preflight gates for the offline tools, evaluated once before any
//! read or write.

use tracing::info;

use stride_core::config::MigrateConfig;
use stride_core::errors::{MigrateError, MigrateResult};
use stride_storage::LegacyStore;

/// Environments the offline tools refuse to run in. The backfill and
/// validator are operator-driven batch processes; the serving
/// environment runs neither.
pub const GUARDED_ENVIRONMENTS: [&str; 2] = ["production", "live"];

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct PreflightCheck {
    pub name: &'static str,
    pub ok: bool,
    pub detail: String,
}

impl PreflightCheck {
    pub fn ok(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            ok: true,
            detail: detail.into(),
        }
    }

    pub fn failed(name: &'static str, detail: impl Into<String>) -> Self {
        Self {
            name,
            ok: false,
            detail: detail.into(),
        }
    }
}

/// Check the deployment environment against the guard list.
pub fn check_environment(environment: &str) -> PreflightCheck {
    if GUARDED_ENVIRONMENTS
        .iter()
        .any(|guarded| environment.eq_ignore_ascii_case(guarded))
    {
        PreflightCheck::failed("environment", format!("guarded environment: {environment}"))
    } else {
        PreflightCheck::ok("environment", environment)
    }
}

/// Enforce the environment guard. Fatal before anything else runs.
pub fn ensure_environment(config: &MigrateConfig) -> MigrateResult<()> {
    let check = check_environment(&config.environment);
    if !check.ok {
        return Err(MigrateError::EnvironmentGuard {
            environment: config.environment.clone(),
        });
    }
    info!(target: "preflight", environment = %config.environment, "environment check passed");
    Ok(())
}

/// Connect to the legacy store, treating "unconfigured" as a fatal
/// precondition for the tools (the application tolerates it; a scan
/// over nothing must not report success).
pub fn ensure_legacy(config: &MigrateConfig) -> MigrateResult<LegacyStore> {
    match LegacyStore::connect(config) {
        Ok(Some(store)) => {
            info!(target: "preflight", "legacy store connected (read-only)");
            Ok(store)
        }
        Ok(None) => Err(MigrateError::LegacyUnavailable {
            reason: "legacy store not configured".to_string(),
        }),
        Err(e) => Err(MigrateError::LegacyUnavailable {
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guarded_environments_fail_the_check() {
        assert!(!check_environment("production").ok);
        assert!(!check_environment("PRODUCTION").ok);
        assert!(!check_environment("live").ok);
        assert!(check_environment("development").ok);
        assert!(check_environment("staging").ok);
    }

    #[test]
    fn unconfigured_legacy_is_a_precondition_failure() {
        let config = MigrateConfig::default();
        let err = ensure_legacy(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn guarded_environment_is_a_precondition_failure() {
        let config = MigrateConfig {
            environment: "production".to_string(),
            ..MigrateConfig::default()
        };
        let err = ensure_environment(&config).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
