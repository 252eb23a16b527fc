//! Per-request read dispatch: prefer the target store, silently fall
//! back to the legacy store.
//!
//! The two thunks must return the same logical shape — normalizing
//! store-specific field names is the caller's job, not the router's.
//! Fallback triggers on error only; an `Ok` carrying an empty result is
//! returned as-is. The fallback hop is strictly sequential so a read
//! never doubles load on the store being retired.

use tracing::{info, warn};

/// Observability tags for one routed read: the entity being served and
/// the scoping keys operators use to measure per-entity readiness.
#[derive(Debug, Clone)]
pub struct RouteTags<'a> {
    /// Entity namespace (e.g. `pillar_check_in`).
    pub entity: &'a str,
    /// Short label for the call site (e.g. `get_today_check_ins`).
    pub label: &'a str,
    pub user_id: Option<&'a str>,
    pub pillar_id: Option<&'a str>,
}

impl<'a> RouteTags<'a> {
    pub fn new(entity: &'a str, label: &'a str) -> Self {
        Self {
            entity,
            label,
            user_id: None,
            pillar_id: None,
        }
    }

    pub fn user(mut self, user_id: &'a str) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn pillar(mut self, pillar_id: &'a str) -> Self {
        self.pillar_id = Some(pillar_id);
        self
    }
}

/// Invoke `primary`; on error, invoke `secondary` and return its result.
///
/// Emits one structured event per call: `primary-hit` when the target
/// store served the read, `fallback` (with the failure reason) when the
/// legacy store did. A `secondary` failure propagates to the caller.
pub fn route_read<T, E, P, S>(tags: &RouteTags<'_>, primary: P, secondary: S) -> Result<T, E>
where
    E: std::fmt::Display,
    P: FnOnce() -> Result<T, E>,
    S: FnOnce() -> Result<T, E>,
{
    match primary() {
        Ok(value) => {
            info!(
                target: "read_router",
                entity = tags.entity,
                label = tags.label,
                user_id = tags.user_id.unwrap_or("-"),
                pillar_id = tags.pillar_id.unwrap_or("-"),
                outcome = "primary-hit",
                "read served from target store"
            );
            Ok(value)
        }
        Err(primary_err) => {
            warn!(
                target: "read_router",
                entity = tags.entity,
                label = tags.label,
                user_id = tags.user_id.unwrap_or("-"),
                pillar_id = tags.pillar_id.unwrap_or("-"),
                outcome = "fallback",
                reason = %primary_err,
                "target read failed — falling back to legacy store"
            );
            secondary()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn primary_success_skips_secondary() {
        let secondary_called = Cell::new(false);
        let tags = RouteTags::new("pillar_check_in", "test_read").user("u1");

        let result: Result<&str, String> = route_read(
            &tags,
            || Ok("primary-value"),
            || {
                secondary_called.set(true);
                Ok("fallback-value")
            },
        );

        assert_eq!(result.unwrap(), "primary-value");
        assert!(!secondary_called.get(), "secondary must not run on primary hit");
    }

    #[test]
    fn primary_error_falls_back() {
        let tags = RouteTags::new("pillar_check_in", "test_read");

        let result: Result<&str, String> = route_read(
            &tags,
            || Err("target table missing".to_string()),
            || Ok("fallback-value"),
        );

        assert_eq!(result.unwrap(), "fallback-value");
    }

    #[test]
    fn secondary_error_propagates() {
        let tags = RouteTags::new("coach_message", "test_read");

        let result: Result<&str, String> = route_read(
            &tags,
            || Err("primary down".to_string()),
            || Err("legacy down".to_string()),
        );

        assert_eq!(result.unwrap_err(), "legacy down");
    }

    #[test]
    fn empty_ok_result_does_not_fall_back() {
        let secondary_called = Cell::new(false);
        let tags = RouteTags::new("action_plan", "test_read");

        let result: Result<Vec<i64>, String> = route_read(
            &tags,
            || Ok(Vec::new()),
            || {
                secondary_called.set(true);
                Ok(vec![1])
            },
        );

        assert!(result.unwrap().is_empty());
        assert!(!secondary_called.get(), "empty Ok must be returned as-is");
    }
}
