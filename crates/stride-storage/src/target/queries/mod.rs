//! Per-entity query modules for the target store.

pub mod action_plans;
pub mod check_ins;
pub mod coach_messages;
pub mod onboarding_profiles;
pub mod pillar_scores;
pub mod user_core_state;

use rusqlite::types::ToSql;

/// Scope filters for target-side counts and recency probes.
#[derive(Debug, Clone, Default)]
pub struct RowScope {
    pub user_id: Option<String>,
    pub pillar_id: Option<String>,
}

impl RowScope {
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn pillar(mut self, pillar_id: impl Into<String>) -> Self {
        self.pillar_id = Some(pillar_id.into());
        self
    }
}

/// Build a WHERE clause over `user_id` (and `pillar_id` when the table
/// has one) plus the owned parameter list. Returns `1=1` for an
/// unscoped query so callers can always append `WHERE {clause}`.
pub(crate) fn build_scope(scope: &RowScope, has_pillar: bool) -> (String, Vec<String>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(user_id) = &scope.user_id {
        params.push(user_id.clone());
        clauses.push(format!("user_id = ?{}", params.len()));
    }
    if has_pillar {
        if let Some(pillar_id) = &scope.pillar_id {
            params.push(pillar_id.clone());
            clauses.push(format!("pillar_id = ?{}", params.len()));
        }
    }

    if clauses.is_empty() {
        ("1=1".to_string(), params)
    } else {
        (clauses.join(" AND "), params)
    }
}

pub(crate) fn params_slice(params: &[String]) -> Vec<&dyn ToSql> {
    params.iter().map(|p| p as &dyn ToSql).collect()
}
