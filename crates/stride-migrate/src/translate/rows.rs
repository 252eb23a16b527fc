//! Typed target-row construction from translated field values.
//!
//! The field map owns extraction and coercion; these builders only
//! assemble typed rows, pulling identity and timestamps from the
//! document envelope.

use serde_json::{Map, Value};

use stride_core::entity::{EntityKind, KeyStrategy};
use stride_core::identity::derive_target_id;
use stride_storage::legacy::LegacyDocument;
use stride_storage::target::queries::action_plans::ActionPlanRow;
use stride_storage::target::queries::check_ins::CheckInRow;
use stride_storage::target::queries::coach_messages::CoachMessageRow;
use stride_storage::target::queries::onboarding_profiles::OnboardingProfileRow;
use stride_storage::target::queries::pillar_scores::PillarScoreRow;
use stride_storage::target::queries::user_core_state::UserCoreStateRow;

use super::TranslateError;

/// The target-store primary key for one legacy document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetKey {
    Derived(String),
    UserPillar { user_id: String, pillar_id: String },
    User(String),
}

/// Compute the target key for a document from its translated fields.
pub fn target_key(
    entity: EntityKind,
    doc: &LegacyDocument,
    fields: &Map<String, Value>,
) -> Result<TargetKey, TranslateError> {
    match entity.key_strategy() {
        KeyStrategy::Derived => Ok(TargetKey::Derived(derive_target_id(
            entity.namespace(),
            &doc.id,
        ))),
        KeyStrategy::UserPillar => Ok(TargetKey::UserPillar {
            user_id: doc.user_id.clone(),
            pillar_id: str_field(fields, "pillar_id")?,
        }),
        KeyStrategy::User => Ok(TargetKey::User(doc.user_id.clone())),
    }
}

pub fn check_in_row(
    doc: &LegacyDocument,
    fields: &Map<String, Value>,
) -> Result<CheckInRow, TranslateError> {
    Ok(CheckInRow {
        id: derive_target_id(EntityKind::CheckIn.namespace(), &doc.id),
        user_id: doc.user_id.clone(),
        pillar_id: str_field(fields, "pillar_id")?,
        value: f64_field(fields, "value")?,
        note: opt_str_field(fields, "note")?,
        logged_at: i64_field(fields, "logged_at")?,
        created_at: doc.created_at,
    })
}

pub fn action_plan_row(
    doc: &LegacyDocument,
    fields: &Map<String, Value>,
) -> Result<ActionPlanRow, TranslateError> {
    Ok(ActionPlanRow {
        id: derive_target_id(EntityKind::ActionPlan.namespace(), &doc.id),
        user_id: doc.user_id.clone(),
        pillar_id: str_field(fields, "pillar_id")?,
        title: str_field(fields, "title")?,
        steps: str_field(fields, "steps")?,
        status: str_field(fields, "status")?,
        created_at: doc.created_at,
    })
}

pub fn coach_message_row(
    doc: &LegacyDocument,
    fields: &Map<String, Value>,
) -> Result<CoachMessageRow, TranslateError> {
    Ok(CoachMessageRow {
        id: derive_target_id(EntityKind::CoachMessage.namespace(), &doc.id),
        user_id: doc.user_id.clone(),
        role: str_field(fields, "role")?,
        content: str_field(fields, "content")?,
        created_at: doc.created_at,
    })
}

pub fn pillar_score_row(
    doc: &LegacyDocument,
    fields: &Map<String, Value>,
) -> Result<PillarScoreRow, TranslateError> {
    Ok(PillarScoreRow {
        user_id: doc.user_id.clone(),
        pillar_id: str_field(fields, "pillar_id")?,
        score: f64_field(fields, "score")?,
        streak: i64_field(fields, "streak")?,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    })
}

pub fn onboarding_profile_row(
    doc: &LegacyDocument,
    fields: &Map<String, Value>,
) -> Result<OnboardingProfileRow, TranslateError> {
    Ok(OnboardingProfileRow {
        user_id: doc.user_id.clone(),
        goals: str_field(fields, "goals")?,
        timezone: str_field(fields, "timezone")?,
        completed_at: opt_i64_field(fields, "completed_at")?,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    })
}

pub fn user_core_state_row(
    doc: &LegacyDocument,
    fields: &Map<String, Value>,
) -> Result<UserCoreStateRow, TranslateError> {
    Ok(UserCoreStateRow {
        user_id: doc.user_id.clone(),
        momentum: f64_field(fields, "momentum")?,
        level: i64_field(fields, "level")?,
        last_check_in_at: opt_i64_field(fields, "last_check_in_at")?,
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    })
}

// Coercion guarantees these types; the helpers exist so a field-map
// edit that breaks the guarantee fails loudly instead of panicking.

fn str_field(fields: &Map<String, Value>, column: &'static str) -> Result<String, TranslateError> {
    match fields.get(column) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(TranslateError::WrongType {
            field: column.to_string(),
            expected: "string",
        }),
        None => Err(TranslateError::MissingField {
            field: column.to_string(),
        }),
    }
}

fn opt_str_field(
    fields: &Map<String, Value>,
    column: &'static str,
) -> Result<Option<String>, TranslateError> {
    match fields.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(TranslateError::WrongType {
            field: column.to_string(),
            expected: "string or null",
        }),
    }
}

fn f64_field(fields: &Map<String, Value>, column: &'static str) -> Result<f64, TranslateError> {
    fields
        .get(column)
        .and_then(Value::as_f64)
        .ok_or(TranslateError::WrongType {
            field: column.to_string(),
            expected: "number",
        })
}

fn i64_field(fields: &Map<String, Value>, column: &'static str) -> Result<i64, TranslateError> {
    fields
        .get(column)
        .and_then(Value::as_i64)
        .ok_or(TranslateError::WrongType {
            field: column.to_string(),
            expected: "integer",
        })
}

fn opt_i64_field(
    fields: &Map<String, Value>,
    column: &'static str,
) -> Result<Option<i64>, TranslateError> {
    match fields.get(column) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v.as_i64().map(Some).ok_or(TranslateError::WrongType {
            field: column.to_string(),
            expected: "integer or null",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::translate;

    fn doc(id: &str, user: &str, body: Value) -> LegacyDocument {
        LegacyDocument {
            id: id.to_string(),
            user_id: user.to_string(),
            body: body.to_string(),
            created_at: 1000,
            updated_at: 2000,
        }
    }

    #[test]
    fn derived_key_matches_identity_derivation() {
        let d = doc(
            "abc",
            "u1",
            serde_json::json!({"pillarId": "sleep", "value": 7, "loggedAt": 0}),
        );
        let fields = translate(EntityKind::CheckIn, &d).unwrap();
        let key = target_key(EntityKind::CheckIn, &d, &fields).unwrap();
        assert_eq!(
            key,
            TargetKey::Derived(derive_target_id("pillar_check_in", "abc"))
        );
    }

    #[test]
    fn natural_keys_come_from_owner_and_pillar() {
        let d = doc(
            "s1",
            "u9",
            serde_json::json!({"pillarId": "sleep", "score": 88.5, "streak": 4}),
        );
        let fields = translate(EntityKind::PillarScore, &d).unwrap();
        let key = target_key(EntityKind::PillarScore, &d, &fields).unwrap();
        assert_eq!(
            key,
            TargetKey::UserPillar {
                user_id: "u9".to_string(),
                pillar_id: "sleep".to_string()
            }
        );

        let d = doc("p1", "u9", serde_json::json!({"goals": [], "timezone": "UTC"}));
        let fields = translate(EntityKind::OnboardingProfile, &d).unwrap();
        let key = target_key(EntityKind::OnboardingProfile, &d, &fields).unwrap();
        assert_eq!(key, TargetKey::User("u9".to_string()));
    }

    #[test]
    fn score_row_carries_both_timestamps() {
        let d = doc(
            "s1",
            "u1",
            serde_json::json!({"pillarId": "sleep", "score": 72.349, "streak": 2}),
        );
        let fields = translate(EntityKind::PillarScore, &d).unwrap();
        let row = pillar_score_row(&d, &fields).unwrap();
        assert_eq!(row.score, 72.35);
        assert_eq!(row.created_at, 1000);
        assert_eq!(row.updated_at, 2000);
    }
}
