//! Per-entity schema translation: legacy JSON fields → target columns.
//!
//! Each entity's translation is a named field map (legacy field, target
//! column, coercion rule), validated once at tool startup. Record
//! translation then applies the map mechanically; the validator reuses
//! the same maps so backfill and validation agree on what "migrated
//! fields" means.

pub mod rows;

use std::sync::LazyLock;

use serde_json::{Map, Value};
use thiserror::Error;

use stride_core::entity::EntityKind;
use stride_storage::legacy::LegacyDocument;

pub use rows::{target_key, TargetKey};

/// Per-record translation failures. Caught and counted inside batch
/// loops, never fatal to a pass.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("Invalid document body: {message}")]
    InvalidBody { message: String },

    #[error("Missing field `{field}`")]
    MissingField { field: String },

    #[error("Field `{field}` has wrong type (expected {expected})")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    #[error("Field map `{name}` invalid: {message}")]
    InvalidFieldMap {
        name: &'static str,
        message: String,
    },
}

/// How one legacy JSON value becomes a target column value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Required JSON string.
    Text,
    /// Optional JSON string; absent/null stays null.
    OptionalText,
    /// Required integer (whole-valued JSON numbers accepted).
    Integer,
    /// Required number, rounded to 2 decimal places.
    Float2dp,
    /// Any JSON value, serialized to compact text.
    JsonText,
    /// Required epoch-millisecond timestamp.
    EpochMillis,
    /// Optional epoch-millisecond timestamp; absent/null stays null.
    OptionalEpochMillis,
}

/// One legacy-field → target-column mapping.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub legacy: &'static str,
    pub target: &'static str,
    pub coercion: Coercion,
}

/// The named translation table for one entity type.
#[derive(Debug)]
pub struct FieldMap {
    pub name: &'static str,
    pub entries: Vec<FieldMapping>,
}

impl FieldMap {
    /// Structural validation, run once at startup: at least one entry,
    /// no duplicate targets, no duplicate legacy fields.
    pub fn validate(&self) -> Result<(), TranslateError> {
        if self.entries.is_empty() {
            return Err(TranslateError::InvalidFieldMap {
                name: self.name,
                message: "no field mappings".to_string(),
            });
        }
        let mut targets = std::collections::HashSet::new();
        let mut legacies = std::collections::HashSet::new();
        for entry in &self.entries {
            if !targets.insert(entry.target) {
                return Err(TranslateError::InvalidFieldMap {
                    name: self.name,
                    message: format!("duplicate target column `{}`", entry.target),
                });
            }
            if !legacies.insert(entry.legacy) {
                return Err(TranslateError::InvalidFieldMap {
                    name: self.name,
                    message: format!("duplicate legacy field `{}`", entry.legacy),
                });
            }
        }
        Ok(())
    }
}

const fn mapping(legacy: &'static str, target: &'static str, coercion: Coercion) -> FieldMapping {
    FieldMapping {
        legacy,
        target,
        coercion,
    }
}

static CHECK_IN_MAP: LazyLock<FieldMap> = LazyLock::new(|| FieldMap {
    name: "pillar_check_in",
    entries: vec![
        mapping("pillarId", "pillar_id", Coercion::Text),
        mapping("value", "value", Coercion::Float2dp),
        mapping("note", "note", Coercion::OptionalText),
        mapping("loggedAt", "logged_at", Coercion::EpochMillis),
    ],
});

static ACTION_PLAN_MAP: LazyLock<FieldMap> = LazyLock::new(|| FieldMap {
    name: "action_plan",
    entries: vec![
        mapping("pillarId", "pillar_id", Coercion::Text),
        mapping("title", "title", Coercion::Text),
        mapping("steps", "steps", Coercion::JsonText),
        mapping("status", "status", Coercion::Text),
    ],
});

static COACH_MESSAGE_MAP: LazyLock<FieldMap> = LazyLock::new(|| FieldMap {
    name: "coach_message",
    entries: vec![
        mapping("role", "role", Coercion::Text),
        mapping("content", "content", Coercion::Text),
    ],
});

static PILLAR_SCORE_MAP: LazyLock<FieldMap> = LazyLock::new(|| FieldMap {
    name: "pillar_score",
    entries: vec![
        mapping("pillarId", "pillar_id", Coercion::Text),
        mapping("score", "score", Coercion::Float2dp),
        mapping("streak", "streak", Coercion::Integer),
    ],
});

static ONBOARDING_PROFILE_MAP: LazyLock<FieldMap> = LazyLock::new(|| FieldMap {
    name: "onboarding_profile",
    entries: vec![
        mapping("goals", "goals", Coercion::JsonText),
        mapping("timezone", "timezone", Coercion::Text),
        mapping("completedAt", "completed_at", Coercion::OptionalEpochMillis),
    ],
});

static USER_CORE_STATE_MAP: LazyLock<FieldMap> = LazyLock::new(|| FieldMap {
    name: "user_core_state",
    entries: vec![
        mapping("momentum", "momentum", Coercion::Float2dp),
        mapping("level", "level", Coercion::Integer),
        mapping("lastCheckInAt", "last_check_in_at", Coercion::OptionalEpochMillis),
    ],
});

/// The translation table for one entity type.
pub fn field_map(entity: EntityKind) -> &'static FieldMap {
    match entity {
        EntityKind::CheckIn => &CHECK_IN_MAP,
        EntityKind::ActionPlan => &ACTION_PLAN_MAP,
        EntityKind::CoachMessage => &COACH_MESSAGE_MAP,
        EntityKind::PillarScore => &PILLAR_SCORE_MAP,
        EntityKind::OnboardingProfile => &ONBOARDING_PROFILE_MAP,
        EntityKind::UserCoreState => &USER_CORE_STATE_MAP,
    }
}

/// Validate every entity's field map. Called once at tool startup.
pub fn validate_catalog() -> Result<(), TranslateError> {
    for entity in EntityKind::ALL {
        field_map(entity).validate()?;
    }
    Ok(())
}

/// Translate one legacy document's body into target column values.
///
/// The returned map is keyed by target column name and holds
/// normalized values — the same normalization the validator compares
/// against.
pub fn translate(
    entity: EntityKind,
    doc: &LegacyDocument,
) -> Result<Map<String, Value>, TranslateError> {
    let body = doc.body_json().map_err(|e| TranslateError::InvalidBody {
        message: e.to_string(),
    })?;
    let Some(object) = body.as_object() else {
        return Err(TranslateError::InvalidBody {
            message: "body is not a JSON object".to_string(),
        });
    };

    let mut out = Map::new();
    for entry in &field_map(entity).entries {
        let value = coerce(entry, object.get(entry.legacy))?;
        out.insert(entry.target.to_string(), value);
    }
    Ok(out)
}

fn coerce(entry: &FieldMapping, value: Option<&Value>) -> Result<Value, TranslateError> {
    let missing = || TranslateError::MissingField {
        field: entry.legacy.to_string(),
    };
    let wrong = |expected: &'static str| TranslateError::WrongType {
        field: entry.legacy.to_string(),
        expected,
    };

    match entry.coercion {
        Coercion::Text => match value {
            Some(Value::String(s)) => Ok(Value::String(s.clone())),
            Some(_) => Err(wrong("string")),
            None => Err(missing()),
        },
        Coercion::OptionalText => match value {
            None | Some(Value::Null) => Ok(Value::Null),
            Some(Value::String(s)) => Ok(Value::String(s.clone())),
            Some(_) => Err(wrong("string or null")),
        },
        Coercion::Integer => match value {
            Some(v) if v.is_number() => to_i64(v).map(Value::from).ok_or_else(|| wrong("integer")),
            Some(_) => Err(wrong("integer")),
            None => Err(missing()),
        },
        Coercion::Float2dp => match value {
            Some(v) if v.is_number() => {
                let n = v.as_f64().ok_or_else(|| wrong("number"))?;
                Ok(Value::from(round2(n)))
            }
            Some(_) => Err(wrong("number")),
            None => Err(missing()),
        },
        Coercion::JsonText => match value {
            Some(v) => Ok(Value::String(v.to_string())),
            None => Err(missing()),
        },
        Coercion::EpochMillis => match value {
            Some(v) if v.is_number() => {
                to_i64(v).map(Value::from).ok_or_else(|| wrong("epoch milliseconds"))
            }
            Some(_) => Err(wrong("epoch milliseconds")),
            None => Err(missing()),
        },
        Coercion::OptionalEpochMillis => match value {
            None | Some(Value::Null) => Ok(Value::Null),
            Some(v) if v.is_number() => {
                to_i64(v).map(Value::from).ok_or_else(|| wrong("epoch milliseconds or null"))
            }
            Some(_) => Err(wrong("epoch milliseconds or null")),
        },
    }
}

/// Round to 2 decimal places — the normalization applied to score-like
/// floats at translation time and re-applied by the validator.
pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

fn to_i64(v: &Value) -> Option<i64> {
    v.as_i64()
        .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: Value) -> LegacyDocument {
        LegacyDocument {
            id: "abc123".to_string(),
            user_id: "u1".to_string(),
            body: body.to_string(),
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn catalog_validates() {
        validate_catalog().unwrap();
    }

    #[test]
    fn duplicate_target_is_rejected() {
        let map = FieldMap {
            name: "broken",
            entries: vec![
                mapping("a", "x", Coercion::Text),
                mapping("b", "x", Coercion::Text),
            ],
        };
        assert!(matches!(
            map.validate(),
            Err(TranslateError::InvalidFieldMap { .. })
        ));
    }

    #[test]
    fn check_in_translation_rounds_value() {
        let fields = translate(
            EntityKind::CheckIn,
            &doc(serde_json::json!({
                "pillarId": "sleep",
                "value": 7.125,
                "note": "slept well",
                "loggedAt": 1_700_000_000_000i64,
            })),
        )
        .unwrap();

        assert_eq!(fields["pillar_id"], "sleep");
        assert_eq!(fields["value"], 7.13);
        assert_eq!(fields["note"], "slept well");
        assert_eq!(fields["logged_at"], 1_700_000_000_000i64);
    }

    #[test]
    fn optional_fields_accept_absence() {
        let fields = translate(
            EntityKind::CheckIn,
            &doc(serde_json::json!({
                "pillarId": "sleep",
                "value": 7,
                "loggedAt": 1_700_000_000_000i64,
            })),
        )
        .unwrap();
        assert_eq!(fields["note"], Value::Null);
    }

    #[test]
    fn missing_required_field_is_an_error() {
        let err = translate(
            EntityKind::CheckIn,
            &doc(serde_json::json!({ "value": 7, "loggedAt": 0 })),
        )
        .unwrap_err();
        assert!(matches!(err, TranslateError::MissingField { .. }));
    }

    #[test]
    fn wrong_type_is_an_error() {
        let err = translate(
            EntityKind::CheckIn,
            &doc(serde_json::json!({
                "pillarId": 42,
                "value": 7,
                "loggedAt": 0,
            })),
        )
        .unwrap_err();
        assert!(matches!(err, TranslateError::WrongType { .. }));
    }

    #[test]
    fn malformed_body_is_an_error() {
        let mut bad = doc(serde_json::json!({}));
        bad.body = "{not json".to_string();
        let err = translate(EntityKind::CheckIn, &bad).unwrap_err();
        assert!(matches!(err, TranslateError::InvalidBody { .. }));
    }

    #[test]
    fn json_text_serializes_arrays() {
        let fields = translate(
            EntityKind::ActionPlan,
            &doc(serde_json::json!({
                "pillarId": "movement",
                "title": "Walk more",
                "steps": ["10 min walk", "stretch"],
                "status": "active",
            })),
        )
        .unwrap();
        assert_eq!(fields["steps"], r#"["10 min walk","stretch"]"#);
    }
}
