//! Read-only parity validation between the legacy and target stores.
//!
//! Three checks per entity type — counts, recency, sampled field
//! comparison — run to completion regardless of what the earlier
//! checks find, so one run surfaces all drift. Mismatches are data,
//! not errors; only validator-internal failures (cannot connect,
//! cannot query) propagate as errors.

use serde_json::{Map, Value};
use tracing::{info, warn};

use stride_core::entity::EntityKind;
use stride_core::errors::{MigrateResult, StoreResult};
use stride_storage::legacy::{LegacyDocument, LegacyStore, ScanFilter};
use stride_storage::target::queries::{self, RowScope};
use stride_storage::TargetStore;

use crate::translate::{self, rows, TargetKey};

/// Write-time skew absorbed by the recency check before it counts as
/// drift.
pub const RECENCY_TOLERANCE_MS: i64 = 5_000;

/// Scope for one validation pass.
#[derive(Debug, Clone)]
pub struct ParityOptions {
    /// How many of the most recent legacy documents get field-compared.
    pub sample_size: usize,
    pub user_filter: Option<String>,
    pub pillar_filter: Option<String>,
}

impl Default for ParityOptions {
    fn default() -> Self {
        Self {
            sample_size: 50,
            user_filter: None,
            pillar_filter: None,
        }
    }
}

impl ParityOptions {
    fn scan_filter(&self) -> ScanFilter {
        ScanFilter {
            user_id: self.user_filter.clone(),
            pillar_id: self.pillar_filter.clone(),
            limit: None,
        }
    }

    fn row_scope(&self) -> RowScope {
        RowScope {
            user_id: self.user_filter.clone(),
            pillar_id: self.pillar_filter.clone(),
        }
    }
}

/// One sampled record's discrepancy.
#[derive(Debug, Clone)]
pub enum MismatchKind {
    /// The legacy document has no counterpart row.
    MissingInTarget,
    /// A migrated field's values differ.
    FieldDrift {
        field: String,
        legacy_value: Value,
        target_value: Value,
    },
    /// The legacy document could not be translated for comparison.
    TranslateFailed { reason: String },
}

#[derive(Debug, Clone)]
pub struct RecordMismatch {
    pub legacy_id: String,
    pub kind: MismatchKind,
}

/// Result of one validation pass over one entity type.
#[derive(Debug, Clone)]
pub struct ParityReport {
    pub entity: EntityKind,
    pub legacy_count: i64,
    pub target_count: i64,
    pub legacy_latest: Option<i64>,
    pub target_latest: Option<i64>,
    pub sampled: usize,
    pub mismatches: Vec<RecordMismatch>,
}

impl ParityReport {
    pub fn count_delta(&self) -> i64 {
        self.legacy_count - self.target_count
    }

    /// Recency agreement within the tolerance window. Both sides empty
    /// agrees; one side empty while the other has data does not.
    pub fn recency_in_tolerance(&self) -> bool {
        match (self.legacy_latest, self.target_latest) {
            (None, None) => true,
            (Some(l), Some(t)) => (l - t).abs() <= RECENCY_TOLERANCE_MS,
            _ => false,
        }
    }

    /// Zero drift across all three checks.
    pub fn is_clean(&self) -> bool {
        self.count_delta() == 0 && self.recency_in_tolerance() && self.mismatches.is_empty()
    }
}

/// Compare one entity type across the two stores. Never writes.
pub fn run_parity(
    entity: EntityKind,
    legacy: &LegacyStore,
    target: &TargetStore,
    opts: &ParityOptions,
) -> MigrateResult<ParityReport> {
    let scan_filter = opts.scan_filter();
    let row_scope = opts.row_scope();

    // Check 1: counts.
    let legacy_count = legacy.count(entity.collection(), &scan_filter)?;
    let target_count = target.with_reader(|conn| count_rows(conn, entity, &row_scope))?;

    // Check 2: most recent timestamp on each side.
    let legacy_latest =
        legacy.most_recent_timestamp(entity.collection(), &scan_filter, entity.recency_column())?;
    let target_latest =
        target.with_reader(|conn| most_recent_row_timestamp(conn, entity, &row_scope))?;

    // Check 3: field comparison over the most recent sample.
    let sample = legacy.recent(entity.collection(), &scan_filter, opts.sample_size)?;
    let mut mismatches = Vec::new();
    for doc in &sample {
        compare_record(entity, doc, target, &mut mismatches)?;
    }

    let report = ParityReport {
        entity,
        legacy_count,
        target_count,
        legacy_latest,
        target_latest,
        sampled: sample.len(),
        mismatches,
    };

    log_report(&report);
    Ok(report)
}

/// Compare one sampled document against its target row, appending any
/// discrepancies. Returns Err only for store-level failures.
fn compare_record(
    entity: EntityKind,
    doc: &LegacyDocument,
    target: &TargetStore,
    mismatches: &mut Vec<RecordMismatch>,
) -> MigrateResult<()> {
    let expected = match translate::translate(entity, doc) {
        Ok(fields) => fields,
        Err(e) => {
            mismatches.push(RecordMismatch {
                legacy_id: doc.id.clone(),
                kind: MismatchKind::TranslateFailed {
                    reason: e.to_string(),
                },
            });
            return Ok(());
        }
    };

    let key = match rows::target_key(entity, doc, &expected) {
        Ok(key) => key,
        Err(e) => {
            mismatches.push(RecordMismatch {
                legacy_id: doc.id.clone(),
                kind: MismatchKind::TranslateFailed {
                    reason: e.to_string(),
                },
            });
            return Ok(());
        }
    };

    let actual = target.with_reader(|conn| find_row_json(conn, entity, &key))?;
    let Some(actual) = actual else {
        mismatches.push(RecordMismatch {
            legacy_id: doc.id.clone(),
            kind: MismatchKind::MissingInTarget,
        });
        return Ok(());
    };

    // Owner is compared alongside the mapped body fields.
    compare_field(
        &doc.id,
        "user_id",
        &Value::String(doc.user_id.clone()),
        actual.get("user_id"),
        mismatches,
    );
    for (column, expected_value) in &expected {
        compare_field(&doc.id, column, expected_value, actual.get(column), mismatches);
    }
    Ok(())
}

fn compare_field(
    legacy_id: &str,
    column: &str,
    expected: &Value,
    actual: Option<&Value>,
    mismatches: &mut Vec<RecordMismatch>,
) {
    let actual = actual.unwrap_or(&Value::Null);
    if !values_equal(expected, actual) {
        mismatches.push(RecordMismatch {
            legacy_id: legacy_id.to_string(),
            kind: MismatchKind::FieldDrift {
                field: column.to_string(),
                legacy_value: expected.clone(),
                target_value: actual.clone(),
            },
        });
    }
}

/// Value equality with numeric tolerance: the target column may hold a
/// REAL where the legacy body held an integer, and translation rounds
/// score-like floats to 2 decimal places.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => {
            (translate::round2(x) - translate::round2(y)).abs() < 1e-9
        }
        _ => a == b,
    }
}

fn count_rows(
    conn: &rusqlite::Connection,
    entity: EntityKind,
    scope: &RowScope,
) -> StoreResult<i64> {
    match entity {
        EntityKind::CheckIn => queries::check_ins::count(conn, scope),
        EntityKind::ActionPlan => queries::action_plans::count(conn, scope),
        EntityKind::CoachMessage => queries::coach_messages::count(conn, scope),
        EntityKind::PillarScore => queries::pillar_scores::count(conn, scope),
        EntityKind::OnboardingProfile => queries::onboarding_profiles::count(conn, scope),
        EntityKind::UserCoreState => queries::user_core_state::count(conn, scope),
    }
}

fn most_recent_row_timestamp(
    conn: &rusqlite::Connection,
    entity: EntityKind,
    scope: &RowScope,
) -> StoreResult<Option<i64>> {
    match entity {
        EntityKind::CheckIn => queries::check_ins::most_recent_timestamp(conn, scope),
        EntityKind::ActionPlan => queries::action_plans::most_recent_timestamp(conn, scope),
        EntityKind::CoachMessage => queries::coach_messages::most_recent_timestamp(conn, scope),
        EntityKind::PillarScore => queries::pillar_scores::most_recent_timestamp(conn, scope),
        EntityKind::OnboardingProfile => {
            queries::onboarding_profiles::most_recent_timestamp(conn, scope)
        }
        EntityKind::UserCoreState => queries::user_core_state::most_recent_timestamp(conn, scope),
    }
}

/// Fetch the target row for a key as a column-name → value object.
fn find_row_json(
    conn: &rusqlite::Connection,
    entity: EntityKind,
    key: &TargetKey,
) -> StoreResult<Option<Map<String, Value>>> {
    let row_value = match (entity, key) {
        (EntityKind::CheckIn, TargetKey::Derived(id)) => queries::check_ins::find_by_id(conn, id)?
            .map(|row| serde_json::to_value(row))
            .transpose()?,
        (EntityKind::ActionPlan, TargetKey::Derived(id)) => {
            queries::action_plans::find_by_id(conn, id)?
                .map(|row| serde_json::to_value(row))
                .transpose()?
        }
        (EntityKind::CoachMessage, TargetKey::Derived(id)) => {
            queries::coach_messages::find_by_id(conn, id)?
                .map(|row| serde_json::to_value(row))
                .transpose()?
        }
        (EntityKind::PillarScore, TargetKey::UserPillar { user_id, pillar_id }) => {
            queries::pillar_scores::find(conn, user_id, pillar_id)?
                .map(|row| serde_json::to_value(row))
                .transpose()?
        }
        (EntityKind::OnboardingProfile, TargetKey::User(user_id)) => {
            queries::onboarding_profiles::find(conn, user_id)?
                .map(|row| serde_json::to_value(row))
                .transpose()?
        }
        (EntityKind::UserCoreState, TargetKey::User(user_id)) => {
            queries::user_core_state::find(conn, user_id)?
                .map(|row| serde_json::to_value(row))
                .transpose()?
        }
        _ => None,
    };

    Ok(row_value.and_then(|v| match v {
        Value::Object(map) => Some(map),
        _ => None,
    }))
}

fn log_report(report: &ParityReport) {
    let legacy_latest = format_ts(report.legacy_latest);
    let target_latest = format_ts(report.target_latest);
    if report.is_clean() {
        info!(
            target: "parity",
            entity = %report.entity,
            legacy_count = report.legacy_count,
            target_count = report.target_count,
            legacy_latest = %legacy_latest,
            target_latest = %target_latest,
            sampled = report.sampled,
            "stores agree"
        );
    } else {
        warn!(
            target: "parity",
            entity = %report.entity,
            legacy_count = report.legacy_count,
            target_count = report.target_count,
            count_delta = report.count_delta(),
            legacy_latest = %legacy_latest,
            target_latest = %target_latest,
            recency_in_tolerance = report.recency_in_tolerance(),
            sampled = report.sampled,
            mismatches = report.mismatches.len(),
            "drift detected"
        );
        for m in &report.mismatches {
            match &m.kind {
                MismatchKind::MissingInTarget => warn!(
                    target: "parity",
                    entity = %report.entity,
                    legacy_id = %m.legacy_id,
                    "missing in target store"
                ),
                MismatchKind::FieldDrift {
                    field,
                    legacy_value,
                    target_value,
                } => warn!(
                    target: "parity",
                    entity = %report.entity,
                    legacy_id = %m.legacy_id,
                    field = %field,
                    legacy_value = %legacy_value,
                    target_value = %target_value,
                    "field drift"
                ),
                MismatchKind::TranslateFailed { reason } => warn!(
                    target: "parity",
                    entity = %report.entity,
                    legacy_id = %m.legacy_id,
                    reason = %reason,
                    "sample record could not be translated"
                ),
            }
        }
    }
}

/// Render an epoch-millisecond timestamp for operator logs.
fn format_ts(ts: Option<i64>) -> String {
    match ts {
        Some(ms) => chrono::DateTime::from_timestamp_millis(ms)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_else(|| ms.to_string()),
        None => "-".to_string(),
    }
}
