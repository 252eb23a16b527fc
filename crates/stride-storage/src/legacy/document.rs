//! Legacy document shape and scan filters.

use serde::{Deserialize, Serialize};

/// One entity as it exists in the legacy document store.
///
/// The body is kept as raw JSON text — parsing is deferred to the
/// per-record translation step so one malformed document surfaces as a
/// per-record failure instead of aborting a whole scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegacyDocument {
    /// Legacy identifier (document-store object id).
    pub id: String,
    /// Owner.
    pub user_id: String,
    /// Type-specific fields, raw JSON text.
    pub body: String,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    /// Last mutation time, epoch milliseconds.
    pub updated_at: i64,
}

impl LegacyDocument {
    /// Parse the body into a JSON value.
    pub fn body_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Scope filters for legacy scans. `limit` caps documents scanned,
/// not documents matched.
#[derive(Debug, Clone, Default)]
pub struct ScanFilter {
    pub user_id: Option<String>,
    pub pillar_id: Option<String>,
    pub limit: Option<usize>,
}

impl ScanFilter {
    pub fn user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn pillar(mut self, pillar_id: impl Into<String>) -> Self {
        self.pillar_id = Some(pillar_id.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
