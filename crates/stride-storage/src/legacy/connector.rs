//! Connection handling and queries for the legacy document store.
//!
//! The legacy store keeps every collection in a single `documents`
//! table (collection, id, owner, JSON body, timestamps); sub-type
//! filters go through `json_extract`. Scans are ordered by
//! `created_at` ascending with the id as tiebreak, so a limited or
//! resumed pass always makes forward progress from the same starting
//! point.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::ToSql;
use rusqlite::Connection;

use stride_core::config::MigrateConfig;
use stride_core::errors::{StoreError, StoreResult};

use super::document::{LegacyDocument, ScanFilter};
use crate::pragmas;

/// Schema for the writable (application/test) side of the store.
const LEGACY_SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS documents (
    collection TEXT NOT NULL,
    id TEXT NOT NULL,
    user_id TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (collection, id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_documents_scan
    ON documents(collection, created_at, id);
CREATE INDEX IF NOT EXISTS idx_documents_owner
    ON documents(collection, user_id);
";

/// Handle to the legacy document store.
pub struct LegacyStore {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for LegacyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyStore").finish_non_exhaustive()
    }
}

impl LegacyStore {
    /// Connect for offline tooling: read-only, absent when unconfigured.
    ///
    /// `Ok(None)` when no legacy path is configured — that is a normal,
    /// handled state, never an error. A configured-but-missing database
    /// file is an error: the tools must not silently scan nothing.
    pub fn connect(config: &MigrateConfig) -> StoreResult<Option<LegacyStore>> {
        let Some(path) = config.legacy_db_path.as_deref() else {
            return Ok(None);
        };
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        pragmas::configure_readonly_connection(&conn)?;
        Ok(Some(Self {
            conn: Mutex::new(conn),
        }))
    }

    /// Open read-write (live write path and test fixtures).
    pub fn open(path: &Path) -> StoreResult<LegacyStore> {
        let conn = Connection::open(path)?;
        pragmas::configure_connection(&conn)?;
        conn.execute_batch(LEGACY_SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<LegacyStore> {
        let conn = Connection::open_in_memory()?;
        pragmas::configure_connection(&conn)?;
        conn.execute_batch(LEGACY_SCHEMA_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::PoolPoisoned)?;
        f(&conn)
    }

    /// Insert one document (writable handles only).
    pub fn insert_document(&self, collection: &str, doc: &LegacyDocument) -> StoreResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (collection, id, user_id, body, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (collection, id) DO UPDATE SET
                     user_id = excluded.user_id,
                     body = excluded.body,
                     updated_at = excluded.updated_at",
                rusqlite::params![
                    collection,
                    doc.id,
                    doc.user_id,
                    doc.body,
                    doc.created_at,
                    doc.updated_at
                ],
            )?;
            Ok(())
        })
    }

    /// Forward scan over a collection, oldest first.
    pub fn find(&self, collection: &str, filter: &ScanFilter) -> StoreResult<Vec<LegacyDocument>> {
        self.with_conn(|conn| {
            let (where_sql, params) = build_filter(collection, filter);
            let limit_sql = match filter.limit {
                Some(n) => format!(" LIMIT {n}"),
                None => String::new(),
            };
            let sql = format!(
                "SELECT id, user_id, body, created_at, updated_at
                 FROM documents WHERE {where_sql}
                 ORDER BY created_at ASC, id ASC{limit_sql}"
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_slice(&params).as_slice(), map_document)?;

            let mut result = Vec::new();
            for row in rows {
                result.push(row?);
            }
            Ok(result)
        })
    }

    /// Count documents matching the scope.
    pub fn count(&self, collection: &str, filter: &ScanFilter) -> StoreResult<i64> {
        self.with_conn(|conn| {
            let (where_sql, params) = build_filter(collection, filter);
            let sql = format!("SELECT COUNT(*) FROM documents WHERE {where_sql}");
            let count =
                conn.query_row(&sql, params_slice(&params).as_slice(), |row| row.get(0))?;
            Ok(count)
        })
    }

    /// The `n` most recent documents in scope, newest first — the
    /// validator's sampling query.
    pub fn recent(
        &self,
        collection: &str,
        filter: &ScanFilter,
        n: usize,
    ) -> StoreResult<Vec<LegacyDocument>> {
        self.with_conn(|conn| {
            let (where_sql, params) = build_filter(collection, filter);
            let sql = format!(
                "SELECT id, user_id, body, created_at, updated_at
                 FROM documents WHERE {where_sql}
                 ORDER BY created_at DESC, id DESC LIMIT {n}"
            );

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_slice(&params).as_slice(), map_document)?;

            let mut result = Vec::new();
            for row in rows {
                result.push(row?);
            }
            Ok(result)
        })
    }

    /// Look up a single document by legacy id.
    pub fn find_one(&self, collection: &str, id: &str) -> StoreResult<Option<LegacyDocument>> {
        self.with_conn(|conn| {
            let result = conn.query_row(
                "SELECT id, user_id, body, created_at, updated_at
                 FROM documents WHERE collection = ?1 AND id = ?2",
                rusqlite::params![collection, id],
                map_document,
            );
            match result {
                Ok(doc) => Ok(Some(doc)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    /// Newest timestamp in the scope, or `None` for an empty scope.
    /// `recency_column` must be `created_at` or `updated_at`.
    pub fn most_recent_timestamp(
        &self,
        collection: &str,
        filter: &ScanFilter,
        recency_column: &str,
    ) -> StoreResult<Option<i64>> {
        // Column name is interpolated — restrict to the two known columns.
        let column = match recency_column {
            "updated_at" => "updated_at",
            _ => "created_at",
        };
        self.with_conn(|conn| {
            let (where_sql, params) = build_filter(collection, filter);
            let sql = format!("SELECT MAX({column}) FROM documents WHERE {where_sql}");
            let ts = conn.query_row(&sql, params_slice(&params).as_slice(), |row| {
                row.get::<_, Option<i64>>(0)
            })?;
            Ok(ts)
        })
    }
}

fn map_document(row: &rusqlite::Row<'_>) -> rusqlite::Result<LegacyDocument> {
    Ok(LegacyDocument {
        id: row.get(0)?,
        user_id: row.get(1)?,
        body: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Build the WHERE clause and owned parameter list for a scoped query.
fn build_filter(collection: &str, filter: &ScanFilter) -> (String, Vec<String>) {
    let mut clauses = vec!["collection = ?1".to_string()];
    let mut params = vec![collection.to_string()];

    if let Some(user_id) = &filter.user_id {
        params.push(user_id.clone());
        clauses.push(format!("user_id = ?{}", params.len()));
    }
    if let Some(pillar_id) = &filter.pillar_id {
        params.push(pillar_id.clone());
        clauses.push(format!("json_extract(body, '$.pillarId') = ?{}", params.len()));
    }

    (clauses.join(" AND "), params)
}

fn params_slice(params: &[String]) -> Vec<&dyn ToSql> {
    params.iter().map(|p| p as &dyn ToSql).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, user: &str, body: serde_json::Value, created_at: i64) -> LegacyDocument {
        LegacyDocument {
            id: id.to_string(),
            user_id: user.to_string(),
            body: body.to_string(),
            created_at,
            updated_at: created_at,
        }
    }

    #[test]
    fn connect_unconfigured_is_none() {
        let config = MigrateConfig::default();
        let store = LegacyStore::connect(&config).unwrap();
        assert!(store.is_none());
    }

    #[test]
    fn scan_is_oldest_first() {
        let store = LegacyStore::open_in_memory().unwrap();
        store
            .insert_document("pillar_check_ins", &doc("b", "u1", serde_json::json!({}), 200))
            .unwrap();
        store
            .insert_document("pillar_check_ins", &doc("a", "u1", serde_json::json!({}), 100))
            .unwrap();

        let docs = store.find("pillar_check_ins", &ScanFilter::default()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "a");
        assert_eq!(docs[1].id, "b");
    }

    #[test]
    fn filters_scope_by_owner_and_pillar() {
        let store = LegacyStore::open_in_memory().unwrap();
        store
            .insert_document(
                "pillar_check_ins",
                &doc("c1", "u1", serde_json::json!({"pillarId": "sleep"}), 100),
            )
            .unwrap();
        store
            .insert_document(
                "pillar_check_ins",
                &doc("c2", "u1", serde_json::json!({"pillarId": "movement"}), 110),
            )
            .unwrap();
        store
            .insert_document(
                "pillar_check_ins",
                &doc("c3", "u2", serde_json::json!({"pillarId": "sleep"}), 120),
            )
            .unwrap();

        let filter = ScanFilter::default().user("u1").pillar("sleep");
        let docs = store.find("pillar_check_ins", &filter).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "c1");

        assert_eq!(store.count("pillar_check_ins", &filter).unwrap(), 1);
        assert_eq!(
            store
                .count("pillar_check_ins", &ScanFilter::default())
                .unwrap(),
            3
        );
    }

    #[test]
    fn limit_caps_scanned_documents() {
        let store = LegacyStore::open_in_memory().unwrap();
        for i in 0..5 {
            store
                .insert_document(
                    "coach_messages",
                    &doc(&format!("m{i}"), "u1", serde_json::json!({}), 100 + i),
                )
                .unwrap();
        }

        let docs = store
            .find("coach_messages", &ScanFilter::default().limit(2))
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id, "m0");
    }

    #[test]
    fn most_recent_timestamp_handles_empty_scope() {
        let store = LegacyStore::open_in_memory().unwrap();
        let ts = store
            .most_recent_timestamp("action_plans", &ScanFilter::default(), "created_at")
            .unwrap();
        assert!(ts.is_none());

        store
            .insert_document("action_plans", &doc("p1", "u1", serde_json::json!({}), 500))
            .unwrap();
        let ts = store
            .most_recent_timestamp("action_plans", &ScanFilter::default(), "created_at")
            .unwrap();
        assert_eq!(ts, Some(500));
    }
}
