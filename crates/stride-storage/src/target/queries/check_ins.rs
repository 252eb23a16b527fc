//! check_ins table queries.

use rusqlite::{params, Connection};
use serde::Serialize;

use stride_core::errors::StoreResult;

use super::{build_scope, params_slice, RowScope};

/// A check-in row in the target store. Keyed by derived id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckInRow {
    pub id: String,
    pub user_id: String,
    pub pillar_id: String,
    pub value: f64,
    pub note: Option<String>,
    pub logged_at: i64,
    pub created_at: i64,
}

/// Insert one check-in. Fails on a duplicate id — Skip-policy callers
/// check existence first.
pub fn insert(conn: &Connection, row: &CheckInRow) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO check_ins (id, user_id, pillar_id, value, note, logged_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            row.id,
            row.user_id,
            row.pillar_id,
            row.value,
            row.note,
            row.logged_at,
            row.created_at
        ],
    )?;
    Ok(())
}

pub fn exists(conn: &Connection, id: &str) -> StoreResult<bool> {
    let found: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM check_ins WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(found)
}

pub fn find_by_id(conn: &Connection, id: &str) -> StoreResult<Option<CheckInRow>> {
    let result = conn.query_row(
        "SELECT id, user_id, pillar_id, value, note, logged_at, created_at
         FROM check_ins WHERE id = ?1",
        params![id],
        map_row,
    );
    match result {
        Ok(row) => Ok(Some(row)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn count(conn: &Connection, scope: &RowScope) -> StoreResult<i64> {
    let (where_sql, params) = build_scope(scope, true);
    let sql = format!("SELECT COUNT(*) FROM check_ins WHERE {where_sql}");
    let count = conn.query_row(&sql, params_slice(&params).as_slice(), |row| row.get(0))?;
    Ok(count)
}

pub fn most_recent_timestamp(conn: &Connection, scope: &RowScope) -> StoreResult<Option<i64>> {
    let (where_sql, params) = build_scope(scope, true);
    let sql = format!("SELECT MAX(created_at) FROM check_ins WHERE {where_sql}");
    let ts = conn.query_row(&sql, params_slice(&params).as_slice(), |row| {
        row.get::<_, Option<i64>>(0)
    })?;
    Ok(ts)
}

/// The `n` most recent check-ins in scope — the live read path's query.
pub fn recent(conn: &Connection, scope: &RowScope, n: usize) -> StoreResult<Vec<CheckInRow>> {
    let (where_sql, params) = build_scope(scope, true);
    let sql = format!(
        "SELECT id, user_id, pillar_id, value, note, logged_at, created_at
         FROM check_ins WHERE {where_sql}
         ORDER BY created_at DESC, id DESC LIMIT {n}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_slice(&params).as_slice(), map_row)?;

    let mut result = Vec::new();
    for row in rows {
        result.push(row?);
    }
    Ok(result)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CheckInRow> {
    Ok(CheckInRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        pillar_id: row.get(2)?,
        value: row.get(3)?,
        note: row.get(4)?,
        logged_at: row.get(5)?,
        created_at: row.get(6)?,
    })
}
