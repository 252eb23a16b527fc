//! coach_messages table queries.

use rusqlite::{params, Connection};
use serde::Serialize;

use stride_core::errors::StoreResult;

use super::{build_scope, params_slice, RowScope};

/// A coaching-conversation message in the target store. Keyed by
/// derived id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoachMessageRow {
    pub id: String,
    pub user_id: String,
    pub role: String,
    pub content: String,
    pub created_at: i64,
}

pub fn insert(conn: &Connection, row: &CoachMessageRow) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO coach_messages (id, user_id, role, content, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![row.id, row.user_id, row.role, row.content, row.created_at],
    )?;
    Ok(())
}

pub fn exists(conn: &Connection, id: &str) -> StoreResult<bool> {
    let found: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM coach_messages WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(found)
}

pub fn find_by_id(conn: &Connection, id: &str) -> StoreResult<Option<CoachMessageRow>> {
    let result = conn.query_row(
        "SELECT id, user_id, role, content, created_at
         FROM coach_messages WHERE id = ?1",
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
    let (where_sql, params) = build_scope(scope, false);
    let sql = format!("SELECT COUNT(*) FROM coach_messages WHERE {where_sql}");
    let count = conn.query_row(&sql, params_slice(&params).as_slice(), |row| row.get(0))?;
    Ok(count)
}

pub fn most_recent_timestamp(conn: &Connection, scope: &RowScope) -> StoreResult<Option<i64>> {
    let (where_sql, params) = build_scope(scope, false);
    let sql = format!("SELECT MAX(created_at) FROM coach_messages WHERE {where_sql}");
    let ts = conn.query_row(&sql, params_slice(&params).as_slice(), |row| {
        row.get::<_, Option<i64>>(0)
    })?;
    Ok(ts)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CoachMessageRow> {
    Ok(CoachMessageRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        role: row.get(2)?,
        content: row.get(3)?,
        created_at: row.get(4)?,
    })
}
