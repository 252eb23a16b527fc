//! user_core_state table queries. Natural key `user_id`.

use rusqlite::{params, Connection};
use serde::Serialize;

use stride_core::errors::StoreResult;

use super::{build_scope, params_slice, RowScope};

/// A user's aggregate wellness state. Mutable — backfill overwrites.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserCoreStateRow {
    pub user_id: String,
    pub momentum: f64,
    pub level: i64,
    pub last_check_in_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

pub fn upsert(conn: &Connection, row: &UserCoreStateRow) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO user_core_state
             (user_id, momentum, level, last_check_in_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (user_id) DO UPDATE SET
             momentum = excluded.momentum,
             level = excluded.level,
             last_check_in_at = excluded.last_check_in_at,
             updated_at = excluded.updated_at",
        params![
            row.user_id,
            row.momentum,
            row.level,
            row.last_check_in_at,
            row.created_at,
            row.updated_at
        ],
    )?;
    Ok(())
}

pub fn exists(conn: &Connection, user_id: &str) -> StoreResult<bool> {
    let found: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM user_core_state WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(found)
}

pub fn find(conn: &Connection, user_id: &str) -> StoreResult<Option<UserCoreStateRow>> {
    let result = conn.query_row(
        "SELECT user_id, momentum, level, last_check_in_at, created_at, updated_at
         FROM user_core_state WHERE user_id = ?1",
        params![user_id],
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
    let sql = format!("SELECT COUNT(*) FROM user_core_state WHERE {where_sql}");
    let count = conn.query_row(&sql, params_slice(&params).as_slice(), |row| row.get(0))?;
    Ok(count)
}

pub fn most_recent_timestamp(conn: &Connection, scope: &RowScope) -> StoreResult<Option<i64>> {
    let (where_sql, params) = build_scope(scope, false);
    let sql = format!("SELECT MAX(updated_at) FROM user_core_state WHERE {where_sql}");
    let ts = conn.query_row(&sql, params_slice(&params).as_slice(), |row| {
        row.get::<_, Option<i64>>(0)
    })?;
    Ok(ts)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserCoreStateRow> {
    Ok(UserCoreStateRow {
        user_id: row.get(0)?,
        momentum: row.get(1)?,
        level: row.get(2)?,
        last_check_in_at: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
