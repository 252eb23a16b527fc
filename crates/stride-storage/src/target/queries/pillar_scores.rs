//! pillar_scores table queries. Natural key `(user_id, pillar_id)`.

use rusqlite::{params, Connection};
use serde::Serialize;

use stride_core::errors::StoreResult;

use super::{build_scope, params_slice, RowScope};

/// A per-user, per-pillar score row. Mutable — backfill overwrites.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PillarScoreRow {
    pub user_id: String,
    pub pillar_id: String,
    pub score: f64,
    pub streak: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Upsert one score. The conflict branch rewrites every mutable column
/// from the incoming row, so a re-run lands byte-identical content.
pub fn upsert(conn: &Connection, row: &PillarScoreRow) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO pillar_scores (user_id, pillar_id, score, streak, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (user_id, pillar_id) DO UPDATE SET
             score = excluded.score,
             streak = excluded.streak,
             updated_at = excluded.updated_at",
        params![
            row.user_id,
            row.pillar_id,
            row.score,
            row.streak,
            row.created_at,
            row.updated_at
        ],
    )?;
    Ok(())
}

pub fn exists(conn: &Connection, user_id: &str, pillar_id: &str) -> StoreResult<bool> {
    let found: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM pillar_scores WHERE user_id = ?1 AND pillar_id = ?2",
        params![user_id, pillar_id],
        |row| row.get(0),
    )?;
    Ok(found)
}

pub fn find(
    conn: &Connection,
    user_id: &str,
    pillar_id: &str,
) -> StoreResult<Option<PillarScoreRow>> {
    let result = conn.query_row(
        "SELECT user_id, pillar_id, score, streak, created_at, updated_at
         FROM pillar_scores WHERE user_id = ?1 AND pillar_id = ?2",
        params![user_id, pillar_id],
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
    let sql = format!("SELECT COUNT(*) FROM pillar_scores WHERE {where_sql}");
    let count = conn.query_row(&sql, params_slice(&params).as_slice(), |row| row.get(0))?;
    Ok(count)
}

pub fn most_recent_timestamp(conn: &Connection, scope: &RowScope) -> StoreResult<Option<i64>> {
    let (where_sql, params) = build_scope(scope, true);
    let sql = format!("SELECT MAX(updated_at) FROM pillar_scores WHERE {where_sql}");
    let ts = conn.query_row(&sql, params_slice(&params).as_slice(), |row| {
        row.get::<_, Option<i64>>(0)
    })?;
    Ok(ts)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PillarScoreRow> {
    Ok(PillarScoreRow {
        user_id: row.get(0)?,
        pillar_id: row.get(1)?,
        score: row.get(2)?,
        streak: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
