//! action_plans table queries.

use rusqlite::{params, Connection};
use serde::Serialize;

use stride_core::errors::StoreResult;

use super::{build_scope, params_slice, RowScope};

/// An action plan row in the target store. Keyed by derived id.
/// `steps` is a JSON array carried as text, matching the legacy shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionPlanRow {
    pub id: String,
    pub user_id: String,
    pub pillar_id: String,
    pub title: String,
    pub steps: String,
    pub status: String,
    pub created_at: i64,
}

pub fn insert(conn: &Connection, row: &ActionPlanRow) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO action_plans (id, user_id, pillar_id, title, steps, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            row.id,
            row.user_id,
            row.pillar_id,
            row.title,
            row.steps,
            row.status,
            row.created_at
        ],
    )?;
    Ok(())
}

pub fn exists(conn: &Connection, id: &str) -> StoreResult<bool> {
    let found: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM action_plans WHERE id = ?1",
        params![id],
        |row| row.get(0),
    )?;
    Ok(found)
}

pub fn find_by_id(conn: &Connection, id: &str) -> StoreResult<Option<ActionPlanRow>> {
    let result = conn.query_row(
        "SELECT id, user_id, pillar_id, title, steps, status, created_at
         FROM action_plans WHERE id = ?1",
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
    let sql = format!("SELECT COUNT(*) FROM action_plans WHERE {where_sql}");
    let count = conn.query_row(&sql, params_slice(&params).as_slice(), |row| row.get(0))?;
    Ok(count)
}

pub fn most_recent_timestamp(conn: &Connection, scope: &RowScope) -> StoreResult<Option<i64>> {
    let (where_sql, params) = build_scope(scope, true);
    let sql = format!("SELECT MAX(created_at) FROM action_plans WHERE {where_sql}");
    let ts = conn.query_row(&sql, params_slice(&params).as_slice(), |row| {
        row.get::<_, Option<i64>>(0)
    })?;
    Ok(ts)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActionPlanRow> {
    Ok(ActionPlanRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        pillar_id: row.get(2)?,
        title: row.get(3)?,
        steps: row.get(4)?,
        status: row.get(5)?,
        created_at: row.get(6)?,
    })
}
