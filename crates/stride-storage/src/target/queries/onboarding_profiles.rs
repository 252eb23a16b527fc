//! onboarding_profiles table queries. Natural key `user_id`.

use rusqlite::{params, Connection};
use serde::Serialize;

use stride_core::errors::StoreResult;

use super::{build_scope, params_slice, RowScope};

/// A user's onboarding profile. Mutable — backfill overwrites.
/// `goals` is a JSON array carried as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnboardingProfileRow {
    pub user_id: String,
    pub goals: String,
    pub timezone: String,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

pub fn upsert(conn: &Connection, row: &OnboardingProfileRow) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO onboarding_profiles
             (user_id, goals, timezone, completed_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT (user_id) DO UPDATE SET
             goals = excluded.goals,
             timezone = excluded.timezone,
             completed_at = excluded.completed_at,
             updated_at = excluded.updated_at",
        params![
            row.user_id,
            row.goals,
            row.timezone,
            row.completed_at,
            row.created_at,
            row.updated_at
        ],
    )?;
    Ok(())
}

pub fn exists(conn: &Connection, user_id: &str) -> StoreResult<bool> {
    let found: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM onboarding_profiles WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(found)
}

pub fn find(conn: &Connection, user_id: &str) -> StoreResult<Option<OnboardingProfileRow>> {
    let result = conn.query_row(
        "SELECT user_id, goals, timezone, completed_at, created_at, updated_at
         FROM onboarding_profiles WHERE user_id = ?1",
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
    let sql = format!("SELECT COUNT(*) FROM onboarding_profiles WHERE {where_sql}");
    let count = conn.query_row(&sql, params_slice(&params).as_slice(), |row| row.get(0))?;
    Ok(count)
}

pub fn most_recent_timestamp(conn: &Connection, scope: &RowScope) -> StoreResult<Option<i64>> {
    let (where_sql, params) = build_scope(scope, false);
    let sql = format!("SELECT MAX(updated_at) FROM onboarding_profiles WHERE {where_sql}");
    let ts = conn.query_row(&sql, params_slice(&params).as_slice(), |row| {
        row.get::<_, Option<i64>>(0)
    })?;
    Ok(ts)
}

fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OnboardingProfileRow> {
    Ok(OnboardingProfileRow {
        user_id: row.get(0)?,
        goals: row.get(1)?,
        timezone: row.get(2)?,
        completed_at: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}
