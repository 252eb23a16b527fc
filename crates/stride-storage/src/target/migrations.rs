//! Schema versioning using PRAGMA user_version.
//!
//! Each version bump is a const SQL string; `run_migrations` is
//! idempotent and safe to call on every open.

use rusqlite::Connection;
use tracing::info;

use stride_core::errors::{StoreError, StoreResult};

use super::schema::TARGET_SCHEMA_V1;

/// Current schema version. Bump this when adding new migrations.
pub const CURRENT_VERSION: u32 = 1;

/// Get the current schema version via PRAGMA user_version.
pub fn current_version(conn: &Connection) -> StoreResult<u32> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

/// Run all pending migrations to bring the database up to
/// CURRENT_VERSION. Returns the resulting version.
pub fn run_migrations(conn: &Connection) -> StoreResult<u32> {
    let current = current_version(conn)?;
    if current >= CURRENT_VERSION {
        return Ok(current);
    }

    if current < 1 {
        info!(target: "stride_storage", "Migrating target schema: 0 → 1 (entity tables)");
        conn.execute_batch(TARGET_SCHEMA_V1)
            .map_err(|e| StoreError::MigrationFailed {
                version: 1,
                message: e.to_string(),
            })?;
        conn.pragma_update(None, "user_version", 1)?;
    }

    // Future migrations go here:
    // if current < 2 { ... }

    current_version(conn)
}
