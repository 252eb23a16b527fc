//! SQLite PRAGMA configuration for store connections.
//!
//! Must be called on every connection immediately after opening.
//! busy_timeout doubles as the bounded per-attempt wait for routed
//! reads — a stalled store surfaces as an error instead of hanging
//! the request.

use rusqlite::Connection;

use stride_core::errors::StoreResult;

/// Configure a read-write SQLite connection.
///
/// - WAL for concurrent readers during writes
/// - busy_timeout for lock contention (primary concurrency mechanism)
/// - mmap for faster reads on large tables
/// - NORMAL synchronous for WAL durability trade-off
pub fn configure_connection(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA cache_size = -8000;
        PRAGMA mmap_size = 268435456;
        PRAGMA temp_store = MEMORY;
        ",
    )?;
    Ok(())
}

/// Configure a read-only connection (legacy store as seen by the
/// offline tools). Same PRAGMAs plus `query_only = ON` so the
/// migration layer is physically unable to write to the store of
/// record.
pub fn configure_readonly_connection(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA foreign_keys = ON;
        PRAGMA busy_timeout = 5000;
        PRAGMA cache_size = -8000;
        PRAGMA mmap_size = 268435456;
        PRAGMA temp_store = MEMORY;
        PRAGMA query_only = ON;
        ",
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configure_connection_sets_busy_timeout() {
        let conn = Connection::open_in_memory().unwrap();
        configure_connection(&conn).unwrap();

        let timeout: i64 = conn
            .pragma_query_value(None, "busy_timeout", |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 5000);
    }

    #[test]
    fn configure_connection_sets_foreign_keys() {
        let conn = Connection::open_in_memory().unwrap();
        configure_connection(&conn).unwrap();

        let fk: i64 = conn
            .pragma_query_value(None, "foreign_keys", |row| row.get(0))
            .unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn readonly_connection_rejects_writes() {
        let conn = Connection::open_in_memory().unwrap();
        configure_readonly_connection(&conn).unwrap();

        let result = conn.execute("CREATE TABLE t (x INTEGER)", []);
        assert!(result.is_err(), "query_only connection must reject DDL");
    }
}
