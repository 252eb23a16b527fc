//! Target relational store: pooled connections, schema migrations,
//! and per-entity query modules.

pub mod migrations;
pub mod queries;
pub mod schema;

use std::path::Path;

use rusqlite::Connection;

use stride_core::errors::StoreResult;

use crate::pool::ConnectionPool;

/// Handle to the target relational store.
///
/// Owns the connection pool; all reads go through `with_reader()`, all
/// writes through `with_writer()`. Query modules are free functions
/// over `&Connection`, so callers compose them inside these closures.
pub struct TargetStore {
    pool: ConnectionPool,
}

impl TargetStore {
    /// Open a file-backed store. Runs schema migrations.
    pub fn open(path: &Path, read_pool_size: usize) -> StoreResult<Self> {
        let pool = ConnectionPool::open(path, read_pool_size)?;
        pool.with_writer(|conn| {
            migrations::run_migrations(conn)?;
            Ok(())
        })?;
        Ok(Self { pool })
    }

    /// Open an in-memory store (for testing). Runs schema migrations.
    pub fn open_in_memory() -> StoreResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        pool.with_writer(|conn| {
            migrations::run_migrations(conn)?;
            Ok(())
        })?;
        Ok(Self { pool })
    }

    /// Execute a closure with a reader connection.
    pub fn with_reader<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        self.pool.with_reader(f)
    }

    /// Execute a closure with the writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        self.pool.with_writer(f)
    }
}
