//! ConnectionPool — writer + read pool with round-robin selection.
//!
//! The only place in the storage crate that holds `Mutex<Connection>`.
//! The pool is explicitly constructed and injected; there is no
//! process-global connection state.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rusqlite::Connection;

use stride_core::errors::{StoreError, StoreResult};

use crate::pragmas;

/// Default number of reader connections.
const DEFAULT_READ_POOL_SIZE: usize = 2;

/// Connection pool: 1 writer + N readers.
///
/// WAL mode is enabled on all connections.
/// Round-robin reader selection via atomic counter.
pub struct ConnectionPool {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    read_index: AtomicUsize,
}

impl ConnectionPool {
    /// Open a file-backed connection pool.
    ///
    /// Creates `read_pool_size` reader connections + 1 writer connection.
    pub fn open(path: &Path, read_pool_size: usize) -> StoreResult<Self> {
        let pool_size = if read_pool_size == 0 {
            DEFAULT_READ_POOL_SIZE
        } else {
            read_pool_size
        };

        let writer = Connection::open(path)?;
        pragmas::configure_connection(&writer)?;

        let mut readers = Vec::with_capacity(pool_size);
        for _ in 0..pool_size {
            let reader = Connection::open_with_flags(
                path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            pragmas::configure_readonly_connection(&reader)?;
            readers.push(Mutex::new(reader));
        }

        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            read_index: AtomicUsize::new(0),
        })
    }

    /// Open an in-memory connection pool (for testing).
    ///
    /// Readers is empty — `with_reader` falls back to the writer, so
    /// all operations share the single connection and see its data.
    pub fn open_in_memory() -> StoreResult<Self> {
        let writer = Connection::open_in_memory()?;
        pragmas::configure_connection(&writer)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            read_index: AtomicUsize::new(0),
        })
    }

    /// Execute a closure with the writer connection.
    pub fn with_writer<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        let conn = self.writer.lock().map_err(|_| StoreError::PoolPoisoned)?;
        f(&conn)
    }

    /// Execute a closure with a reader connection (round-robin).
    ///
    /// Falls back to the writer if no readers are available (in-memory mode).
    pub fn with_reader<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&Connection) -> StoreResult<T>,
    {
        if self.readers.is_empty() {
            return self.with_writer(f);
        }
        let index = self.read_index.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[index]
            .lock()
            .map_err(|_| StoreError::PoolPoisoned)?;
        f(&conn)
    }
}
