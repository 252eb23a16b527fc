//! # stride-storage
//!
//! Storage layer for the Stride migration: the legacy document-store
//! connector (read side of the migration) and the target relational
//! store (connection pool, pragmas, schema migrations, per-entity
//! query modules).

pub mod legacy;
pub mod pool;
pub mod pragmas;
pub mod target;

pub use legacy::{LegacyDocument, LegacyStore, ScanFilter};
pub use pool::ConnectionPool;
pub use pragmas::{configure_connection, configure_readonly_connection};
pub use target::TargetStore;
