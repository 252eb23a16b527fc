//! Legacy document-store connector.
//!
//! Exposes exactly the interface the migration layer needs: connect
//! (absent when unconfigured), ordered scans, counts, single-document
//! lookup, and recency probes.

pub mod connector;
pub mod document;

pub use connector::LegacyStore;
pub use document::{LegacyDocument, ScanFilter};
