//! # stride-migrate
//!
//! Offline tooling for the legacy → target store migration: per-entity
//! schema translation tables, the backfill job, the parity validator,
//! and the preflight gates shared by both CLI binaries.

pub mod backfill;
pub mod cli;
pub mod parity;
pub mod preflight;
pub mod translate;

pub use backfill::{run_backfill, BackfillOptions, BackfillSummary};
pub use parity::{run_parity, ParityOptions, ParityReport};
pub use translate::{validate_catalog, TranslateError};
