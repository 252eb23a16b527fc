//! # stride-core
//!
//! Foundation crate for the Stride datastore-migration layer.
//! Defines the entity catalog, identity derivation, read routing,
//! error taxonomy, and configuration. Every other crate in the
//! workspace depends on this.

pub mod config;
pub mod entity;
pub mod errors;
pub mod identity;
pub mod router;

// Re-export the most commonly used types at the crate root.
pub use config::MigrateConfig;
pub use entity::{EntityKind, OnExisting};
pub use errors::{MigrateError, StoreError};
pub use identity::derive_target_id;
pub use router::{route_read, RouteTags};
