//! Root crate facade for Tabletop: the core component model plus JSON
//! snapshot persistence for the headless binary.

/// Application configuration.
pub mod config;
/// Demo table contents.
pub mod demo;
/// Snapshot error type.
pub mod error;
/// Saving and loading table snapshots.
pub mod persistence;

pub use config::AppConfig;
pub use error::SnapshotError;
pub use persistence::{load_snapshot, save_snapshot};
pub use tabletop_core::*;
