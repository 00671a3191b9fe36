//! Core domain logic for the journal service.
//! This crate owns entry persistence and identity assignment; it carries no
//! authorization logic.

pub mod db;
pub mod logging;
pub mod model;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::entry::{Entry, EntryId, OwnerId};
pub use service::entry_manager::EntryManager;
pub use store::entry_store::{EntryStore, SqliteEntryStore, StoreError, StoreResult};

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
