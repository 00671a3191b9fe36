//! Persistence layer for journal entries.
//!
//! # Responsibility
//! - Define the storage contract consumed by the entry manager.
//! - Isolate SQLite query details from business orchestration.
//!
//! # Invariants
//! - Store APIs carry no ownership or authorization logic.
//! - Every operation issues a single SQL statement.

pub mod entry_store;
