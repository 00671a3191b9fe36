//! Domain model for journal entries.
//!
//! # Invariants
//! - Every persisted entry is identified by a non-nil `EntryId`.
//! - Deletion is physical; there is no tombstone state.

pub mod entry;
