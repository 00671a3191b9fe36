//! Entry domain model.
//!
//! # Responsibility
//! - Define the single record type persisted by the journal store.
//!
//! # Invariants
//! - `id` is stable and never reused for another entry.
//! - `owner_id` is fixed at creation; no core operation rewrites it.
//! - `created_at` is stamped by the store, never by callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one journal entry.
pub type EntryId = Uuid;

/// Identifier of the user who created an entry.
pub type OwnerId = Uuid;

/// One journal record owned by exactly one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Nil until `EntryManager::create_entry` assigns an identity.
    pub id: EntryId,
    /// Serialized as `user_id` to match the external schema naming.
    #[serde(rename = "user_id")]
    pub owner_id: OwnerId,
    pub title: String,
    pub content: String,
    /// Millisecond precision once read back from storage.
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Creates an entry without identity.
    ///
    /// The manager assigns `id` on create and the store replaces
    /// `created_at` with the persistence time.
    pub fn draft(owner_id: OwnerId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_id(Uuid::nil(), owner_id, title, content)
    }

    /// Creates an entry with a caller-provided identity.
    ///
    /// Used by import paths and by update-as-insert callers that already hold
    /// an id.
    pub fn with_id(
        id: EntryId,
        owner_id: OwnerId,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            owner_id,
            title: title.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Returns whether an identity has been assigned.
    pub fn has_id(&self) -> bool {
        !self.id.is_nil()
    }
}
