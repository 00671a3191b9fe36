//! Entry use-case service.
//!
//! # Responsibility
//! - Assign entry identity on creation.
//! - Delegate every other operation to the store unchanged.
//!
//! # Invariants
//! - This is the only place a fresh `EntryId` is generated.
//! - No ownership filtering or checks happen here; `list_entries` returns
//!   every owner's entries.
//! - Store errors propagate without translation.

use crate::model::entry::Entry;
use crate::store::entry_store::{EntryStore, StoreResult};
use log::debug;
use uuid::Uuid;

/// Business-rules layer over an [`EntryStore`].
pub struct EntryManager<S: EntryStore> {
    store: S,
}

impl<S: EntryStore> EntryManager<S> {
    /// Creates a manager using the provided store implementation.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persists a new entry, generating an id when none was supplied.
    ///
    /// Returns the entry as stored, including its `created_at`.
    pub fn create_entry(&self, mut entry: Entry) -> StoreResult<Entry> {
        if !entry.has_id() {
            entry.id = Uuid::new_v4();
            debug!(
                "event=entry_id_assigned module=service entry_id={}",
                entry.id
            );
        }
        self.store.create(&entry)
    }

    /// Loads one entry by id.
    pub fn get_entry_by_id(&self, id: &str) -> StoreResult<Entry> {
        self.store.read(id)
    }

    /// Writes the entry verbatim; unknown ids are inserted.
    pub fn update_entry(&self, entry: &Entry) -> StoreResult<()> {
        self.store.update(entry)
    }

    /// Deletes one entry by id. Missing ids succeed.
    pub fn delete_entry(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id)
    }

    /// Lists all entries across owners, newest first.
    pub fn list_entries(&self) -> StoreResult<Vec<Entry>> {
        self.store.list()
    }
}
