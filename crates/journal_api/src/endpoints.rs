//! Access-controlled entry operations.
//!
//! # Responsibility
//! - Enforce that a caller only ever reads or mutates entries it owns.
//! - Shape manager results into wire representations.
//!
//! # Invariants
//! - Create always takes `owner_id` from the caller identity, never from the
//!   payload.
//! - Get/Update/Delete load the entry and check ownership before anything
//!   else; a non-owner gets `Forbidden` whatever the payload holds.
//! - Update rewrites only `title` and `content`.
//! - List filters the manager's unfiltered sequence to the caller's entries,
//!   keeping its newest-first order.
//! - Ownership is exact string equality between the stored owner id and the
//!   caller identity.
//!
//! The check and the following write are separate statements; a concurrent
//! delete in between turns an update into a re-insert under the original
//! owner and a delete into a no-op.

use crate::error::{EndpointError, EndpointResult};
use crate::identity::CallerId;
use crate::wire::{CreatedResponse, EntryRequest, EntryResponse, MessageResponse};
use journal_core::{Entry, EntryManager, EntryStore, OwnerId};
use log::warn;
use uuid::Uuid;

/// Creates an entry owned by `caller` from a `{title, content}` payload.
pub fn create_entry<S: EntryStore>(
    manager: &EntryManager<S>,
    caller: &CallerId,
    body: &[u8],
) -> EndpointResult<CreatedResponse> {
    let owner_id = parse_owner_id(caller)?;
    let request = parse_entry_request(body)?;

    let created = manager
        .create_entry(Entry::draft(owner_id, request.title, request.content))
        .map_err(|err| EndpointError::persistence("Failed to create entry", err))?;

    Ok(CreatedResponse {
        id: created.id.to_string(),
        message: "Entry created successfully".to_string(),
    })
}

/// Returns the entry to its owner.
pub fn get_entry<S: EntryStore>(
    manager: &EntryManager<S>,
    caller: &CallerId,
    id: &str,
) -> EndpointResult<EntryResponse> {
    let entry = load_owned_entry(manager, caller, id)?;
    Ok(EntryResponse::from(&entry))
}

/// Overwrites title and content of an entry the caller owns.
pub fn update_entry<S: EntryStore>(
    manager: &EntryManager<S>,
    caller: &CallerId,
    id: &str,
    body: &[u8],
) -> EndpointResult<MessageResponse> {
    let mut entry = load_owned_entry(manager, caller, id)?;
    let request = parse_entry_request(body)?;

    entry.title = request.title;
    entry.content = request.content;
    manager
        .update_entry(&entry)
        .map_err(|err| EndpointError::persistence("Failed to update entry", err))?;

    Ok(MessageResponse::new("Entry updated successfully"))
}

/// Deletes an entry the caller owns.
pub fn delete_entry<S: EntryStore>(
    manager: &EntryManager<S>,
    caller: &CallerId,
    id: &str,
) -> EndpointResult<MessageResponse> {
    load_owned_entry(manager, caller, id)?;
    manager
        .delete_entry(id)
        .map_err(|err| EndpointError::persistence("Failed to delete entry", err))?;

    Ok(MessageResponse::new("Entry deleted successfully"))
}

/// Lists the caller's entries, newest first.
pub fn list_entries<S: EntryStore>(
    manager: &EntryManager<S>,
    caller: &CallerId,
) -> EndpointResult<Vec<EntryResponse>> {
    let entries = manager
        .list_entries()
        .map_err(|err| EndpointError::persistence("Failed to retrieve entries", err))?;

    Ok(entries
        .iter()
        .filter(|entry| is_owner(entry, caller))
        .map(EntryResponse::from)
        .collect())
}

fn load_owned_entry<S: EntryStore>(
    manager: &EntryManager<S>,
    caller: &CallerId,
    id: &str,
) -> EndpointResult<Entry> {
    let entry = manager.get_entry_by_id(id).map_err(|err| {
        if err.is_not_found() {
            EndpointError::NotFound
        } else {
            EndpointError::persistence("Failed to retrieve entry", err)
        }
    })?;

    if !is_owner(&entry, caller) {
        warn!(
            "event=entry_access_denied module=api status=error entry_id={} caller={}",
            entry.id, caller
        );
        return Err(EndpointError::Forbidden);
    }

    Ok(entry)
}

fn is_owner(entry: &Entry, caller: &CallerId) -> bool {
    entry.owner_id.to_string() == caller.as_str()
}

fn parse_owner_id(caller: &CallerId) -> EndpointResult<OwnerId> {
    Uuid::parse_str(caller.as_str()).map_err(|_| EndpointError::BadRequest("Invalid user ID"))
}

fn parse_entry_request(body: &[u8]) -> EndpointResult<EntryRequest> {
    serde_json::from_slice(body).map_err(|_| EndpointError::BadRequest("Invalid request payload"))
}

#[cfg(test)]
mod tests {
    use super::{is_owner, parse_entry_request, parse_owner_id};
    use crate::error::EndpointError;
    use crate::identity::CallerId;
    use journal_core::Entry;
    use uuid::Uuid;

    #[test]
    fn ownership_is_exact_string_equality() {
        let owner = Uuid::parse_str("0f8fad5b-d9cb-469f-a165-70867728950e").unwrap();
        let entry = Entry::with_id(Uuid::new_v4(), owner, "t", "c");

        assert!(is_owner(&entry, &CallerId::new("0f8fad5b-d9cb-469f-a165-70867728950e")));
        assert!(!is_owner(&entry, &CallerId::new("0F8FAD5B-D9CB-469F-A165-70867728950E")));
        assert!(!is_owner(&entry, &CallerId::new("0f8fad5b-d9cb-469f-a165")));
        assert!(!is_owner(&entry, &CallerId::new("")));
    }

    #[test]
    fn parse_owner_id_rejects_non_uuid_identity() {
        let err = parse_owner_id(&CallerId::new("alice")).unwrap_err();
        assert!(matches!(err, EndpointError::BadRequest("Invalid user ID")));
    }

    #[test]
    fn parse_entry_request_ignores_extra_fields_and_defaults_missing_ones() {
        let request = parse_entry_request(
            br#"{"title":"t","content":"c","user_id":"someone","id":"x"}"#,
        )
        .unwrap();
        assert_eq!(request.title, "t");
        assert_eq!(request.content, "c");

        let title_only = parse_entry_request(br#"{"title":"t"}"#).unwrap();
        assert_eq!(title_only.title, "t");
        assert_eq!(title_only.content, "");

        let empty = parse_entry_request(b"{}").unwrap();
        assert_eq!(empty.title, "");
        assert_eq!(empty.content, "");

        assert!(parse_entry_request(br#"{"title":5,"content":"c"}"#).is_err());
        assert!(parse_entry_request(b"not json").is_err());
    }
}
