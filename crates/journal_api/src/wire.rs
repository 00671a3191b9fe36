//! JSON request/response shapes for the entries API.

use chrono::SecondsFormat;
use journal_core::Entry;
use serde::{Deserialize, Serialize};

/// Body accepted by create and update.
///
/// Only `title` and `content` are read; any other field in the payload
/// (`id`, `user_id`, `created_at`) is ignored. A missing field reads as an
/// empty string and is left to the storage constraints.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntryRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Entry representation returned to its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    /// RFC 3339 with offset, second precision.
    pub created_at: String,
}

impl From<&Entry> for EntryResponse {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id.to_string(),
            user_id: entry.owner_id.to_string(),
            title: entry.title.clone(),
            content: entry.content.clone(),
            created_at: entry.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Body returned by create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: String,
    pub message: String,
}

/// Body returned by update and delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
