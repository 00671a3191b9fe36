//! HTTP API for owner-scoped journal entries.
//!
//! # Responsibility
//! - Enforce entry ownership on top of `journal_core`.
//! - Expose the `/api/entries` routes over axum.
//!
//! # Invariants
//! - No handler returns or mutates an entry the caller does not own.
//! - Client-facing error bodies never carry storage error detail.

pub mod endpoints;
pub mod error;
pub mod identity;
pub mod router;
pub mod wire;

pub use error::{EndpointError, EndpointResult};
pub use identity::{
    AuthError, CallerId, HeaderIdentityResolver, IdentityResolver, AUTH_SECRET_HEADER,
    DEFAULT_USER_HEADER,
};
pub use router::{router, AppState};
pub use wire::{CreatedResponse, EntryRequest, EntryResponse, ErrorBody, MessageResponse};
