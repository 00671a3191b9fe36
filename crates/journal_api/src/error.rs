//! Endpoint error taxonomy and its HTTP mapping.
//!
//! # Invariants
//! - Clients only ever see the generic message for a category; store error
//!   detail stays in logs.
//! - `Forbidden` is decided only by the endpoint layer.

use crate::identity::AuthError;
use crate::wire::ErrorBody;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use journal_core::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type EndpointResult<T> = Result<T, EndpointError>;

/// Failure of one access-controlled entry operation.
#[derive(Debug)]
pub enum EndpointError {
    /// Malformed payload or unparsable caller identity.
    BadRequest(&'static str),
    /// No entry with the requested id.
    NotFound,
    /// Caller is authenticated but does not own the entry.
    Forbidden,
    /// Storage engine failure, surfaced as a generic failure message.
    Persistence {
        message: &'static str,
        source: StoreError,
    },
}

impl EndpointError {
    pub fn persistence(message: &'static str, source: StoreError) -> Self {
        Self::Persistence { message, source }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            Self::BadRequest(message) => *message,
            Self::NotFound => "Entry not found",
            Self::Forbidden => "Forbidden",
            Self::Persistence { message, .. } => *message,
        }
    }

    /// Stable machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Persistence { .. } => "persistence",
        }
    }
}

impl Display for EndpointError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Persistence { message, source } => write!(f, "{message}: {source}"),
            other => f.write_str(other.public_message()),
        }
    }
}

impl Error for EndpointError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl IntoResponse for EndpointError {
    fn into_response(self) -> Response {
        json_error(self.status(), self.public_message())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        json_error(StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}

pub(crate) fn json_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
