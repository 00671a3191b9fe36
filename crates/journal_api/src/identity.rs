//! Caller identity resolution.
//!
//! # Responsibility
//! - Turn an inbound request's headers into an opaque caller identity.
//! - Reject unauthenticated requests before any entry operation runs.
//!
//! # Invariants
//! - The identity string is passed through verbatim; ownership checks compare
//!   it by exact equality.

use axum::http::{HeaderMap, HeaderName};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Header carrying the shared secret proving the request came through the
/// trusted authentication proxy.
pub const AUTH_SECRET_HEADER: &str = "x-journal-auth-secret";

/// Default header carrying the verified user id.
pub const DEFAULT_USER_HEADER: &str = "x-user-id";

/// Opaque authenticated-user identifier for the current request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallerId(String);

impl CallerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for CallerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Authentication failure raised before the entry core is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No usable identity header on the request.
    MissingIdentity,
    /// The shared secret header is missing or wrong.
    InvalidSecret,
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingIdentity => write!(f, "request carries no caller identity"),
            Self::InvalidSecret => write!(f, "request failed shared-secret verification"),
        }
    }
}

impl Error for AuthError {}

/// Capability that resolves the caller of a request.
pub trait IdentityResolver: Send + Sync {
    fn resolve(&self, headers: &HeaderMap) -> Result<CallerId, AuthError>;
}

/// Resolves identity from a header set by a trusted upstream session layer.
#[derive(Debug, Clone)]
pub struct HeaderIdentityResolver {
    user_header: HeaderName,
    shared_secret: Option<String>,
}

impl HeaderIdentityResolver {
    /// Builds a resolver reading `user_header`.
    ///
    /// When `shared_secret` is set, requests must also carry it in
    /// [`AUTH_SECRET_HEADER`].
    pub fn new(
        user_header: &str,
        shared_secret: Option<String>,
    ) -> Result<Self, axum::http::header::InvalidHeaderName> {
        Ok(Self {
            user_header: HeaderName::from_bytes(user_header.trim().as_bytes())?,
            shared_secret,
        })
    }
}

impl IdentityResolver for HeaderIdentityResolver {
    fn resolve(&self, headers: &HeaderMap) -> Result<CallerId, AuthError> {
        if let Some(expected) = self.shared_secret.as_deref() {
            let presented = headers
                .get(AUTH_SECRET_HEADER)
                .and_then(|value| value.to_str().ok());
            if presented != Some(expected) {
                return Err(AuthError::InvalidSecret);
            }
        }

        let identity = headers
            .get(&self.user_header)
            .and_then(|value| value.to_str().ok())
            .ok_or(AuthError::MissingIdentity)?;
        if identity.trim().is_empty() {
            return Err(AuthError::MissingIdentity);
        }

        Ok(CallerId::new(identity))
    }
}
