//! Error types for the `AuthN` module.

use thiserror::Error;

/// Reason reported when no registered client accepted the request.
pub const CANNOT_AUTHENTICATE: &str = "cannot authenticate request";

/// Reason reported when several clients matched the request and all failed.
pub const ALL_CLIENTS_FAILED: &str = "all matching clients failed";

/// Errors that can occur when authenticating a request.
#[derive(Debug, Error)]
pub enum AuthNError {
    /// Credentials are absent or invalid, or no client could authenticate the request.
    ///
    /// `causes` is only populated by the dispatcher when more than one
    /// client was tried and every one of them failed.
    #[error("unauthenticated: {reason}{}", format_causes(.causes))]
    Unauthenticated {
        reason: String,
        causes: Vec<AuthNError>,
    },

    /// Authentication succeeded but the identity is disabled.
    #[error("identity is disabled")]
    IdentityDisabled,

    /// No client is registered under the requested name.
    #[error("client not configured: {0}")]
    ClientNotConfigured(String),

    /// Login produced an identity that is not a user.
    #[error("expected identity of type user but got: {0}")]
    UnsupportedIdentity(String),

    /// The client does not support the requested capability.
    #[error("client does not support generating redirect url: {0}")]
    UnsupportedClient(String),

    /// The request carries malformed credentials.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The request was cancelled while authentication was in flight.
    #[error("request cancelled")]
    Cancelled,

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthNError {
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated {
            reason: reason.into(),
            causes: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Builds the error returned once every candidate client has been tried.
    ///
    /// - no failures: nothing matched, `cannot authenticate request`
    /// - one failure: that failure is returned as is
    /// - several failures: an `Unauthenticated` error carrying all of them
    #[must_use]
    pub fn from_failures(mut failures: Vec<AuthNError>) -> Self {
        match failures.len() {
            0 => Self::unauthenticated(CANNOT_AUTHENTICATE),
            1 => failures
                .pop()
                .unwrap_or_else(|| Self::unauthenticated(CANNOT_AUTHENTICATE)),
            _ => Self::Unauthenticated {
                reason: ALL_CLIENTS_FAILED.to_owned(),
                causes: failures,
            },
        }
    }

    /// Underlying failures aggregated into this error, if any.
    #[must_use]
    pub fn causes(&self) -> &[AuthNError] {
        match self {
            Self::Unauthenticated { causes, .. } => causes,
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, Self::Unauthenticated { .. })
    }
}

fn format_causes(causes: &[AuthNError]) -> String {
    if causes.is_empty() {
        return String::new();
    }
    let joined = causes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!(" ({} errors occurred: {joined})", causes.len())
}
