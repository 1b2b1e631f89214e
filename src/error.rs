//! Error taxonomy shared by the request client, session store and forms.
//!
//! PROPAGATION
//! ===========
//! `ApiError` always reaches the immediate caller unchanged; nothing in this
//! crate retries. `MalformedLocalStateError` is the one error that is
//! recovered locally (rehydration maps it to an anonymous session).

use std::fmt;

// =============================================================================
// API
// =============================================================================

/// Failure of a single call made through [`crate::net::client::ApiClient`].
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received (DNS, connect, TLS, reset, transport timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Status { message: String, status: u16 },

    /// A success body did not match the expected record shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The request could not be built (empty endpoint, bad header, bad body).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// HTTP status for `Status` failures.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for 401 responses; callers decide whether that triggers logout.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Short machine-readable code, used by the CLI's error output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::Status { .. } => "E_API_STATUS",
            Self::Decode(_) => "E_DECODE",
            Self::InvalidRequest(_) => "E_INVALID_REQUEST",
        }
    }
}

// =============================================================================
// STORAGE
// =============================================================================

/// Durable storage could not be read or written.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed for `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage key `{0}` is not a valid entry name")]
    InvalidKey(String),
}

/// A durable entry exists but cannot be turned back into a session.
#[derive(Debug, thiserror::Error)]
pub enum MalformedLocalStateError {
    #[error("stored user profile is not valid JSON: {0}")]
    Profile(#[from] serde_json::Error),

    #[error("stored credential is empty")]
    EmptyCredential,

    #[error("durable storage unreadable: {0}")]
    Unreadable(#[from] StorageError),
}

// =============================================================================
// AUTH
// =============================================================================

/// Failure of [`crate::state::auth::SessionStore::login`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("could not persist session: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// The underlying API failure, if the login call itself failed.
    #[must_use]
    pub fn as_api(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            Self::Storage(_) => None,
        }
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

/// Caller-side form validation failure, raised before any call is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub(crate) fn push(&mut self, field: &'static str, message: &'static str) {
        self.fields.push(FieldError { field, message });
    }

    /// `true` when the named field was rejected.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
