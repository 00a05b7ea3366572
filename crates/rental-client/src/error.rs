//! Error types for the rental client.
//!
//! [`ClientError`] covers transport, decoding and API failures. Identity and
//! token storage failures have their own enums in [`crate::identity`] because
//! the credential chain treats them as degraded outcomes rather than errors.

use thiserror::Error;

use crate::identity::{IdentityError, TokenStoreError};

/// Failures surfaced by [`crate::RentalApiClient`] and the data hooks.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP transport error (connection refused, DNS failure, etc.).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured base URL or a derived path was not a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The API answered with a non-success status and an error envelope.
    #[error("API error (HTTP {status}, {code}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Stable machine-readable code from the envelope.
        code: String,
        /// Human-readable message from the envelope.
        message: String,
        /// Correlation id echoed by the server, when present.
        trace_id: Option<String>,
    },

    /// A success body could not be decoded; the raw body is kept for debugging.
    #[error("failed to decode response: {message}")]
    Deserialization {
        /// Decoder error message.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// A user-scoped operation ran before any user email was known.
    #[error("no signed-in user")]
    NotSignedIn,

    /// Input rejected locally before reaching the API.
    #[error("{0}")]
    Validation(String),

    /// Credential acquisition failed on an explicit action.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),

    /// The credential store could not be read or written.
    #[error("credential store error: {0}")]
    TokenStore(#[from] TokenStoreError),
}

impl ClientError {
    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for a 404 answer.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns `true` for a 409 answer such as a repeated booking.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(409)
    }

    /// Extract the API error code, if available.
    #[must_use]
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }
}
