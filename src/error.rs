//! Error types for the POPSigner API client.
//!
//! Every operation returns [`PopSignerError`]. Errors fall into four groups:
//! local validation failures raised before any request is sent, transport
//! failures (connection, timeout, encoding), remote API errors carrying the
//! HTTP status, and default-organization resolution failures. Per-item batch
//! signing failures are never represented here; they live on the individual
//! batch result.

use thiserror::Error;

/// Result type for POPSigner operations.
pub type Result<T> = std::result::Result<T, PopSignerError>;

/// Errors that can occur when using the POPSigner API client.
#[derive(Error, Debug)]
pub enum PopSignerError {
    /// API error returned by the control plane (HTTP status >= 400).
    #[error("API error ({status_code}): {}", describe(.code, .message))]
    Api {
        /// Machine-readable error code, when the server sent one.
        code: Option<String>,
        /// Human-readable error message.
        message: String,
        /// HTTP status code.
        status_code: u16,
    },

    /// Network failure: DNS, refused connection, timeout or unreadable body.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The request body could not be encoded as JSON.
    #[error("failed to encode request: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A successful response could not be decoded (JSON envelope, base64, ...).
    #[error("decode error: {0}")]
    Decode(String),

    /// Local validation failed; no request was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The credential has access to no organization.
    #[error("no organizations found for this API key")]
    NoOrganizations,

    /// More than one organization is visible and none was selected explicitly.
    #[error("{count} organizations found; pass an explicit organization ID")]
    AmbiguousOrganization {
        /// Number of organizations visible to the credential.
        count: usize,
    },
}

fn describe(code: &Option<String>, message: &str) -> String {
    match code {
        Some(code) => format!("[{}] {}", code, message),
        None => message.to_string(),
    }
}

impl PopSignerError {
    /// Returns the HTTP status code, or 0 for errors that never reached the server.
    pub fn status_code(&self) -> u16 {
        match self {
            PopSignerError::Api { status_code, .. } => *status_code,
            _ => 0,
        }
    }

    /// Returns the server-provided error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            PopSignerError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Returns true if the resource does not exist (HTTP 404).
    pub fn is_not_found(&self) -> bool {
        self.status_code() == 404
    }

    /// Returns true if the credential was rejected (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == 401
    }

    /// Returns true if this is an authentication or authorization error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status_code(), 401 | 403)
    }

    /// Returns true if the error was produced locally, without a server response.
    pub fn is_local(&self) -> bool {
        self.status_code() == 0
    }

    /// Returns true if repeating the call could succeed.
    ///
    /// The client itself never retries; this is a hint for callers that do.
    pub fn is_retryable(&self) -> bool {
        match self {
            PopSignerError::Http(_) => true,
            PopSignerError::Api { status_code, .. } => *status_code == 429 || *status_code >= 500,
            _ => false,
        }
    }
}
