// ── Core error types ──
//
// User-facing errors from eventdesk-core. Consumers never see HTTP status
// codes or JSON parse failures directly: the `From<eventdesk_api::Error>`
// impl folds transport-layer errors into the four-way taxonomy the stores
// and the coordinator reason about.

use strum::{Display, EnumString};
use thiserror::Error;

/// Coarse classification driving retry and session policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Retryable: the user sees "failed to load, try again".
    Network,
    /// Fatal for the session: forces re-authentication.
    Auth,
    /// Non-retryable: the resource does not exist.
    NotFound,
    /// Local, form-level: never reached the network.
    Validation,
    /// Anything else (malformed payloads, client setup).
    Internal,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Network ──────────────────────────────────────────────────────
    #[error("Cannot reach the booking service: {reason}")]
    Network { reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    // ── Auth ─────────────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Session expired -- sign in again")]
    SessionExpired,

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    // ── Not found ────────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid {field}: {message}")]
    ValidationFailed { field: String, message: String },

    // ── Internal ─────────────────────────────────────────────────────
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } | Self::Timeout { .. } | Self::Server { .. } => ErrorKind::Network,
            Self::AuthenticationFailed { .. }
            | Self::SessionExpired
            | Self::NotSignedIn
            | Self::Forbidden { .. } => ErrorKind::Auth,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::ValidationFailed { .. } => ErrorKind::Validation,
            Self::UnexpectedResponse { .. } | Self::Config { .. } | Self::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Whether retrying the same operation might succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Network
    }

    /// Whether this error should end the current session.
    ///
    /// A rejected login is an auth error too, but there is no session to end.
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    pub(crate) fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity_type: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_owned(),
            identifier: identifier.to_string(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<eventdesk_api::Error> for CoreError {
    fn from(err: eventdesk_api::Error) -> Self {
        use eventdesk_api::Error as Api;

        match err {
            Api::Authentication { message } => CoreError::AuthenticationFailed { message },
            Api::Unauthorized { .. } | Api::MalformedToken(_) => CoreError::SessionExpired,
            Api::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.status().map(|s| s.as_u16()) == Some(404) {
                    CoreError::not_found(
                        "resource",
                        e.url().map(|u| u.path().to_owned()).unwrap_or_default(),
                    )
                } else {
                    CoreError::Network {
                        reason: e.to_string(),
                    }
                }
            }
            Api::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            Api::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            Api::NotFound { path } => CoreError::not_found("resource", path),
            Api::Api { status, message } if status >= 500 => CoreError::Server { status, message },
            Api::Api { status, message } => CoreError::UnexpectedResponse {
                message: format!("HTTP {status}: {message}"),
            },
            Api::Deserialization { message, body: _ } => CoreError::UnexpectedResponse { message },
            Api::Setup(message) => CoreError::Internal(message),
        }
    }
}
