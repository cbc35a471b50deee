//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use eventdesk_config::ConfigError;
use eventdesk_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the eventdesk server")]
    #[diagnostic(
        code(eventdesk::connection_failed),
        help(
            "Check that the server is running and the profile URL is right.\n\
             Reason: {reason}\n\
             Try: eventdesk config show"
        )
    )]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(eventdesk::timeout),
        help("Increase timeout with --timeout or check server responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Sign-in failed: {message}")]
    #[diagnostic(code(eventdesk::auth_failed), help("Check the email and password."))]
    AuthFailed { message: String },

    #[error("Not signed in on profile '{profile}'")]
    #[diagnostic(code(eventdesk::not_signed_in), help("Run: eventdesk login"))]
    NotSignedIn { profile: String },

    #[error("Session expired on profile '{profile}'")]
    #[diagnostic(
        code(eventdesk::session_expired),
        help("Cached data was cleared. Sign in again with: eventdesk login")
    )]
    SessionExpired { profile: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(eventdesk::forbidden),
        help("Admin commands need an administrator account.")
    )]
    Forbidden { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(eventdesk::not_found),
        help("Run: eventdesk {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Server error ({status}): {message}")]
    #[diagnostic(code(eventdesk::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected response: {message}")]
    #[diagnostic(code(eventdesk::unexpected_response))]
    UnexpectedResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(eventdesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(eventdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: eventdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(eventdesk::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(eventdesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(eventdesk::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(eventdesk::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NotSignedIn { .. } | Self::SessionExpired { .. } => {
                exit_code::AUTH
            }
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Name the profile in session errors raised below the CLI layer.
    pub fn for_profile(self, name: &str) -> Self {
        match self {
            Self::NotSignedIn { .. } => Self::NotSignedIn {
                profile: name.into(),
            },
            Self::SessionExpired { .. } => Self::SessionExpired {
                profile: name.into(),
            },
            other => other,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: crate::config::available_profiles(),
            },
            other => CliError::Config(other),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Network { reason } => CliError::ConnectionFailed { reason },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Server { status, message } => CliError::ApiError { status, message },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::SessionExpired => CliError::SessionExpired {
                profile: "current".into(),
            },

            CoreError::NotSignedIn => CliError::NotSignedIn {
                profile: "current".into(),
            },

            CoreError::Forbidden { message } => CliError::Forbidden { message },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command_for(&entity_type).into(),
                resource_type: entity_type,
                identifier,
            },

            CoreError::ValidationFailed { field, message } => CliError::Validation {
                field,
                reason: message,
            },

            CoreError::UnexpectedResponse { message } => CliError::UnexpectedResponse { message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

fn list_command_for(entity_type: &str) -> &'static str {
    match entity_type {
        "booking" => "bookings",
        "category" => "categories",
        _ => "events list",
    }
}
