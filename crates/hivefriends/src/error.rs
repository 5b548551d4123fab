//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use hivefriends_config::ConfigError;
use hivefriends_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to hivefriends at {url}")]
    #[diagnostic(
        code(hivefriends::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             Reason: {reason}\n\
             Try: hivefriends --url <URL> whoami"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(hivefriends::timeout),
        help("Increase the timeout with --timeout or check the server's responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────
    #[error("Sign-in failed: {message}")]
    #[diagnostic(
        code(hivefriends::auth_failed),
        help("Check your username and password, then run: hivefriends login")
    )]
    AuthFailed { message: String },

    #[error("Not signed in")]
    #[diagnostic(code(hivefriends::not_signed_in), help("Run: hivefriends login"))]
    NotSignedIn,

    #[error("Your session has expired")]
    #[diagnostic(
        code(hivefriends::session_expired),
        help("The server rejected the stored token. Run: hivefriends login")
    )]
    SessionExpired,

    #[error("No username configured for profile '{profile}'")]
    #[diagnostic(
        code(hivefriends::no_credentials),
        help(
            "Pass --username, set HIVEFRIENDS_USERNAME, or run: hivefriends config init"
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(hivefriends::not_found),
        help("Run: hivefriends {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(hivefriends::api_error))]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    // ── Navigation ───────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(hivefriends::navigation),
        help("Known paths look like /albums, /album/<key>, /user/<name>")
    )]
    Navigation { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(hivefriends::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(hivefriends::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: hivefriends config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(
        code(hivefriends::config),
        help("Check the file printed by: hivefriends config path")
    )]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Prompt failed: {0}")]
    #[diagnostic(
        code(hivefriends::prompt),
        help("Use --yes (-y) and flags instead of prompts in non-interactive contexts.")
    )]
    Prompt(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(hivefriends::json))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    #[diagnostic(code(hivefriends::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. }
            | Self::NotSignedIn
            | Self::SessionExpired
            | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ApiError {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::Timeout => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::Prompt(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

/// Map a dialoguer / rpassword failure into a `CliError`.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Prompt(e.to_string())
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout => Self::Timeout,

            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::SessionExpired => Self::SessionExpired,
            CoreError::NotSignedIn => Self::NotSignedIn,

            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                list_command: format!("{entity_type}s list"),
                resource_type: entity_type,
                identifier,
            },

            CoreError::UnknownRoute { .. }
            | CoreError::MissingRouteParam { .. }
            | CoreError::RedirectLoop { .. } => Self::Navigation {
                message: err.to_string(),
            },

            CoreError::Validation(errors) => {
                let (field, reason) = errors
                    .invalid_fields()
                    .next()
                    .map(|(name, e)| {
                        (
                            name.to_owned(),
                            e.messages().collect::<Vec<_>>().join(", "),
                        )
                    })
                    .unwrap_or_else(|| ("input".into(), errors.to_string()));
                Self::Validation { field, reason }
            }

            CoreError::Api { message, status } => Self::ApiError { status, message },

            CoreError::InvalidTimestamp { .. }
            | CoreError::Config { .. }
            | CoreError::Storage { .. }
            | CoreError::Internal(_) => Self::Internal(err.to_string()),
        }
    }
}
