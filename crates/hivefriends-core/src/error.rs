// ── Core error types ──
//
// User-facing errors from hivefriends-core. Consumers never see raw
// transport failures or JSON parse errors; the `From<hivefriends_api::Error>`
// impl translates them into domain variants.

use thiserror::Error;

use crate::validation::ValidationErrors;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The server answered 401. The persisted session has already been
    /// cleared by the time this is returned.
    #[error("Session expired, sign in again")]
    SessionExpired,

    #[error("Not signed in")]
    NotSignedIn,

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach hivefriends at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    Timeout,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    /// An activity timestamp outside the representable date range.
    #[error("Invalid timestamp: {timestamp}")]
    InvalidTimestamp { timestamp: i64 },

    #[error("Unknown route: {name}")]
    UnknownRoute { name: String },

    #[error("Missing route parameter '{param}' for {route}")]
    MissingRouteParam { route: String, param: String },

    #[error("Navigation stopped after {hops} redirects")]
    RedirectLoop { hops: usize },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("{message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration / storage ──────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Session storage error: {message}")]
    Storage { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// HTTP status of the underlying server response, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => *status,
            Self::SessionExpired => Some(401),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for CoreError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<hivefriends_api::Error> for CoreError {
    fn from(err: hivefriends_api::Error) -> Self {
        match err {
            hivefriends_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            hivefriends_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.origin().ascii_serialization())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            hivefriends_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            hivefriends_api::Error::Client(message) => CoreError::Config { message },
            hivefriends_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Unexpected response: {message}"))
            }
            hivefriends_api::Error::Serialization(e) => {
                CoreError::Internal(format!("Serialization error: {e}"))
            }
            hivefriends_api::Error::Storage(message) => CoreError::Storage { message },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_keeps_server_message() {
        let err: CoreError = hivefriends_api::Error::Api {
            status: 400,
            message: "Invalid cover key".into(),
        }
        .into();

        assert_eq!(err.to_string(), "Invalid cover key");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn storage_error_maps_to_storage_variant() {
        let err: CoreError = hivefriends_api::Error::Storage("disk full".into()).into();
        assert!(matches!(err, CoreError::Storage { .. }));
    }
}
