// ── Runtime configuration ──
//
// These types describe *where* the backend lives and how to reach it.
// They never touch disk: the CLI builds an `AppConfig` from its profile
// layer and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;

/// Deployment the client talks to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    Development,
}

impl Environment {
    /// Environment baked in at build time through `HIVEFRIENDS_ENV`.
    pub fn from_build() -> Self {
        match option_env!("HIVEFRIENDS_ENV") {
            Some("development" | "dev") => Self::Development,
            _ => Self::Production,
        }
    }

    /// Default API origin for this environment.
    pub fn default_url(self) -> &'static str {
        match self {
            Self::Production => "https://friends.hivecom.net",
            Self::Development => "http://localhost:8080",
        }
    }
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development backends).
    DangerAcceptInvalid,
}

/// Username and password for a sign-in.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Configuration for one hivefriends backend.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API origin (e.g. `https://friends.hivecom.net`).
    pub url: Url,
    pub environment: Environment,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Credentials used by `sign_in` when none are passed explicitly.
    pub credentials: Option<Credentials>,
}

impl AppConfig {
    /// Defaults for the given environment.
    pub fn for_environment(environment: Environment) -> Result<Self, CoreError> {
        let url = Url::parse(environment.default_url()).map_err(|e| CoreError::Config {
            message: format!("invalid default URL: {e}"),
        })?;
        Ok(Self {
            url,
            environment,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            credentials: None,
        })
    }
}
