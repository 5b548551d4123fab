//! Shared configuration for hivefriends tools.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! the persisted session location, and translation to
//! `hivefriends_core::AppConfig`. The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use hivefriends_core::{AppConfig, Credentials, Environment, TlsVerification};

/// Keyring service name under which profile passwords are stored.
pub const KEYRING_SERVICE: &str = "hivefriends";

/// Environment variable consulted for the password when a profile names none.
pub const PASSWORD_ENV: &str = "HIVEFRIENDS_PASSWORD";

/// Environment variable consulted for the username when a profile has none.
pub const USERNAME_ENV: &str = "HIVEFRIENDS_USERNAME";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the default profile, `"default"` when unset.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Comma-separated profile names for help text.
    pub fn profile_names(&self) -> String {
        let mut names: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        if names.is_empty() {
            return "(none)".into();
        }
        names.sort_unstable();
        names.join(", ")
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named backend profile.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// API origin. Defaults to the environment's URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// "production" or "development".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password in plaintext. Prefer the keyring or `password_env`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Name of an environment variable holding the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Profile {
    /// The profile's environment, or the build-time default.
    pub fn environment(&self) -> Result<Environment, ConfigError> {
        match self.environment.as_deref() {
            None => Ok(Environment::from_build()),
            Some(name) => Environment::from_str(name).map_err(|_| ConfigError::Validation {
                field: "environment".into(),
                reason: format!("expected 'production' or 'development', got '{name}'"),
            }),
        }
    }

    /// Username from the profile, falling back to `HIVEFRIENDS_USERNAME`.
    pub fn username(&self) -> Option<String> {
        self.username
            .clone()
            .or_else(|| std::env::var(USERNAME_ENV).ok())
            .filter(|u| !u.is_empty())
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("net", "hivecom", "hivefriends")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("hivefriends");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Where the persisted session (token + user record) lives.
pub fn session_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("session.json"),
        |dirs| dirs.data_dir().join("session.json"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file, layered over defaults and under
/// `HIVEFRIENDS_` environment variables (`__` separates nesting).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HIVEFRIENDS_").split("__"));

    Ok(figment.extract()?)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/password"),
    )?)
}

/// Resolve a password: env var, then system keyring, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env, or the well-known variable
    let env_name = profile.password_env.as_deref().unwrap_or(PASSWORD_ENV);
    if let Ok(val) = std::env::var(env_name) {
        return Ok(SecretString::from(val));
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Username + password if the profile names a user and a password resolves.
pub fn resolve_credentials(profile: &Profile, profile_name: &str) -> Option<Credentials> {
    let username = profile.username()?;
    match resolve_password(profile, profile_name) {
        Ok(password) => Some(Credentials { username, password }),
        Err(e) => {
            debug!(profile = profile_name, error = %e, "no stored password");
            None
        }
    }
}

/// Store a profile's password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(password)?;
    Ok(())
}

/// Remove a profile's password from the system keyring. Missing entries
/// are not an error.
pub fn delete_password(profile_name: &str) -> Result<(), ConfigError> {
    match keyring_entry(profile_name)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ── Translation ─────────────────────────────────────────────────────

/// Build an `AppConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_app_config(profile: &Profile, profile_name: &str) -> Result<AppConfig, ConfigError> {
    let environment = profile.environment()?;
    let mut config =
        AppConfig::for_environment(environment).map_err(|e| ConfigError::Validation {
            field: "environment".into(),
            reason: e.to_string(),
        })?;

    if let Some(ref raw) = profile.api_url {
        config.url = url::Url::parse(raw).map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
    }

    config.tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    config.timeout = Duration::from_secs(profile.timeout.unwrap_or_else(default_timeout));
    config.credentials = resolve_credentials(profile, profile_name);

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "local"

[profiles.local]
api_url = "http://localhost:9000"
environment = "development"
timeout = 5
"#,
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();

        assert_eq!(cfg.default_profile_name(), "local");
        assert_eq!(cfg.defaults.output, "table");
        let local = &cfg.profiles["local"];
        assert_eq!(local.api_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(local.timeout, Some(5));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile_name(), "default");
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.profile_names(), "(none)");
    }

    #[test]
    fn save_then_load_keeps_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_url: Some("https://friends.example.net".into()),
                username: Some("tmtu".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(!written.contains("password"));

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["default"].username.as_deref(), Some("tmtu"));
    }

    #[test]
    fn profile_translates_to_app_config() {
        let profile = Profile {
            api_url: Some("http://127.0.0.1:8080".into()),
            environment: Some("development".into()),
            insecure: Some(true),
            timeout: Some(7),
            ..Profile::default()
        };

        let config = profile_to_app_config(&profile, "test").unwrap();

        assert_eq!(config.url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.timeout, Duration::from_secs(7));
    }

    #[test]
    fn ca_cert_selects_custom_ca() {
        let profile = Profile {
            ca_cert: Some("/etc/ssl/hive.pem".into()),
            ..Profile::default()
        };
        let config = profile_to_app_config(&profile, "test").unwrap();
        assert_eq!(
            config.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/hive.pem"))
        );
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let profile = Profile {
            environment: Some("staging".into()),
            ..Profile::default()
        };
        let err = profile_to_app_config(&profile, "test").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "environment"));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let profile = Profile {
            api_url: Some("not a url".into()),
            ..Profile::default()
        };
        let err = profile_to_app_config(&profile, "test").unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));
    }
}
