//! CLI configuration: a thin layer over `hivefriends_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--url, --insecure, --timeout, --session-file).

use std::path::PathBuf;
use std::time::Duration;

use hivefriends_core::{AppConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use hivefriends_config::{Config, Profile, config_path, load_config_or_default, save_config};

/// The resolved configuration for one invocation.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub profile: Profile,
    pub app: AppConfig,
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Translate the active profile + global flags into an `AppConfig`.
///
/// A missing profile is only an error when one was asked for by name;
/// otherwise the build's default environment is used.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: cfg.profile_names(),
            });
        }
        None => Profile::default(),
    };

    let mut app = hivefriends_config::profile_to_app_config(&profile, &profile_name)?;

    // Flag > env > profile
    if let Some(ref raw) = global.url {
        app.url = url::Url::parse(raw).map_err(|_| CliError::Validation {
            field: "url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
    }
    if global.insecure {
        app.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        app.timeout = Duration::from_secs(secs);
    } else if profile.timeout.is_none() {
        app.timeout = Duration::from_secs(cfg.defaults.timeout);
    }

    Ok(Resolved {
        profile_name,
        profile,
        app,
    })
}

/// Where this invocation keeps its session.
pub fn session_path(global: &GlobalOpts) -> PathBuf {
    global
        .session_file
        .clone()
        .unwrap_or_else(hivefriends_config::session_path)
}
