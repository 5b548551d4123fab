//! Shared helpers for command handlers.

use hivefriends_core::{App, SessionState, ToastKind, User};
use owo_colors::OwoColorize;

use crate::cli::GlobalOpts;
use crate::error::{CliError, prompt_err};
use crate::output;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Fail unless a session was restored or established.
pub fn require_session(app: &App) -> Result<(), CliError> {
    match app.session().state() {
        SessionState::Authenticated => Ok(()),
        _ => Err(CliError::NotSignedIn),
    }
}

/// Load the user directory so keys and usernames can be labelled.
/// A failure only costs nicer labels.
pub async fn load_users(app: &App) {
    if let Err(e) = app.fetch_users().await {
        tracing::debug!(error = %e, "user directory unavailable");
    }
}

/// Display label for a user referenced by key or username.
pub fn label(app: &App, who: &str) -> String {
    let users = app.store().users();
    users
        .by_key(who)
        .map_or_else(|| users.display_name(Some(who)), |u| u.display_name().to_owned())
}

/// Split a `key=value` filter argument.
pub fn parse_filter(raw: &str) -> Result<(String, String), CliError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(CliError::Validation {
            field: "filter".into(),
            reason: format!("expected KEY=VALUE, got '{raw}'"),
        }),
    }
}

/// A setting value: JSON when it parses, otherwise a plain string.
pub fn parse_setting_value(raw: &str) -> serde_json::Value {
    serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::String(raw.to_owned()))
}

/// Multi-line profile view shared by `whoami` and `users show`.
pub fn user_detail(user: &User, color: bool) -> String {
    let mut lines = vec![format!(
        "{} {}",
        user.display_name(),
        output::dim(&format!("@{}", user.username), color)
    )];
    lines.push(format!("Key:      {}", user.key));
    if let Some(ref bio) = user.bio {
        lines.push(format!("Bio:      {bio}"));
    }
    if let Some(ref country) = user.country {
        lines.push(format!("Country:  {country}"));
    }
    lines.push(format!("Joined:   {}", output::timestamp(user.created_at)));
    lines.push(format!("Albums:   {}", user.albums_uploaded.len()));
    if !user.met.is_empty() {
        lines.push(format!("Met:      {}", user.met.join(", ")));
    }
    lines.join("\n")
}

/// Print queued toasts to stderr.
///
/// Error toasts are skipped when the command itself failed, since the
/// error is reported on its own.
pub fn flush_toasts(app: &App, global: &GlobalOpts, failed: bool) {
    let color = output::should_color(global.color);
    for toast in app.toasts().drain() {
        match toast.kind {
            ToastKind::Error if !failed => {
                if color {
                    eprintln!("{} {}", "!".red(), toast.text);
                } else {
                    eprintln!("! {}", toast.text);
                }
            }
            ToastKind::Success => output::success(global, &toast.text),
            ToastKind::Info if !global.quiet => eprintln!("{}", toast.text),
            ToastKind::Error | ToastKind::Info => {}
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn filter_splits_on_first_equals() {
        assert_eq!(
            parse_filter("user=tmtu").unwrap(),
            ("user".to_owned(), "tmtu".to_owned())
        );
        assert_eq!(
            parse_filter("q=a=b").unwrap(),
            ("q".to_owned(), "a=b".to_owned())
        );
        assert!(parse_filter("user").is_err());
        assert!(parse_filter("=x").is_err());
    }

    #[test]
    fn setting_values_prefer_json() {
        assert_eq!(parse_setting_value("true"), serde_json::json!(true));
        assert_eq!(parse_setting_value("\"x\""), serde_json::json!("x"));
        assert_eq!(parse_setting_value("Tommy"), serde_json::json!("Tommy"));
    }
}
