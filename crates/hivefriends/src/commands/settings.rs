//! Account settings handlers.

use secrecy::{ExposeSecret, SecretString};

use hivefriends_core::{App, CoreError, FieldValue, FormValidator, Rule, Settings, rules};

use crate::cli::{GlobalOpts, SettingsArgs, SettingsCommand};
use crate::error::{CliError, prompt_err};
use crate::output;

use super::util;

/// Minimum length accepted for a new password.
const MIN_PASSWORD_LEN: usize = 8;

fn settings_detail(s: &Settings) -> String {
    let rows = [
        ("Display name", s.display_name.as_deref()),
        ("Bio", s.bio.as_deref()),
        ("Avatar", s.avatar_key.as_deref()),
        ("Banner", s.banner_key.as_deref()),
        ("Accent color", s.accent_color.as_deref()),
        ("Featured album", s.featured_album_key.as_deref()),
        ("Color theme", s.color_theme.as_deref()),
    ];
    rows.iter()
        .map(|(label, value)| format!("{label:<15} {}", value.unwrap_or("-")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check the password form: both filled in, the new one long enough and
/// typed the same twice.
async fn validate_password_change(
    old: &SecretString,
    new: &SecretString,
    repeat: &SecretString,
) -> Result<(), CoreError> {
    let expected = new.expose_secret().to_owned();
    let mut form = FormValidator::new([
        ("old", FieldValue::from(old.expose_secret())),
        ("new", FieldValue::from(new.expose_secret())),
        ("repeat", FieldValue::from(repeat.expose_secret())),
    ])
    .rule("old", rules::required())
    .rule("new", rules::required())
    .rule("new", rules::min_length(MIN_PASSWORD_LEN))
    .rule(
        "repeat",
        Rule::new("match", "Passwords do not match", move |v| {
            v.as_text() == Some(expected.as_str())
        }),
    );
    form.validate().await?;
    Ok(())
}

pub async fn handle(app: &App, args: SettingsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_session(app)?;

    match args.command {
        SettingsCommand::Show => {
            let progress = output::spinner(global, "Loading settings...");
            let result = app.fetch_settings().await;
            progress.finish_and_clear();
            let settings = result?;

            let out = output::render_single(
                global.output,
                settings.as_ref(),
                settings_detail,
                |s| s.display_name.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SettingsCommand::Set { key, value } => {
            let value = util::parse_setting_value(&value);
            let progress = output::spinner(global, "Saving...");
            let result = app.set_setting(&key, value).await;
            progress.finish_and_clear();
            result?;
            output::success(global, &format!("Updated {key}"));
            Ok(())
        }

        SettingsCommand::Password => {
            let old = SecretString::from(
                rpassword::prompt_password("Current password: ").map_err(prompt_err)?,
            );
            let new = SecretString::from(
                rpassword::prompt_password("New password: ").map_err(prompt_err)?,
            );
            let repeat = SecretString::from(
                rpassword::prompt_password("Repeat new password: ").map_err(prompt_err)?,
            );
            validate_password_change(&old, &new, &repeat).await?;

            app.change_password(old.expose_secret(), new.expose_secret())
                .await?;
            Ok(())
        }
    }
}
