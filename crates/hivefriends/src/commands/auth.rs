//! Session command handlers: login, logout, whoami.

use std::io::IsTerminal;

use secrecy::{ExposeSecret, SecretString};

use hivefriends_core::App;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::Resolved;
use crate::error::{CliError, prompt_err};
use crate::output;

use super::util;

// ── Login ────────────────────────────────────────────────────────────

pub async fn login(
    app: &App,
    args: LoginArgs,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let stored = app.config().credentials.as_ref();

    // Flag > profile > prompt
    let username = match args
        .username
        .or_else(|| stored.map(|c| c.username.clone()))
    {
        Some(name) => name,
        None if std::io::stdin().is_terminal() => dialoguer::Input::<String>::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?,
        None => {
            return Err(CliError::NoCredentials {
                profile: resolved.profile_name.clone(),
            });
        }
    };

    // A stored password only belongs to the stored username.
    let password = match stored.filter(|c| c.username == username) {
        Some(creds) => creds.password.clone(),
        None => SecretString::from(rpassword::prompt_password("Password: ").map_err(prompt_err)?),
    };

    let progress = output::spinner(global, "Signing in...");
    let result = app.sign_in(&username, &password).await;
    progress.finish_and_clear();
    let user = result?;

    if args.save_password {
        hivefriends_config::store_password(&resolved.profile_name, password.expose_secret())?;
        output::success(
            global,
            &format!(
                "Password stored in system keyring for profile '{}'",
                resolved.profile_name
            ),
        );
    }

    output::success(global, &format!("Signed in as {}", user.display_name()));
    Ok(())
}

// ── Logout ───────────────────────────────────────────────────────────

pub fn logout(app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    let name = app.session().user().map(|u| u.display_name().to_owned());
    app.sign_out();
    match name {
        Some(name) => output::success(global, &format!("Signed out {name}")),
        None => output::success(global, "No stored session"),
    }
    Ok(())
}

// ── Whoami ───────────────────────────────────────────────────────────

pub async fn whoami(app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_session(app)?;
    let key = app
        .session()
        .user()
        .map(|u| u.key.clone())
        .ok_or(CliError::NotSignedIn)?;

    let progress = output::spinner(global, "Loading profile...");
    let result = app.fetch_user(&key).await;
    progress.finish_and_clear();
    let user = result?;

    let color = output::should_color(global.color);
    let out = output::render_single(
        global.output,
        user.as_ref(),
        |u| util::user_detail(u, color),
        |u| u.username.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
