//! User command handlers.

use std::sync::Arc;

use tabled::Tabled;

use hivefriends_core::{App, CoreError, User};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Albums")]
    albums: usize,
    #[tabled(rename = "Met")]
    met: usize,
}

impl From<&Arc<User>> for UserRow {
    fn from(u: &Arc<User>) -> Self {
        Self {
            username: u.username.clone(),
            name: u.display_name().to_owned(),
            country: u.country.clone().unwrap_or_default(),
            albums: u.albums_uploaded.len(),
            met: u.met.len(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(app: &App, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_session(app)?;

    let progress = output::spinner(global, "Loading users...");
    let result = app.fetch_users().await;
    progress.finish_and_clear();
    let users = result?;

    match args.command {
        UsersCommand::List => {
            let out = output::render_list(
                global.output,
                users.as_slice(),
                |u| UserRow::from(u),
                |u| u.username.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Show { name } => {
            let known = app
                .store()
                .users()
                .get_user(&name)
                .ok_or_else(|| CoreError::NotFound {
                    entity_type: "user".into(),
                    identifier: name.clone(),
                })?;
            let user = app.fetch_profile(&known.key).await?;

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
    }
}
