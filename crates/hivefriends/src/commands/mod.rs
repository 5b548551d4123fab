//! Command dispatch: bridges CLI args -> `App` operations -> output.

pub mod activity;
pub mod albums;
pub mod auth;
pub mod comments;
pub mod config_cmd;
pub mod open;
pub mod settings;
pub mod upload;
pub mod users;
pub mod util;

use hivefriends_core::App;

use crate::cli::{Command, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;

/// Dispatch a backend-bound command to its handler, then surface any
/// toasts the app queued along the way.
pub async fn dispatch(
    cmd: Command,
    app: &App,
    resolved: &Resolved,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let result = match cmd {
        Command::Login(args) => auth::login(app, args, resolved, global).await,
        Command::Logout => auth::logout(app, global),
        Command::Whoami => auth::whoami(app, global).await,
        Command::Activity(args) => activity::handle(app, args, global).await,
        Command::Albums(args) => albums::handle(app, args, global).await,
        Command::Comments(args) => comments::handle(app, args, global).await,
        Command::Users(args) => users::handle(app, args, global).await,
        Command::Upload(args) => upload::handle(app, args, global).await,
        Command::Settings(args) => settings::handle(app, args, global).await,
        Command::Open(args) => open::handle(app, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Ok(()),
    };

    util::flush_toasts(app, global, result.is_err());
    result
}
