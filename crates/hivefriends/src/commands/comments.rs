//! Comment command handlers.

use std::sync::Arc;

use tabled::Tabled;

use hivefriends_core::{App, Comment, compose};

use crate::cli::{CommentsArgs, CommentsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct CommentRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Posted")]
    posted: String,
    #[tabled(rename = "Comment")]
    text: String,
}

/// Comment text with known-user mentions highlighted.
pub fn highlight(app: &App, text: &str, color: bool) -> String {
    compose::format_mentions(text, app.store().users(), |original, _| {
        output::mention(original, color)
    })
    .into_owned()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(app: &App, args: CommentsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color);

    match args.command {
        CommentsCommand::List {
            album,
            image,
            token,
        } => {
            let progress = output::spinner(global, "Loading comments...");
            let result = match token {
                Some(token) => app.fetch_public_comments(&album, &image, &token).await,
                None => {
                    util::require_session(app)?;
                    let (comments, ()) =
                        tokio::join!(app.fetch_comments(&album, &image), util::load_users(app));
                    comments
                }
            };
            progress.finish_and_clear();
            let comments = result?;

            let out = output::render_list(
                global.output,
                comments.as_slice(),
                |c: &Arc<Comment>| CommentRow {
                    id: c.id,
                    author: util::label(app, &c.author),
                    posted: output::timestamp(c.created_at),
                    text: highlight(app, &c.text, color),
                },
                |c| c.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CommentsCommand::Add { album, image, text } => {
            util::require_session(app)?;
            let (comment, ()) = tokio::join!(
                app.add_comment(&album, &image, &text),
                util::load_users(app)
            );
            let comment = comment?;

            let mentioned = compose::mentions(&comment.text, app.store().users());
            let out = output::render_single(
                global.output,
                &comment,
                |c| format!("Comment {} posted", c.id),
                |c| c.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            if !mentioned.is_empty() && !global.quiet {
                eprintln!("Mentioned: {}", mentioned.join(", "));
            }
            Ok(())
        }

        CommentsCommand::Delete { album, id } => {
            util::require_session(app)?;
            if !util::confirm(&format!("Delete comment {id}?"), global.yes)? {
                return Ok(());
            }
            app.delete_comment(&album, id).await?;
            Ok(())
        }
    }
}
