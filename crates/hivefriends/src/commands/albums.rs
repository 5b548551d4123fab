//! Album command handlers.

use std::sync::Arc;

use tabled::Tabled;

use hivefriends_core::{
    Album, App, FieldValue, FormValidator, NewAlbum, Rule, compose, rules,
};

use crate::cli::{AlbumsArgs, AlbumsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

/// Image keys per row in the album detail view.
const IMAGE_COLUMNS: usize = 3;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlbumRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Author")]
    author: String,
    #[tabled(rename = "Images")]
    images: usize,
    #[tabled(rename = "Published")]
    published: String,
    #[tabled(rename = "Draft")]
    draft: String,
}

fn album_row(app: &App, a: &Arc<Album>) -> AlbumRow {
    AlbumRow {
        key: a.key.clone(),
        title: a.title.clone(),
        author: util::label(app, &a.author),
        images: a.images.len(),
        published: output::timestamp(a.published_at),
        draft: if a.draft { "yes".into() } else { String::new() },
    }
}

fn album_detail(app: &App, a: &Album, color: bool) -> String {
    let mut lines = vec![a.title.clone()];
    if let Some(ref description) = a.description {
        lines.push(description.clone());
    }
    lines.push(String::new());
    lines.push(format!("Key:       {}", a.key));
    lines.push(format!("Author:    {}", util::label(app, &a.author)));
    lines.push(format!("Published: {}", output::timestamp(a.published_at)));
    if !a.tagged_users.is_empty() {
        let tagged: Vec<String> = a.tagged_users.iter().map(|u| util::label(app, u)).collect();
        lines.push(format!("Tagged:    {}", tagged.join(", ")));
    }
    lines.push(format!("Images:    {}", a.images.len()));

    let keys: Vec<&str> = a.images.iter().map(|i| i.key.as_str()).collect();
    let columns = compose::chunk(&keys, IMAGE_COLUMNS);
    let rows = columns.first().map_or(0, Vec::len);
    for row in 0..rows {
        let cells: Vec<String> = columns
            .iter()
            .filter_map(|col| col.get(row))
            .map(|key| {
                let marker = if a.cover_key.as_deref() == Some(*key) { "*" } else { " " };
                format!("{marker}{key}")
            })
            .collect();
        lines.push(format!("  {}", output::dim(&cells.join("  "), color)));
    }
    lines.join("\n")
}

/// Check a new album before sending it.
async fn validate_new_album(album: &NewAlbum) -> Result<(), CliError> {
    let images = album.image_keys.clone();
    let mut form = FormValidator::new([
        ("title", FieldValue::from(album.title.as_str())),
        ("images", FieldValue::from(album.image_keys.clone())),
        ("cover", FieldValue::from(album.cover_key.as_str())),
    ])
    .rule("title", rules::required())
    .rule("title", rules::max_length(255))
    .rule("images", rules::required())
    .rule(
        "cover",
        Rule::new("cover", "Cover must be one of the album's images", move |v| {
            v.as_text().is_some_and(|k| images.iter().any(|i| i == k))
        }),
    );

    form.validate()
        .await
        .map_err(|e| CliError::from(hivefriends_core::CoreError::from(e)))
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(app: &App, args: AlbumsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(global.color);

    match args.command {
        AlbumsCommand::List { user, filter } => {
            util::require_session(app)?;
            let filters = app.store().filters();
            filters.reset();
            if !user.is_empty() {
                filters.set("user", user);
            }
            for raw in &filter {
                let (key, value) = util::parse_filter(raw)?;
                filters.set(&key, [value]);
            }

            let progress = output::spinner(global, "Loading albums...");
            let (albums, ()) = tokio::join!(app.fetch_albums(), util::load_users(app));
            progress.finish_and_clear();
            let albums = albums?;

            let out = output::render_list(
                global.output,
                albums.as_slice(),
                |a| album_row(app, a),
                |a| a.key.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlbumsCommand::Show { key, token } => {
            let progress = output::spinner(global, "Loading album...");
            let result = match token {
                Some(token) => app.fetch_public_album(&key, &token).await,
                None => {
                    util::require_session(app)?;
                    let (album, ()) = tokio::join!(app.fetch_album(&key), util::load_users(app));
                    album
                }
            };
            progress.finish_and_clear();
            let album = result?;

            let out = output::render_single(
                global.output,
                album.as_ref(),
                |a| album_detail(app, a, color),
                |a| a.key.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlbumsCommand::Create {
            title,
            description,
            images,
            cover,
            tagged,
            draft,
        } => {
            util::require_session(app)?;
            let cover_key = cover
                .or_else(|| images.first().cloned())
                .unwrap_or_default();
            let album = NewAlbum {
                title,
                description,
                cover_key,
                image_keys: images,
                tagged_users: tagged,
                draft,
                ..NewAlbum::default()
            };
            validate_new_album(&album).await?;

            let key = app.create_album(&album).await?;
            if global.quiet {
                return Ok(());
            }
            println!("{key}");
            output::success(global, &format!("Created album \"{}\"", album.title));
            Ok(())
        }

        AlbumsCommand::Share { key } => {
            util::require_session(app)?;
            let link = app.share_album(&key).await?;
            let url = app
                .config()
                .url
                .join(link.route.path.trim_start_matches('/'))
                .map_or_else(|_| link.route.path.clone(), |u| u.to_string());

            let out = output::render_single(
                global.output,
                &serde_json::json!({ "token": link.token, "path": link.route.path, "url": url }),
                |_| url.clone(),
                |_| url.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlbumsCommand::Delete { key } => {
            util::require_session(app)?;
            if !util::confirm(
                &format!("Delete album '{key}'? This cannot be undone."),
                global.yes,
            )? {
                return Ok(());
            }
            app.delete_album(&key).await?;
            Ok(())
        }
    }
}
