//! Image upload handler.

use std::path::PathBuf;

use serde::Serialize;
use tabled::Tabled;

use hivefriends_core::App;

use crate::cli::{GlobalOpts, UploadArgs};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Serialize)]
struct Uploaded {
    file: PathBuf,
    key: String,
}

#[derive(Tabled)]
struct UploadRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Key")]
    key: String,
}

/// Uploads files one at a time, stopping at the first failure.
pub async fn handle(app: &App, args: UploadArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_session(app)?;

    let total = args.files.len();
    let mut uploaded = Vec::with_capacity(total);
    for (i, file) in args.files.into_iter().enumerate() {
        let progress = output::spinner(
            global,
            &format!("Uploading {} ({}/{total})...", file.display(), i + 1),
        );
        let result = app.upload_image(&file).await;
        progress.finish_and_clear();
        let key = result?;
        tracing::info!(file = %file.display(), key = %key, "image uploaded");
        uploaded.push(Uploaded { file, key });
    }

    let out = output::render_list(
        global.output,
        &uploaded,
        |u| UploadRow {
            file: u.file.display().to_string(),
            key: u.key.clone(),
        },
        |u| u.key.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
