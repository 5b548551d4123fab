// Image upload endpoint

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::ImageUpload;

impl ApiClient {
    /// Upload raw image bytes under the given file name.
    ///
    /// `POST /api/images/` (multipart, field `file`)
    pub async fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<ImageUpload>, Error> {
        debug!(file_name, size = bytes.len(), "uploading image");
        let part = Part::bytes(bytes).file_name(file_name.to_owned());
        let form = Form::new().part("file", part);
        self.upload("/api/images/", form).await
    }

    /// Read a file from disk and upload it.
    pub async fn upload_image_file(&self, path: &Path) -> Result<Option<ImageUpload>, Error> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::Client(format!("failed to read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload");
        self.upload_image(file_name, bytes).await
    }
}
