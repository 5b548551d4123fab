// Album endpoints
//
// Filters are passed through as a query string. The backend accepts
// comma-joined lists for multi-valued filters such as `user`.

use tracing::debug;

use crate::client::{ApiClient, Body};
use crate::error::Error;
use crate::models::{Album, CreatedAlbum, NewAlbum, ShareToken};

impl ApiClient {
    /// `GET /api/albums/{query}` where `query` comes from [`crate::make_query`].
    pub async fn list_albums(&self, query: &str) -> Result<Option<Vec<Album>>, Error> {
        self.get(&format!("/api/albums/{query}")).await
    }

    /// `GET /api/albums/{key}`
    pub async fn get_album(&self, key: &str) -> Result<Option<Album>, Error> {
        self.get(&format!("/api/albums/{key}")).await
    }

    /// `POST /api/albums/`
    pub async fn create_album(&self, album: &NewAlbum) -> Result<Option<CreatedAlbum>, Error> {
        debug!(title = %album.title, images = album.image_keys.len(), "creating album");
        self.post("/api/albums/", Body::json(album)?).await
    }

    /// `DELETE /api/albums/{key}`
    pub async fn delete_album(&self, key: &str) -> Result<(), Error> {
        debug!(key, "deleting album");
        let _: Option<serde_json::Value> = self.delete(&format!("/api/albums/{key}")).await?;
        Ok(())
    }

    /// Mint a share token granting anonymous read access to one album.
    ///
    /// `POST /api/albums/{key}/share-token`
    pub async fn create_share_token(&self, key: &str) -> Result<Option<ShareToken>, Error> {
        self.post(
            &format!("/api/albums/{key}/share-token"),
            serde_json::json!({}),
        )
        .await
    }

    /// `GET /api/public/albums/{key}/{token}`
    pub async fn get_public_album(&self, key: &str, token: &str) -> Result<Option<Album>, Error> {
        self.get(&format!("/api/public/albums/{key}/{token}")).await
    }
}
