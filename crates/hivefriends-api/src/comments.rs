// Comment endpoints

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::Comment;

impl ApiClient {
    /// `GET /api/comments/{album}/{image}/`
    pub async fn list_comments(
        &self,
        album_key: &str,
        image_key: &str,
    ) -> Result<Option<Vec<Comment>>, Error> {
        self.get(&format!("/api/comments/{album_key}/{image_key}/"))
            .await
    }

    /// Post a comment. The body is the comment text itself, not a JSON object.
    ///
    /// `POST /api/comments/{album}/{image}/`
    pub async fn add_comment(
        &self,
        album_key: &str,
        image_key: &str,
        text: &str,
    ) -> Result<Option<Comment>, Error> {
        debug!(album_key, image_key, "posting comment");
        self.post(&format!("/api/comments/{album_key}/{image_key}/"), text)
            .await
    }

    /// `DELETE /api/comments/{album}/{id}`
    pub async fn delete_comment(&self, album_key: &str, id: i64) -> Result<Option<Comment>, Error> {
        debug!(album_key, id, "deleting comment");
        self.delete(&format!("/api/comments/{album_key}/{id}")).await
    }

    /// `GET /api/public/comments/{album}/{image}/{token}`
    pub async fn list_public_comments(
        &self,
        album_key: &str,
        image_key: &str,
        token: &str,
    ) -> Result<Option<Vec<Comment>>, Error> {
        self.get(&format!(
            "/api/public/comments/{album_key}/{image_key}/{token}"
        ))
        .await
    }
}
