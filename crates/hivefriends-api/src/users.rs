// User and settings endpoints

use tracing::debug;

use crate::client::{ApiClient, Body};
use crate::error::Error;
use crate::models::{PasswordChange, Settings, User};

impl ApiClient {
    /// `GET /api/users/`
    pub async fn list_users(&self) -> Result<Option<Vec<User>>, Error> {
        self.get("/api/users/").await
    }

    /// `GET /api/users/{key}`
    pub async fn get_user(&self, key: &str) -> Result<Option<User>, Error> {
        self.get(&format!("/api/users/{key}")).await
    }

    /// `GET /api/settings/`
    pub async fn get_settings(&self) -> Result<Option<Settings>, Error> {
        self.get("/api/settings/").await
    }

    /// Write one or more settings.
    ///
    /// `PUT /api/settings/` with a partial object, e.g. `{"bio": "..."}`.
    pub async fn put_settings(&self, patch: serde_json::Value) -> Result<(), Error> {
        debug!(%patch, "updating settings");
        let _: Option<serde_json::Value> = self.put("/api/settings/", patch).await?;
        Ok(())
    }

    /// `PUT /api/settings/password` with `{"old": "...", "new": "..."}`
    pub async fn change_password(&self, old: &str, new: &str) -> Result<(), Error> {
        let body = Body::json(&PasswordChange { old, new })?;
        let _: Option<serde_json::Value> = self.put("/api/settings/password", body).await?;
        Ok(())
    }
}
