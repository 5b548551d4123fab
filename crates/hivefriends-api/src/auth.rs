// Login endpoint
//
// The backend exchanges a username and password for an opaque bearer
// token. Persisting the token is the session layer's job; this only
// performs the exchange.

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::client::{ApiClient, Body};
use crate::error::Error;
use crate::models::{LoginRequest, LoginResponse};

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// `POST /api/login/`
    ///
    /// Resolves `Ok(None)` when the backend answers 401.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Option<LoginResponse>, Error> {
        debug!(username, "logging in");
        let body = Body::json(&LoginRequest {
            username,
            password: password.expose_secret(),
        })?;
        self.post("/api/login/", body).await
    }
}
