// hivefriends API HTTP client
//
// Wraps `reqwest::Client` with base-URL construction, bearer token
// injection, option merging, and response normalization. Endpoint groups
// (albums, comments, users, etc.) are inherent methods in sibling files so
// this module stays focused on transport mechanics.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, trace};
use url::Url;

use crate::error::Error;
use crate::storage::SessionStorage;
use crate::transport::TransportConfig;

/// Error bodies carry `message`; the auth extractors on the backend use `error`.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(alias = "error")]
    message: Option<String>,
}

// ── Login redirect hook ─────────────────────────────────────────────

/// Receives the teardown and login redirect the client triggers on a 401.
///
/// `session_expired` runs on every 401. The redirect is skipped when the
/// user is already on the login route, so a 401 on the login screen does
/// not bounce the user to the same screen again.
pub trait LoginRedirect: Send + Sync {
    /// Drop any in-memory session state. Storage is already cleared.
    fn session_expired(&self) {}

    fn on_login_route(&self) -> bool;

    fn redirect_to_login(&self);
}

/// Hook that ignores redirects. The default for a bare client.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRedirect;

impl LoginRedirect for NoRedirect {
    fn on_login_route(&self) -> bool {
        false
    }

    fn redirect_to_login(&self) {}
}

// ── Request body & options ──────────────────────────────────────────

/// Request payload: a JSON value, or a string sent verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(serde_json::Value),
    Raw(String),
}

impl Body {
    /// Serialize any value into a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    fn into_bytes(self) -> Result<Vec<u8>, Error> {
        match self {
            Self::Json(v) => Ok(serde_json::to_vec(&v)?),
            Self::Raw(s) => Ok(s.into_bytes()),
        }
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for Body {
    fn from(value: String) -> Self {
        Self::Raw(value)
    }
}

impl From<&str> for Body {
    fn from(value: &str) -> Self {
        Self::Raw(value.to_owned())
    }
}

/// Per-request overrides.
///
/// [`merge`](Self::merge) is a deep merge: header and query maps are merged
/// key by key with the overriding side winning, scalars are replaced only
/// when the override sets them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    headers: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
    timeout: Option<Duration>,
}

impl RequestOptions {
    /// Set a header. Names are case-insensitive and stored lowercased.
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn query_pairs(&self) -> &BTreeMap<String, String> {
        &self.query
    }

    pub fn merge(mut self, overrides: Self) -> Self {
        self.headers.extend(overrides.headers);
        self.query.extend(overrides.query);
        if overrides.timeout.is_some() {
            self.timeout = overrides.timeout;
        }
        self
    }
}

/// Build a `?key=value&...` query string, or an empty string for no pairs.
pub fn make_query<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in pairs {
        serializer.append_pair(key.as_ref(), value.as_ref());
        any = true;
    }
    if any {
        format!("?{}", serializer.finish())
    } else {
        String::new()
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// Async client for the hivefriends REST API.
///
/// Every request reads the bearer token from [`SessionStorage`] at send
/// time. Responses are normalized to `Result<Option<T>, Error>`:
///
/// - `200` with a body: `Ok(Some(T))`; with an empty body: `Ok(None)`
/// - `401`: the persisted session is cleared, the login redirect fires
///   (unless already on the login route), and the call yields `Ok(None)`
/// - anything else: `Err(Error::Api { status, message })`
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    storage: Arc<dyn SessionStorage>,
    redirect: Arc<dyn LoginRedirect>,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(
        base_url: Url,
        transport: &TransportConfig,
        storage: Arc<dyn SessionStorage>,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url, storage))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: Url,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            http,
            base_url,
            storage,
            redirect: Arc::new(NoRedirect),
        }
    }

    /// Install the hook that receives login redirects on 401.
    pub fn with_redirect(mut self, redirect: Arc<dyn LoginRedirect>) -> Self {
        self.redirect = redirect;
        self
    }

    /// The API origin.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The persisted session backing this client.
    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a path like `/api/albums/` onto the base URL, keeping any
    /// path prefix the base URL carries.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, Error> {
        self.send(Method::GET, path, None, RequestOptions::default())
            .await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<Body>,
    ) -> Result<Option<T>, Error> {
        self.send(Method::POST, path, Some(body.into()), RequestOptions::default())
            .await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<Body>,
    ) -> Result<Option<T>, Error> {
        self.send(Method::PUT, path, Some(body.into()), RequestOptions::default())
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, Error> {
        self.send(Method::DELETE, path, None, RequestOptions::default())
            .await
    }

    /// Send a request with caller overrides merged over the defaults.
    ///
    /// Requests with a body default to `Content-Type: application/json`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Body>,
        overrides: RequestOptions,
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("{method} {url}");

        let defaults = if body.is_some() {
            RequestOptions::default().header("content-type", "application/json")
        } else {
            RequestOptions::default()
        };
        let options = defaults.merge(overrides);

        let mut builder = self.authorize(self.http.request(method, url));
        builder = apply_options(builder, &options);
        if let Some(body) = body {
            builder = builder.body(body.into_bytes()?);
        }

        let resp = builder.send().await?;
        self.handle_response(resp).await
    }

    /// Upload a multipart form (image files).
    ///
    /// Content type is left to the form so the boundary is set correctly.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Option<T>, Error> {
        let url = self.url(path)?;
        debug!("POST (multipart) {url}");

        let resp = self
            .authorize(self.http.post(url))
            .multipart(form)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    // ── Internals ────────────────────────────────────────────────────

    /// Attach the bearer token read fresh from storage.
    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.storage.bearer_token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => {
                trace!("no bearer token persisted, sending unauthenticated");
                builder
            }
        }
    }

    /// Tear down the persisted session and hand off to the login redirect.
    fn expire_session(&self) {
        info!("received 401, clearing persisted session");
        self.storage.clear_session();
        self.redirect.session_expired();
        if !self.redirect.on_login_route() {
            self.redirect.redirect_to_login();
        }
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<Option<T>, Error> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Ok(None);
        }

        let text = resp.text().await?;

        if status != StatusCode::OK {
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(status, text),
            });
        }

        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&text)),
                body: text,
            })
    }
}

fn apply_options(
    mut builder: reqwest::RequestBuilder,
    options: &RequestOptions,
) -> reqwest::RequestBuilder {
    for (name, value) in &options.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    if !options.query.is_empty() {
        builder = builder.query(&options.query);
    }
    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }
    builder
}

/// `message` from a JSON error body, else the raw text, else the status reason.
fn error_message(status: StatusCode, text: String) -> String {
    if let Ok(ErrorBody { message: Some(message) }) = serde_json::from_str::<ErrorBody>(&text) {
        return message;
    }
    if text.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_owned();
    }
    text
}

fn preview(body: &str) -> &str {
    let end = body
        .char_indices()
        .nth(200)
        .map_or(body.len(), |(idx, _)| idx);
    &body[..end]
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn merge_keeps_defaults_and_lets_overrides_win() {
        let defaults = RequestOptions::default()
            .header("Content-Type", "application/json")
            .header("X-Client", "hivefriends")
            .query("draft", "false");
        let overrides = RequestOptions::default()
            .header("content-type", "text/plain")
            .query("user", "jokler")
            .timeout(Duration::from_secs(5));

        let merged = defaults.merge(overrides);

        assert_eq!(merged.headers()["content-type"], "text/plain");
        assert_eq!(merged.headers()["x-client"], "hivefriends");
        assert_eq!(merged.query_pairs().len(), 2);
        assert_eq!(merged.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn merge_without_timeout_keeps_existing() {
        let merged = RequestOptions::default()
            .timeout(Duration::from_secs(9))
            .merge(RequestOptions::default());
        assert_eq!(merged.timeout, Some(Duration::from_secs(9)));
    }

    #[test]
    fn query_string_encoding() {
        insta::assert_snapshot!(make_query([("draft", "true"), ("year", "2022")]), @"?draft=true&year=2022");
        assert_eq!(make_query([("q", "a b&c")]), "?q=a+b%26c");
        assert_eq!(make_query(Vec::<(String, String)>::new()), "");
    }

    #[test]
    fn error_message_prefers_json_message() {
        let msg = error_message(
            StatusCode::BAD_REQUEST,
            r#"{"message":"Missing title"}"#.into(),
        );
        assert_eq!(msg, "Missing title");
    }

    #[test]
    fn error_message_accepts_error_alias() {
        let msg = error_message(
            StatusCode::FORBIDDEN,
            r#"{"error":"Bearer token is invalid"}"#.into(),
        );
        assert_eq!(msg, "Bearer token is invalid");
    }

    #[test]
    fn error_message_falls_back_to_raw_text() {
        let msg = error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops".into());
        assert_eq!(msg, "<html>oops");
    }

    #[test]
    fn error_message_uses_reason_for_empty_body() {
        let msg = error_message(StatusCode::NOT_FOUND, String::new());
        assert_eq!(msg, "Not Found");
    }

    #[test]
    fn body_conversions() {
        assert_eq!(Body::from("hello"), Body::Raw("hello".into()));
        assert_eq!(
            Body::json(&serde_json::json!({"a": 1})).unwrap_or(Body::Raw(String::new())),
            Body::Json(serde_json::json!({"a": 1}))
        );
    }
}
