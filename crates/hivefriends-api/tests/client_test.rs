#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hivefriends_api::{
    ActivityItem, ApiClient, BEARER_TOKEN_KEY, Error, LoginRedirect, MemoryStorage,
    RequestOptions, SessionStorage, USER_KEY,
};

// ── Helpers ─────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingRedirect {
    on_login: AtomicBool,
    expirations: AtomicUsize,
    redirects: AtomicUsize,
}

impl LoginRedirect for RecordingRedirect {
    fn session_expired(&self) {
        self.expirations.fetch_add(1, Ordering::SeqCst);
    }

    fn on_login_route(&self) -> bool {
        self.on_login.load(Ordering::SeqCst)
    }

    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

struct Harness {
    server: MockServer,
    client: ApiClient,
    storage: Arc<MemoryStorage>,
    redirect: Arc<RecordingRedirect>,
}

async fn setup() -> Harness {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStorage::new());
    let redirect = Arc::new(RecordingRedirect::default());
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        storage.clone(),
    )
    .with_redirect(redirect.clone());
    Harness {
        server,
        client,
        storage,
        redirect,
    }
}

fn user_json(username: &str) -> serde_json::Value {
    json!({
        "key": format!("key-{username}"),
        "username": username,
        "displayName": null,
        "met": [],
        "albumsUploaded": [],
        "createdAt": 1_650_000_000
    })
}

// ── Authorization header ────────────────────────────────────────────

#[tokio::test]
async fn test_bearer_token_read_fresh_per_request() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/users/"))
        .and(header("authorization", "Bearer first"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([user_json("tmtu")])))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/"))
        .and(header("authorization", "Bearer second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    h.storage.set(BEARER_TOKEN_KEY, "first").unwrap();
    let users = h.client.list_users().await.unwrap().unwrap();
    assert_eq!(users.len(), 1);

    h.storage.set(BEARER_TOKEN_KEY, "second").unwrap();
    let users = h.client.list_users().await.unwrap().unwrap();
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_no_token_sends_no_authorization() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/activity/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&h.server)
        .await;

    let _ = h.client.get_activity().await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

// ── 401 handling ────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects_once() {
    let h = setup().await;
    h.storage.set(BEARER_TOKEN_KEY, "stale").unwrap();
    h.storage.set(USER_KEY, "{}").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/albums/abc"))
        .respond_with(ResponseTemplate::new(401).set_body_string("expired"))
        .mount(&h.server)
        .await;

    let album = h.client.get_album("abc").await.unwrap();

    assert!(album.is_none());
    assert!(h.storage.get(BEARER_TOKEN_KEY).is_none());
    assert!(h.storage.get(USER_KEY).is_none());
    assert_eq!(h.redirect.expirations.load(Ordering::SeqCst), 1);
    assert_eq!(h.redirect.redirects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_unauthorized_on_login_route_does_not_redirect() {
    let h = setup().await;
    h.redirect.on_login.store(true, Ordering::SeqCst);
    h.storage.set(BEARER_TOKEN_KEY, "stale").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/login/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let resp = h
        .client
        .login("tmtu", &"wrong".to_owned().into())
        .await
        .unwrap();

    assert!(resp.is_none());
    assert!(h.storage.get(BEARER_TOKEN_KEY).is_none());
    assert_eq!(h.redirect.expirations.load(Ordering::SeqCst), 1);
    assert_eq!(h.redirect.redirects.load(Ordering::SeqCst), 0);
}

// ── Error normalization ─────────────────────────────────────────────

#[tokio::test]
async fn test_non_json_error_body_becomes_message() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/settings/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<h1>Bad Gateway</h1>"))
        .mount(&h.server)
        .await;

    let err = h.client.get_settings().await.unwrap_err();

    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "<h1>Bad Gateway</h1>");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_json_error_message_extracted() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/albums/"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "Invalid cover key" })),
        )
        .mount(&h.server)
        .await;

    let err = h
        .client
        .create_album(&hivefriends_api::NewAlbum {
            title: "Amom".into(),
            cover_key: "nope".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "API error (HTTP 400): Invalid cover key");
}

#[tokio::test]
async fn test_non_200_success_status_is_an_error() {
    let h = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/albums/abc"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&h.server)
        .await;

    let err = h.client.delete_album("abc").await.unwrap_err();
    assert_eq!(err.status(), Some(204));
}

#[tokio::test]
async fn test_empty_200_body_is_none() {
    let h = setup().await;

    Mock::given(method("PUT"))
        .and(path("/api/settings/"))
        .and(body_json(json!({ "bio": "hello" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.server)
        .await;

    h.client.put_settings(json!({ "bio": "hello" })).await.unwrap();
}

// ── Bodies and options ──────────────────────────────────────────────

#[tokio::test]
async fn test_comment_text_sent_verbatim() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/comments/a1/i1/"))
        .and(body_string("hello @jokler"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "author": "tmtu",
            "albumKey": "a1",
            "imageKey": "i1",
            "createdAt": 1,
            "text": "hello @jokler"
        })))
        .mount(&h.server)
        .await;

    let comment = h
        .client
        .add_comment("a1", "i1", "hello @jokler")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(comment.id, 7);
}

#[tokio::test]
async fn test_send_merges_caller_options() {
    let h = setup().await;
    h.storage.set(BEARER_TOKEN_KEY, "tok").unwrap();

    Mock::given(method("POST"))
        .and(path("/api/albums/"))
        .and(query_param("user", "tmtu"))
        .and(header("content-type", "text/plain"))
        .and(header("x-trace", "1"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "key": "new" })))
        .expect(1)
        .mount(&h.server)
        .await;

    let options = RequestOptions::default()
        .header("Content-Type", "text/plain")
        .header("X-Trace", "1")
        .query("user", "tmtu");
    let created: Option<serde_json::Value> = h
        .client
        .send(Method::POST, "/api/albums/", Some("raw".into()), options)
        .await
        .unwrap();

    assert_eq!(created, Some(json!({ "key": "new" })));
}

#[tokio::test]
async fn test_album_query_string_passed_through() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/albums/"))
        .and(query_param("user", "tmtu,jokler"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;

    let query = hivefriends_api::make_query([("user", "tmtu,jokler")]);
    let albums = h.client.list_albums(&query).await.unwrap().unwrap();
    assert!(albums.is_empty());
}

#[tokio::test]
async fn test_upload_image_returns_key() {
    let h = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/images/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "key": "img-1" })))
        .expect(1)
        .mount(&h.server)
        .await;

    let uploaded = h
        .client
        .upload_image("beach.jpg", vec![0xFF, 0xD8, 0xFF])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(uploaded.key, "img-1");

    let requests = h.server.received_requests().await.unwrap();
    let content_type = requests[0].headers["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
}

// ── Typed payloads ──────────────────────────────────────────────────

#[tokio::test]
async fn test_activity_feed_parses_variants() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/activity/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "user": user_json("northcode") },
            { "image": { "key": "i1", "uploader": "tmtu", "uploadedAt": 5, "albumKeys": [] } }
        ])))
        .mount(&h.server)
        .await;

    let items = h.client.get_activity().await.unwrap().unwrap();
    assert!(matches!(items[0], ActivityItem::User(_)));
    assert!(items[1].is_image());
}

#[tokio::test]
async fn test_unknown_activity_variant_is_deserialization_error() {
    let h = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/activity/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "poll": {} }])))
        .mount(&h.server)
        .await;

    let err = h.client.get_activity().await.unwrap_err();
    assert!(matches!(err, Error::Deserialization { .. }));
}

#[tokio::test]
async fn test_base_url_path_prefix_preserved() {
    let server = MockServer::start().await;
    let client = ApiClient::with_client(
        reqwest::Client::new(),
        Url::parse(&format!("{}/friends/", server.uri())).unwrap(),
        Arc::new(MemoryStorage::new()),
    );

    Mock::given(method("GET"))
        .and(path("/friends/api/users/u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("tmtu")))
        .expect(1)
        .mount(&server)
        .await;

    let user = client.get_user("u1").await.unwrap().unwrap();
    assert_eq!(user.display_name(), "tmtu");
}
