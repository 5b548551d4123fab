#![allow(clippy::unwrap_used)]
// End-to-end tests for `App` against a wiremock backend.

use std::sync::Arc;

use chrono::Utc;
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hivefriends_api::{BEARER_TOKEN_KEY, USER_KEY};
use hivefriends_core::{
    App, AppConfig, CoreError, Environment, FeedEntry, MemoryStorage, RouteName, SessionState,
    SessionStorage, ToastKind,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, App, Arc<MemoryStorage>) {
    let server = MockServer::start().await;
    let mut config = AppConfig::for_environment(Environment::Development).unwrap();
    config.url = Url::parse(&server.uri()).unwrap();
    let storage = Arc::new(MemoryStorage::new());
    let app = App::new(config, storage.clone()).unwrap();
    (server, app, storage)
}

fn user_json(key: &str, username: &str, display: Option<&str>) -> serde_json::Value {
    json!({
        "key": key,
        "username": username,
        "displayName": display,
        "met": [],
        "albumsUploaded": [],
        "createdAt": 1_650_000_000
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/login/"))
        .and(body_json(json!({ "username": "tmtu", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bearerToken": "tok-1",
            "userKey": "k-tmtu"
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/k-tmtu"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_json("k-tmtu", "tmtu", Some("Tommy"))),
        )
        .mount(server)
        .await;
}

fn password(p: &str) -> SecretString {
    SecretString::from(p.to_owned())
}

async fn signed_in() -> (MockServer, App, Arc<MemoryStorage>) {
    let (server, app, storage) = setup().await;
    mount_login(&server).await;
    app.sign_in("tmtu", &password("hunter2")).await.unwrap();
    (server, app, storage)
}

// ── Sign-in ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sign_in_persists_and_unlocks_navigation() {
    let (server, app, storage) = setup().await;
    mount_login(&server).await;

    let user = app.sign_in("tmtu", &password("hunter2")).await.unwrap();

    assert_eq!(user.display_name(), "Tommy");
    assert_eq!(app.session().state(), SessionState::Authenticated);
    assert_eq!(storage.get(BEARER_TOKEN_KEY).as_deref(), Some("tok-1"));
    assert!(storage.get(USER_KEY).unwrap().contains("k-tmtu"));
    assert!(!app.loading().is_loading(&["login"]));

    let route = app.navigate("/albums").await.unwrap();
    assert_eq!(route.name, RouteName::Albums);
    assert_eq!(app.navigator().login_redirects(), 0);
}

#[tokio::test]
async fn test_rejected_sign_in_toasts_and_stays_anonymous() {
    let (server, app, storage) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login/"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "error": "Invalid password" })),
        )
        .mount(&server)
        .await;

    let err = app.sign_in("tmtu", &password("nope")).await.unwrap_err();

    assert!(matches!(err, CoreError::AuthenticationFailed { ref message } if message == "Invalid password"));
    assert_eq!(app.session().state(), SessionState::Anonymous);
    assert!(storage.is_empty());

    let toasts = app.toasts().snapshot();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].kind, ToastKind::Error);
    assert!(toasts[0].text.contains("Invalid password"));
}

#[tokio::test]
async fn test_sign_in_401_does_not_redirect_from_login() {
    let (server, app, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = app.sign_in("tmtu", &password("nope")).await.unwrap_err();

    assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
    assert_eq!(app.navigator().login_redirects(), 0);
}

// ── Guarded navigation ──────────────────────────────────────────────

#[tokio::test]
async fn test_protected_route_without_token_redirects_to_login() {
    let (_server, app, storage) = setup().await;
    storage.set(USER_KEY, "{}").unwrap();

    let route = app.navigate("/settings").await.unwrap();

    assert_eq!(route.name, RouteName::Login);
    assert!(storage.get(USER_KEY).is_none());
    assert!(storage.get(BEARER_TOKEN_KEY).is_none());
}

#[tokio::test]
async fn test_public_link_with_session_promotes_to_private_album() {
    let (_server, app, _) = signed_in().await;

    let route = app.navigate("/public/album/a1/share-tok").await.unwrap();

    assert_eq!(route.name, RouteName::AlbumDetail);
    assert_eq!(route.param("id"), Some("a1"));
    assert!(app.session().public_token().is_none());
    assert_eq!(app.session().state(), SessionState::Authenticated);
}

#[tokio::test]
async fn test_public_view_is_locked_in() {
    let (_server, app, _) = setup().await;

    let route = app.navigate("/public/album/a1/share-tok").await.unwrap();
    assert_eq!(route.name, RouteName::PublicAlbumDetail);
    assert_eq!(app.session().state(), SessionState::PublicView);

    let route = app.navigate("/albums").await.unwrap();
    assert_eq!(route.name, RouteName::PublicAlbumDetail);

    let route = app
        .navigate("/public/album/a1/image/i1/share-tok")
        .await
        .unwrap();
    assert_eq!(route.name, RouteName::PublicImageDetail);
}

#[tokio::test]
async fn test_login_redirects_signed_in_user_home() {
    let (_server, app, _) = signed_in().await;
    let route = app.navigate("/").await.unwrap();
    assert_eq!(route.name, RouteName::Home);
}

#[tokio::test]
async fn test_restored_session_hydrates_user_on_navigation() {
    let (server, app, storage) = setup().await;
    storage.set(BEARER_TOKEN_KEY, "tok-1").unwrap();
    storage
        .set(
            USER_KEY,
            &user_json("k-tmtu", "tmtu", None).to_string(),
        )
        .unwrap();

    Mock::given(method("GET"))
        .and(path("/api/users/k-tmtu"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(user_json("k-tmtu", "tmtu", Some("Tommy"))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let route = app.navigate("/user/tmtu").await.unwrap();

    assert_eq!(route.name, RouteName::Profile);
    assert_eq!(app.session().user().unwrap().display_name(), "Tommy");
    assert_eq!(app.navigator().breadcrumb().label, "Tommy");
}

// ── 401 teardown ────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_tears_down_session_once() {
    let (server, app, storage) = signed_in().await;
    app.navigate("/albums").await.unwrap();

    Mock::given(method("GET"))
        .and(path("/api/albums/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = app.fetch_albums().await.unwrap_err();

    assert!(matches!(err, CoreError::SessionExpired));
    assert!(storage.is_empty());
    assert_eq!(app.session().state(), SessionState::Anonymous);
    assert_eq!(app.navigator().login_redirects(), 1);
    assert_eq!(app.navigator().current().name, RouteName::Login);
    assert!(app.toasts().is_empty());
}

fn restore_session(storage: &MemoryStorage) {
    storage.set(BEARER_TOKEN_KEY, "tok-1").unwrap();
    storage
        .set(USER_KEY, &user_json("k-tmtu", "tmtu", None).to_string())
        .unwrap();
}

#[tokio::test]
async fn test_rejected_restored_session_redirects_to_login() {
    let (server, app, storage) = setup().await;
    restore_session(&storage);

    Mock::given(method("GET"))
        .and(path("/api/users/k-tmtu"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let route = app.navigate("/albums").await.unwrap();

    assert_eq!(route.name, RouteName::Login);
    assert_eq!(app.navigator().current().name, RouteName::Login);
    assert_eq!(app.session().state(), SessionState::Anonymous);
    assert!(app.session().user().is_none());
    assert!(storage.is_empty());
}

#[tokio::test]
async fn test_unauthorized_on_login_route_tears_down_without_redirect() {
    let (server, app, storage) = setup().await;
    restore_session(&storage);
    assert!(app.hydrate());
    assert_eq!(app.session().state(), SessionState::Authenticated);

    Mock::given(method("GET"))
        .and(path("/api/albums/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = app.fetch_albums().await.unwrap_err();

    assert!(matches!(err, CoreError::SessionExpired));
    assert_eq!(app.session().state(), SessionState::Anonymous);
    assert!(app.session().user().is_none());
    assert!(storage.is_empty());
    assert_eq!(app.navigator().login_redirects(), 0);
    assert_eq!(app.navigator().current().name, RouteName::Login);

    let route = app.navigate("/albums").await.unwrap();
    assert_eq!(route.name, RouteName::Login);
}

#[tokio::test]
async fn test_concurrent_unauthorized_redirects_once() {
    let (server, app, storage) = signed_in().await;
    app.navigate("/albums").await.unwrap();

    Mock::given(method("GET"))
        .and(path("/api/albums/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    let (first, second) = tokio::join!(app.fetch_albums(), app.fetch_albums());

    assert!(first.is_err());
    assert!(second.is_err());
    assert!(storage.is_empty());
    assert_eq!(app.session().state(), SessionState::Anonymous);
    assert_eq!(app.navigator().login_redirects(), 1);
    assert_eq!(app.navigator().current().name, RouteName::Login);
}

// ── Stores ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_activity_failure_leaves_feed_untouched() {
    let (server, app, _) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/activity/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "image": { "key": "i1", "uploader": "tmtu", "uploadedAt": 1_650_024_000, "albumKeys": [] } },
            { "comment": { "id": 1, "author": "jokler", "albumKey": "a", "imageKey": "i1",
                           "createdAt": 1_650_024_100, "text": "@tmtu nice" } },
            { "image": { "key": "i2", "uploader": "tmtu", "uploadedAt": 1_650_024_200, "albumKeys": [] } }
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let days = app.fetch_activity_in(&Utc).await.unwrap();
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].entries.len(), 2);
    assert!(matches!(days[0].entries[0], FeedEntry::Item(_)));
    assert_eq!(days[0].entries[1].images().len(), 2);

    Mock::given(method("GET"))
        .and(path("/api/activity/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("db locked"))
        .mount(&server)
        .await;

    let err = app.fetch_activity_in(&Utc).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(app.store().activity().raw().len(), 3);
    assert_eq!(app.toasts().snapshot()[0].text, "db locked");
}

#[tokio::test]
async fn test_album_filters_feed_query() {
    let (server, app, _) = signed_in().await;
    app.store().filters().set("user", ["tmtu", "jokler"]);

    Mock::given(method("GET"))
        .and(path("/api/albums/"))
        .and(query_param("user", "tmtu,jokler"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "key": "a1", "title": "Amom", "author": "tmtu", "publishedAt": 1, "images": []
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let albums = app.fetch_albums().await.unwrap();
    assert_eq!(albums[0].title, "Amom");
}

#[tokio::test]
async fn test_share_album_builds_public_route() {
    let (server, app, _) = signed_in().await;

    Mock::given(method("POST"))
        .and(path("/api/albums/a1/share-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "s3" })))
        .mount(&server)
        .await;

    let link = app.share_album("a1").await.unwrap();
    assert_eq!(link.route.path, "/public/album/a1/s3");
}

#[tokio::test]
async fn test_comments_add_and_delete() {
    let (server, app, _) = signed_in().await;

    Mock::given(method("POST"))
        .and(path("/api/comments/a1/i1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9, "author": "tmtu", "albumKey": "a1", "imageKey": "i1",
            "createdAt": 1, "text": "hello"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/comments/a1/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9, "author": "tmtu", "albumKey": "a1", "imageKey": "i1",
            "createdAt": 1, "text": "hello"
        })))
        .mount(&server)
        .await;

    app.add_comment("a1", "i1", "hello").await.unwrap();
    assert_eq!(app.store().comments_snapshot().len(), 1);

    app.delete_comment("a1", 9).await.unwrap();
    assert!(app.store().comments_snapshot().is_empty());
    assert_eq!(app.toasts().snapshot()[0].text, "Successfully deleted comment");
}

#[tokio::test]
async fn test_set_setting_refreshes_users() {
    let (server, app, _) = signed_in().await;

    Mock::given(method("PUT"))
        .and(path("/api/settings/"))
        .and(body_json(json!({ "displayName": "T" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            user_json("k-tmtu", "tmtu", Some("T"))
        ])))
        .expect(1)
        .mount(&server)
        .await;

    app.set_setting("displayName", json!("T")).await.unwrap();

    assert_eq!(
        app.store().settings().unwrap().display_name.as_deref(),
        Some("T")
    );
    assert_eq!(app.store().users().display_name(Some("tmtu")), "T");
}

#[tokio::test]
async fn test_sign_out_clears_everything() {
    let (server, app, storage) = signed_in().await;

    Mock::given(method("GET"))
        .and(path("/api/activity/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "image": { "key": "i1", "uploader": "tmtu", "uploadedAt": 1_650_024_000, "albumKeys": [] } }
        ])))
        .mount(&server)
        .await;
    app.fetch_activity_in(&Utc).await.unwrap();
    assert_eq!(app.store().activity().days().len(), 1);

    app.sign_out();

    assert!(app.store().activity().raw().is_empty());
    assert!(app.store().activity().days().is_empty());
    assert!(storage.is_empty());
    assert_eq!(app.session().state(), SessionState::Anonymous);
    assert_eq!(app.navigator().current().name, RouteName::Login);
}
