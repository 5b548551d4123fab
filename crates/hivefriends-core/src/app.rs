// ── App facade ──
//
// Single entry point for consumers. Owns the API client, the session,
// the navigator, and the data store, and runs every fetch through the
// same sequence: mark loading, call the API, surface failures as toasts,
// then mutate the store only on success.

use std::path::Path;
use std::sync::Arc;

use chrono::{Local, TimeZone};
use hivefriends_api::transport::{TlsMode, TransportConfig};
use hivefriends_api::{
    Album, ApiClient, Comment, NewAlbum, SessionStorage, Settings, User, make_query,
};
use secrecy::SecretString;
use tracing::{debug, info, warn};

use crate::activity::DayGroup;
use crate::config::{AppConfig, TlsVerification};
use crate::error::CoreError;
use crate::guard::{self, Decision};
use crate::loading::LoadingSet;
use crate::navigator::Navigator;
use crate::router::{Route, RouteName};
use crate::session::{SessionContext, SessionState};
use crate::store::DataStore;
use crate::toast::ToastQueue;

/// Upper bound on guard redirects per navigation.
const MAX_REDIRECTS: usize = 4;

/// A freshly minted public link to an album.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ShareLink {
    pub token: String,
    pub route: Route,
}

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<AppInner>`.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

struct AppInner {
    config: AppConfig,
    api: ApiClient,
    session: Arc<SessionContext>,
    navigator: Arc<Navigator>,
    store: DataStore,
    loading: LoadingSet,
    toasts: ToastQueue,
}

impl App {
    /// Build the app around a persisted session store. Does not touch the
    /// network; call [`hydrate`](Self::hydrate) to restore a session.
    pub fn new(config: AppConfig, storage: Arc<dyn SessionStorage>) -> Result<Self, CoreError> {
        let session = Arc::new(SessionContext::new(storage.clone()));
        let navigator = Arc::new(Navigator::new(session.clone()));
        let api = ApiClient::new(config.url.clone(), &build_transport(&config), storage)?
            .with_redirect(navigator.clone());

        Ok(Self {
            inner: Arc::new(AppInner {
                config,
                api,
                store: DataStore::new(session.clone()),
                session,
                navigator,
                loading: LoadingSet::new(),
                toasts: ToastQueue::new(),
            }),
        })
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.inner.session
    }

    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.inner.navigator
    }

    pub fn store(&self) -> &DataStore {
        &self.inner.store
    }

    pub fn loading(&self) -> &LoadingSet {
        &self.inner.loading
    }

    pub fn toasts(&self) -> &ToastQueue {
        &self.inner.toasts
    }

    // ── Session lifecycle ────────────────────────────────────────────

    /// Restore a persisted session without a network round trip.
    pub fn hydrate(&self) -> bool {
        self.inner.session.hydrate()
    }

    /// Exchange credentials for a session, then load the user record.
    ///
    /// On rejection a toast is queued and the session returns to
    /// `Anonymous` with nothing else changed.
    pub async fn sign_in(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Arc<User>, CoreError> {
        let _loading = self.inner.loading.track("login");
        self.inner.session.begin_authentication();

        match self.authenticate(username, password).await {
            Ok(user) => Ok(user),
            Err(e) => {
                self.inner.session.abort_authentication();
                Err(self.report(e))
            }
        }
    }

    async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<Arc<User>, CoreError> {
        let login = match self.inner.api.login(username, password).await {
            Ok(Some(login)) => login,
            Ok(None) => {
                return Err(CoreError::AuthenticationFailed {
                    message: "invalid username or password".into(),
                });
            }
            Err(hivefriends_api::Error::Api { message, .. }) => {
                return Err(CoreError::AuthenticationFailed { message });
            }
            Err(e) => return Err(e.into()),
        };

        self.inner.session.store_token(&login.bearer_token)?;

        let user = match self.inner.api.get_user(&login.user_key).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.inner.session.storage().clear_session();
                return Err(CoreError::AuthenticationFailed {
                    message: "token rejected while loading user".into(),
                });
            }
            Err(e) => {
                self.inner.session.storage().clear_session();
                return Err(e.into());
            }
        };

        self.inner.session.set_user(user)?;
        self.inner.session.user().ok_or(CoreError::NotSignedIn)
    }

    /// Forget the session, persisted and in memory.
    pub fn sign_out(&self) {
        self.inner.session.sign_out();
        self.inner.store.clear();
        self.inner
            .navigator
            .commit(Route::login(), |name| name.to_owned());
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Navigate to `path` through the route guard.
    ///
    /// Returns the route navigation settled on, which differs from the
    /// target when the guard redirected.
    pub async fn navigate(&self, path: &str) -> Result<Route, CoreError> {
        let mut to = Route::resolve(path);

        for _ in 0..MAX_REDIRECTS {
            let from = self.inner.navigator.current();
            let decision = guard::evaluate(&to, &from, &self.inner.session.snapshot())?;
            debug!(to = %to, ?decision, "guard decision");

            match decision {
                Decision::Proceed => return Ok(self.commit(to)),
                Decision::ProceedPublic { token } => {
                    self.inner.session.enter_public_view(&token);
                    return Ok(self.commit(to));
                }
                Decision::ProceedAfterHydrate => {
                    if !self.inner.session.hydrate() {
                        to = Route::login();
                        continue;
                    }
                    if let Some(user) = self.inner.session.user() {
                        // Failures are already toasted; navigation continues.
                        let _ = self.fetch_user(&user.key).await;
                    }
                    if !self.inner.session.snapshot().has_credentials() {
                        self.inner.store.clear();
                        to = Route::login();
                        continue;
                    }
                    return Ok(self.commit(to));
                }
                Decision::Promote(route) => {
                    info!(to = %route, "promoting public view to signed-in view");
                    self.inner.session.leave_public_view();
                    to = route;
                }
                Decision::LockIn(route) => return Ok(self.commit(route)),
                Decision::RequireLogin => {
                    self.inner.session.expire();
                    self.inner.store.clear();
                    to = Route::login();
                }
                Decision::AlreadySignedIn(route) => to = route,
            }
        }

        Err(CoreError::RedirectLoop {
            hops: MAX_REDIRECTS,
        })
    }

    fn commit(&self, route: Route) -> Route {
        let users = self.inner.store.users();
        self.inner
            .navigator
            .commit(route, |name| users.display_name(Some(name)))
    }

    // ── Users ────────────────────────────────────────────────────────

    /// Refresh the signed-in user's record and persist it.
    pub async fn fetch_user(&self, key: &str) -> Result<Arc<User>, CoreError> {
        let _loading = self.inner.loading.track("user");
        let resp = self.inner.api.get_user(key).await;
        let user = self.body(resp)?;
        if let Err(e) = self.inner.session.set_user(user) {
            return Err(self.report(e));
        }
        self.inner.session.user().ok_or(CoreError::NotSignedIn)
    }

    /// Load another user's profile into the directory.
    pub async fn fetch_profile(&self, key: &str) -> Result<Arc<User>, CoreError> {
        let _loading = self.inner.loading.track("user");
        let resp = self.inner.api.get_user(key).await;
        let user = self.body(resp)?;
        self.inner.store.users.upsert(user);
        self.inner
            .store
            .users()
            .by_key(key)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "user".into(),
                identifier: key.to_owned(),
            })
    }

    pub async fn fetch_users(&self) -> Result<Arc<Vec<Arc<User>>>, CoreError> {
        let _loading = self.inner.loading.track("users");
        let resp = self.inner.api.list_users().await;
        let users = self.body(resp)?;
        self.inner.store.users.replace(users);
        Ok(self.inner.store.users().snapshot())
    }

    // ── Activity ─────────────────────────────────────────────────────

    /// Fetch the activity feed and group it by local day.
    pub async fn fetch_activity(&self) -> Result<Arc<Vec<DayGroup>>, CoreError> {
        self.fetch_activity_in(&Local).await
    }

    /// [`fetch_activity`](Self::fetch_activity) with an explicit time zone.
    pub async fn fetch_activity_in<Tz: TimeZone>(
        &self,
        tz: &Tz,
    ) -> Result<Arc<Vec<DayGroup>>, CoreError> {
        let _loading = self.inner.loading.track("activity");
        let resp = self.inner.api.get_activity().await;
        let items = self.body(resp)?;
        if let Err(e) = self.inner.store.activity.replace(items, tz) {
            return Err(self.report(e));
        }
        Ok(self.inner.store.activity().days())
    }

    // ── Albums ───────────────────────────────────────────────────────

    /// List albums matching the active filters.
    pub async fn fetch_albums(&self) -> Result<Arc<Vec<Arc<Album>>>, CoreError> {
        let _loading = self.inner.loading.track("albums");
        let query = make_query(self.inner.store.filters().query_pairs());
        let resp = self.inner.api.list_albums(&query).await;
        let albums = self.body(resp)?;
        self.inner.store.albums.replace(albums);
        Ok(self.inner.store.albums_snapshot())
    }

    pub async fn fetch_album(&self, key: &str) -> Result<Arc<Album>, CoreError> {
        let _loading = self.inner.loading.track("album");
        let resp = self.inner.api.get_album(key).await;
        let album = self.body(resp)?;
        self.inner.store.upsert_album(album);
        self.stored_album(key)
    }

    /// Fetch an album through a public share token.
    pub async fn fetch_public_album(&self, key: &str, token: &str) -> Result<Arc<Album>, CoreError> {
        let _loading = self.inner.loading.track("album");
        match self.inner.api.get_public_album(key, token).await {
            Ok(Some(album)) => {
                self.inner.store.upsert_album(album);
                self.stored_album(key)
            }
            Ok(None) => Err(self.report(CoreError::AuthenticationFailed {
                message: "share link is invalid or has expired".into(),
            })),
            Err(e) => Err(self.report(e.into())),
        }
    }

    pub async fn create_album(&self, album: &NewAlbum) -> Result<String, CoreError> {
        let _loading = self.inner.loading.track("create-album");
        let resp = self.inner.api.create_album(album).await;
        let created = self.body(resp)?;
        info!(key = %created.key, title = %album.title, "album created");
        Ok(created.key)
    }

    /// Mint a public share link for an album.
    pub async fn share_album(&self, key: &str) -> Result<ShareLink, CoreError> {
        let resp = self.inner.api.create_share_token(key).await;
        let token = self.body(resp)?.token;
        let route = Route::named(RouteName::PublicAlbumDetail, [("id", key), ("token", token.as_str())])?;
        Ok(ShareLink { token, route })
    }

    pub async fn delete_album(&self, key: &str) -> Result<(), CoreError> {
        let resp = self.inner.api.delete_album(key).await;
        self.done(resp)?;
        self.inner.store.albums.remove_where(|a| a.key == key);
        self.inner.toasts.success("Successfully deleted album");
        Ok(())
    }

    fn stored_album(&self, key: &str) -> Result<Arc<Album>, CoreError> {
        self.inner
            .store
            .album_by_key(key)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "album".into(),
                identifier: key.to_owned(),
            })
    }

    // ── Comments ─────────────────────────────────────────────────────

    pub async fn fetch_comments(
        &self,
        album_key: &str,
        image_key: &str,
    ) -> Result<Arc<Vec<Arc<Comment>>>, CoreError> {
        let _loading = self.inner.loading.track("comments");
        let resp = self.inner.api.list_comments(album_key, image_key).await;
        let comments = self.body(resp)?;
        self.inner.store.comments.replace(comments);
        Ok(self.inner.store.comments_snapshot())
    }

    pub async fn fetch_public_comments(
        &self,
        album_key: &str,
        image_key: &str,
        token: &str,
    ) -> Result<Arc<Vec<Arc<Comment>>>, CoreError> {
        let _loading = self.inner.loading.track("comments");
        match self
            .inner
            .api
            .list_public_comments(album_key, image_key, token)
            .await
        {
            Ok(comments) => {
                self.inner.store.comments.replace(comments.unwrap_or_default());
                Ok(self.inner.store.comments_snapshot())
            }
            Err(e) => Err(self.report(e.into())),
        }
    }

    pub async fn add_comment(
        &self,
        album_key: &str,
        image_key: &str,
        text: &str,
    ) -> Result<Comment, CoreError> {
        let _loading = self.inner.loading.track("add-comment");
        let resp = self.inner.api.add_comment(album_key, image_key, text).await;
        let comment = self.body(resp)?;
        self.inner.store.comments.push(comment.clone());
        Ok(comment)
    }

    pub async fn delete_comment(&self, album_key: &str, id: i64) -> Result<(), CoreError> {
        match self.inner.api.delete_comment(album_key, id).await {
            Ok(_) if self.session_lost() => Err(CoreError::SessionExpired),
            Ok(_) => {
                self.inner.store.comments.remove_where(|c| c.id == id);
                self.inner.toasts.success("Successfully deleted comment");
                Ok(())
            }
            Err(e) => {
                self.inner.toasts.error("Error deleting comment");
                Err(e.into())
            }
        }
    }

    // ── Images ───────────────────────────────────────────────────────

    /// Upload an image file, returning the new image key.
    pub async fn upload_image(&self, path: &Path) -> Result<String, CoreError> {
        let _loading = self.inner.loading.track("upload");
        let resp = self.inner.api.upload_image_file(path).await;
        Ok(self.body(resp)?.key)
    }

    // ── Settings ─────────────────────────────────────────────────────

    pub async fn fetch_settings(&self) -> Result<Arc<Settings>, CoreError> {
        let _loading = self.inner.loading.track("settings");
        let resp = self.inner.api.get_settings().await;
        let settings = self.body(resp)?;
        self.inner.store.set_settings(settings);
        self.inner
            .store
            .settings()
            .ok_or_else(|| CoreError::Internal("settings vanished after update".into()))
    }

    /// Write one setting, then refresh the user list and the signed-in
    /// user so labels pick up the change.
    pub async fn set_setting(&self, key: &str, value: serde_json::Value) -> Result<(), CoreError> {
        let _loading = self.inner.loading.track("settings");
        let mut patch = serde_json::Map::new();
        patch.insert(key.to_owned(), value.clone());
        let resp = self.inner.api.put_settings(patch.into()).await;
        self.done(resp)?;

        let current = self.inner.store.settings().map(|s| (*s).clone()).unwrap_or_default();
        match merge_setting(current, key, value) {
            Ok(settings) => self.inner.store.set_settings(settings),
            Err(e) => warn!(key, error = %e, "setting saved but not representable locally"),
        }

        let me = self.inner.session.user().map(|u| u.key.clone());
        let (users, user) = futures::join!(self.fetch_users(), async {
            match me {
                Some(key) => self.fetch_user(&key).await.map(|_| ()),
                None => Ok(()),
            }
        });
        if let Err(e) = users.and(user) {
            debug!(error = %e, "refresh after settings update failed");
        }
        Ok(())
    }

    pub async fn change_password(&self, old: &str, new: &str) -> Result<(), CoreError> {
        let resp = self.inner.api.change_password(old, new).await;
        self.done(resp)?;
        self.inner
            .toasts
            .success("Successfully updated password. Make sure you remember it");
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    /// The persisted token disappeared, i.e. the last call hit a 401.
    fn session_lost(&self) -> bool {
        self.inner.session.storage().bearer_token().is_none()
            && self.inner.session.state() != SessionState::PublicView
    }

    /// Unwrap a response that must carry a body.
    fn body<T>(&self, resp: Result<Option<T>, hivefriends_api::Error>) -> Result<T, CoreError> {
        match resp {
            Ok(Some(value)) => Ok(value),
            Ok(None) if self.session_lost() => Err(CoreError::SessionExpired),
            Ok(None) => Err(self.report(CoreError::Api {
                message: "empty response".into(),
                status: Some(200),
            })),
            Err(e) => Err(self.report(e.into())),
        }
    }

    /// Check a response whose body is irrelevant.
    fn done(&self, resp: Result<(), hivefriends_api::Error>) -> Result<(), CoreError> {
        match resp {
            Ok(()) if self.session_lost() => Err(CoreError::SessionExpired),
            Ok(()) => Ok(()),
            Err(e) => Err(self.report(e.into())),
        }
    }

    /// Queue an error toast and hand the error back.
    fn report(&self, err: CoreError) -> CoreError {
        if !matches!(err, CoreError::SessionExpired) {
            self.inner.toasts.error(err.to_string());
        }
        err
    }
}

fn merge_setting(
    current: Settings,
    key: &str,
    value: serde_json::Value,
) -> Result<Settings, serde_json::Error> {
    let mut raw = serde_json::to_value(current)?;
    if let Some(map) = raw.as_object_mut() {
        map.insert(key.to_owned(), value);
    }
    serde_json::from_value(raw)
}

fn build_transport(config: &AppConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        ..TransportConfig::default()
    }
    .with_timeout(config.timeout)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_setting_updates_one_field() {
        let current = Settings {
            bio: Some("old".into()),
            ..Settings::default()
        };
        let merged = merge_setting(current, "colorTheme", json!("dark-normal")).unwrap();
        assert_eq!(merged.bio.as_deref(), Some("old"));
        assert_eq!(merged.color_theme.as_deref(), Some("dark-normal"));
    }

    #[test]
    fn transport_follows_config() {
        let mut config =
            AppConfig::for_environment(crate::config::Environment::Development).unwrap();
        config.tls = TlsVerification::DangerAcceptInvalid;
        config.timeout = std::time::Duration::from_secs(5);

        let transport = build_transport(&config);
        assert!(matches!(transport.tls, TlsMode::DangerAcceptInvalid));
        assert_eq!(transport.timeout, std::time::Duration::from_secs(5));
    }
}
