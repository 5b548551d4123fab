// ── Session context ──
//
// Explicit auth state shared by the HTTP client hook, the route guard,
// and the stores. The persisted half (bearer token + user record) lives
// in `SessionStorage`; this holds the in-memory half and the state
// machine, observable through a `watch` channel.

use std::sync::{Arc, RwLock};

use hivefriends_api::{BEARER_TOKEN_KEY, SessionStorage, USER_KEY, User};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::CoreError;

/// Auth state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated,
    /// Viewing a shared album through a public token.
    PublicView,
}

/// What the route guard needs to know about the session, captured at
/// the start of a navigation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// A non-empty bearer token is persisted.
    pub has_token: bool,
    /// A user record is persisted.
    pub has_user: bool,
    /// The signed-in user is loaded in memory.
    pub signed_in: bool,
    pub public_token: Option<String>,
}

impl SessionSnapshot {
    pub fn has_credentials(&self) -> bool {
        self.has_token && self.has_user
    }
}

pub struct SessionContext {
    storage: Arc<dyn SessionStorage>,
    state: watch::Sender<SessionState>,
    user: RwLock<Option<Arc<User>>>,
    public_token: RwLock<Option<String>>,
}

impl SessionContext {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::Anonymous);
        Self {
            storage,
            state,
            user: RwLock::new(None),
            public_token: RwLock::new(None),
        }
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The signed-in user, if loaded.
    pub fn user(&self) -> Option<Arc<User>> {
        self.user.read().expect("session user lock poisoned").clone()
    }

    pub fn public_token(&self) -> Option<String> {
        self.public_token
            .read()
            .expect("public token lock poisoned")
            .clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            has_token: self.storage.bearer_token().is_some(),
            has_user: self.storage.get(USER_KEY).is_some(),
            signed_in: self.user().is_some(),
            public_token: self.public_token(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Restore a persisted session. Returns `true` if one was found.
    ///
    /// A token without a readable user record is treated as stale and
    /// cleared.
    pub fn hydrate(&self) -> bool {
        if self.storage.bearer_token().is_none() {
            return false;
        }
        let Some(raw) = self.storage.get(USER_KEY) else {
            return false;
        };
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => {
                debug!(username = %user.username, "restored persisted session");
                *self.user.write().expect("session user lock poisoned") = Some(Arc::new(user));
                self.transition(SessionState::Authenticated);
                true
            }
            Err(e) => {
                warn!(error = %e, "persisted user record unreadable, clearing session");
                self.storage.clear_session();
                false
            }
        }
    }

    pub fn begin_authentication(&self) {
        self.transition(SessionState::Authenticating);
    }

    /// Persist the bearer token returned by a successful login.
    pub fn store_token(&self, token: &str) -> Result<(), CoreError> {
        self.storage.set(BEARER_TOKEN_KEY, token)?;
        Ok(())
    }

    /// Persist and load the signed-in user record. Completes a sign-in.
    pub fn set_user(&self, user: User) -> Result<(), CoreError> {
        let raw = serde_json::to_string(&user)
            .map_err(|e| CoreError::Internal(format!("cannot serialize user: {e}")))?;
        self.storage.set(USER_KEY, &raw)?;
        info!(username = %user.username, "signed in");
        *self.user.write().expect("session user lock poisoned") = Some(Arc::new(user));
        self.public_token
            .write()
            .expect("public token lock poisoned")
            .take();
        self.transition(SessionState::Authenticated);
        Ok(())
    }

    /// Return to `Anonymous` after a rejected sign-in.
    pub fn abort_authentication(&self) {
        if self.state() == SessionState::Authenticating {
            self.transition(SessionState::Anonymous);
        }
    }

    /// Explicit sign-out.
    pub fn sign_out(&self) {
        info!("signing out");
        self.teardown();
    }

    /// Teardown after the server rejected the bearer token.
    pub fn expire(&self) {
        info!("session expired");
        self.teardown();
    }

    // ── Public view ──────────────────────────────────────────────────

    pub fn enter_public_view(&self, token: &str) {
        *self.public_token.write().expect("public token lock poisoned") = Some(token.to_owned());
        self.transition(SessionState::PublicView);
    }

    /// Discard the public token, e.g. when a valid session takes over.
    pub fn leave_public_view(&self) {
        self.public_token
            .write()
            .expect("public token lock poisoned")
            .take();
        let next = if self.user().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        };
        self.transition(next);
    }

    // ── Internals ────────────────────────────────────────────────────

    fn teardown(&self) {
        self.storage.clear_session();
        self.user.write().expect("session user lock poisoned").take();
        self.public_token
            .write()
            .expect("public token lock poisoned")
            .take();
        self.transition(SessionState::Anonymous);
    }

    fn transition(&self, next: SessionState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            debug!(%prev, %next, "session state changed");
        }
    }
}
