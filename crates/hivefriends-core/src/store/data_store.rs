// ── Central data store ──
//
// Snapshots of every resource the client has fetched. Mutations are
// broadcast to subscribers via `watch` channels.

use std::sync::{Arc, RwLock};

use hivefriends_api::{Album, Comment, Settings};
use tokio::sync::watch;

use super::collection::Collection;
use super::filters::AlbumFilters;
use super::users::UserDirectory;
use crate::activity::ActivityFeed;
use crate::session::SessionContext;

pub struct DataStore {
    pub(crate) users: UserDirectory,
    pub(crate) albums: Collection<Album>,
    pub(crate) comments: Collection<Comment>,
    pub(crate) settings: RwLock<Option<Arc<Settings>>>,
    pub(crate) filters: AlbumFilters,
    pub(crate) activity: ActivityFeed,
}

impl DataStore {
    pub fn new(session: Arc<SessionContext>) -> Self {
        Self {
            users: UserDirectory::new(session),
            albums: Collection::new(),
            comments: Collection::new(),
            settings: RwLock::new(None),
            filters: AlbumFilters::new(),
            activity: ActivityFeed::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    pub fn filters(&self) -> &AlbumFilters {
        &self.filters
    }

    pub fn activity(&self) -> &ActivityFeed {
        &self.activity
    }

    pub fn albums_snapshot(&self) -> Arc<Vec<Arc<Album>>> {
        self.albums.snapshot()
    }

    pub fn subscribe_albums(&self) -> watch::Receiver<Arc<Vec<Arc<Album>>>> {
        self.albums.subscribe()
    }

    pub fn album_by_key(&self, key: &str) -> Option<Arc<Album>> {
        self.albums.find(|a| a.key == key)
    }

    pub fn comments_snapshot(&self) -> Arc<Vec<Arc<Comment>>> {
        self.comments.snapshot()
    }

    pub fn subscribe_comments(&self) -> watch::Receiver<Arc<Vec<Arc<Comment>>>> {
        self.comments.subscribe()
    }

    pub fn settings(&self) -> Option<Arc<Settings>> {
        self.settings.read().expect("settings lock poisoned").clone()
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub(crate) fn upsert_album(&self, album: Album) {
        let key = album.key.clone();
        if !self.albums.replace_where(|a| a.key == key, album.clone()) {
            self.albums.push(album);
        }
    }

    pub(crate) fn set_settings(&self, settings: Settings) {
        *self.settings.write().expect("settings lock poisoned") = Some(Arc::new(settings));
    }

    /// Drop everything tied to the signed-in user.
    pub(crate) fn clear(&self) {
        self.users.replace(Vec::new());
        self.albums.clear();
        self.comments.clear();
        self.settings.write().expect("settings lock poisoned").take();
        self.filters.reset();
        self.activity.clear();
    }
}
