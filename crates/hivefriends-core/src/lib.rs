//! Client-side logic between `hivefriends-api` and user interfaces.
//!
//! - **[`App`]**: Facade that owns the API client, session, navigator and
//!   data store. Every fetch marks a loading name, surfaces failures as
//!   [`Toast`]s, and mutates the [`DataStore`] only on success.
//!
//! - **[`SessionContext`]**: Explicit auth state machine
//!   (`Anonymous`, `Authenticating`, `Authenticated`, `PublicView`) over the
//!   persisted bearer token and user record.
//!
//! - **Routing** ([`router`], [`guard`], [`Navigator`]): Route table with
//!   per-route metadata, a pure guard deciding each navigation, and the
//!   navigator that applies its decisions and publishes the [`Breadcrumb`].
//!
//! - **[`FormValidator`]**: Multi-field validation with concurrent sync and
//!   async rules.
//!
//! - **Activity** ([`activity`]): Day bucketing of the activity feed with
//!   per-uploader image consolidation.

pub mod activity;
pub mod app;
pub mod breadcrumb;
pub mod compose;
pub mod config;
pub mod error;
pub mod guard;
pub mod loading;
pub mod navigator;
pub mod router;
pub mod session;
pub mod store;
pub mod toast;
pub mod validation;

// ── Primary re-exports ──────────────────────────────────────────────
pub use activity::{ActivityFeed, DayGroup, FeedEntry};
pub use app::{App, ShareLink};
pub use breadcrumb::Breadcrumb;
pub use config::{AppConfig, Credentials, Environment, TlsVerification};
pub use error::CoreError;
pub use guard::Decision;
pub use loading::{LoadingGuard, LoadingSet};
pub use navigator::Navigator;
pub use router::{Route, RouteMeta, RouteName};
pub use session::{SessionContext, SessionSnapshot, SessionState};
pub use store::{AlbumFilters, DataStore, UserDirectory};
pub use toast::{Toast, ToastKind, ToastQueue};
pub use validation::{FieldError, FieldValue, FormValidator, Rule, ValidationErrors, rules};

// Wire types consumers need alongside the core API.
pub use hivefriends_api::{
    ActivityImage, ActivityItem, Album, Comment, FileStorage, Image, MemoryStorage, NewAlbum,
    SessionStorage, Settings, Timeframe, User,
};
