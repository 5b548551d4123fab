// hivefriends-api: Async Rust client for the hivefriends photo sharing API

pub mod client;
pub mod error;
pub mod models;
pub mod storage;
pub mod transport;

mod activity;
mod albums;
mod auth;
mod comments;
mod images;
mod users;

pub use client::{ApiClient, Body, LoginRedirect, NoRedirect, RequestOptions, make_query};
pub use error::Error;
pub use models::*;
pub use storage::{BEARER_TOKEN_KEY, FileStorage, MemoryStorage, SessionStorage, USER_KEY};
pub use transport::{TlsMode, TransportConfig};
