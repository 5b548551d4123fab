// ── Client-side data store ──
//
// Ordered snapshots of server resources, refreshed by `App` operations.

mod collection;
mod data_store;
mod filters;
mod users;

pub use data_store::DataStore;
pub use filters::AlbumFilters;
pub use users::UserDirectory;
