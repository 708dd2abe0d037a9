//! DB Cache - A persistent key/value cache backed by a SQLite table
//!
//! Provides TTL-aware get/set/delete, prefix-scoped batch operations and a
//! string-typed settings view, with expiry checked lazily on read.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::{CacheDriver, CacheValue, DbCacheStore, EntryStore, SettingsCache, SqliteEntryStore};
pub use config::Config;
pub use error::{CacheError, Result};
