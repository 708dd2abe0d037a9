//! Cache Module
//!
//! Persistent key/value caching in a SQLite table with lazy TTL expiration.

pub mod codec;
mod driver;
mod entry;
mod settings;
mod store;
mod value;


// Re-export public types
pub use codec::{decode, encode};
pub use driver::{CacheDriver, DbCacheStore};
pub use entry::CacheEntry;
pub use settings::SettingsCache;
pub use store::{EntryStore, SqliteEntryStore};
pub use value::CacheValue;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 255;

/// Capacity of the payload column in bytes
pub const MAX_PAYLOAD_SIZE: usize = 2048;

/// TTL applied when a caller passes zero or a negative TTL (1 hour)
pub const DEFAULT_TTL_SECS: i64 = 3600;
