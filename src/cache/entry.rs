//! Cache Entry Module
//!
//! Defines the row stored for each cached key.

use chrono::{DateTime, Duration, Utc};

// == Cache Entry ==
/// One row of the `cache_entries` table.
///
/// The payload is opaque here; only the codec knows its structure.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    /// Row id assigned by the database (0 before insert)
    pub id: i64,
    /// Unique key name
    pub key: String,
    /// Encoded value
    pub payload: Vec<u8>,
    /// Absolute expiration time
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker, ignored by every cache operation
    pub deleted_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new, not yet persisted entry.
    pub fn new(key: impl Into<String>, payload: Vec<u8>, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            key: key.into(),
            payload,
            expires_at,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    // == Is Expired ==
    /// Checks if the entry is dead at the given instant.
    ///
    /// An entry is still live at exactly `expires_at`; it expires once the
    /// current time passes it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Checks if the entry is dead now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

// == Utility Functions ==
/// Computes the absolute expiry for a TTL in seconds.
///
/// Non-positive TTLs fall back to `default_ttl_secs`. A TTL past the
/// representable range saturates at [`DateTime::<Utc>::MAX_UTC`].
pub fn expiry_from_ttl(now: DateTime<Utc>, ttl_secs: i64, default_ttl_secs: i64) -> DateTime<Utc> {
    let secs = if ttl_secs > 0 { ttl_secs } else { default_ttl_secs };
    Duration::try_seconds(secs)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Converts a timestamp to the unix milliseconds stored in the table.
pub fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

/// Converts stored unix milliseconds back to a timestamp.
pub fn from_millis(ms: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
}
