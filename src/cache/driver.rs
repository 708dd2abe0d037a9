//! Cache Driver Module
//!
//! The generic cache interface and its database-backed implementation.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use tracing::{debug, warn};

use crate::cache::entry::expiry_from_ttl;
use crate::cache::{codec, CacheValue, EntryStore, DEFAULT_TTL_SECS};
use crate::error::Result;

// == Cache Driver Trait ==
/// Generic cache operations shared by every cache backend.
///
/// Batch operations are plain per-key loops. They stop at the first error
/// and leave whatever was already applied in place.
pub trait CacheDriver: Send + Sync {
    /// Stores a value. A `ttl_secs` of zero or less uses the default TTL.
    fn set(&self, key: &str, value: CacheValue, ttl_secs: i64) -> Result<()>;

    /// Fetches a value. Missing, expired and undecodable entries are `None`.
    fn get(&self, key: &str) -> Option<CacheValue>;

    /// Fetches `prefix + key` for each key.
    ///
    /// Hits are keyed by the unprefixed key; misses keep input order.
    fn gets(&self, keys: &[String], prefix: &str) -> (HashMap<String, CacheValue>, Vec<String>) {
        let mut hits = HashMap::with_capacity(keys.len());
        let mut misses = Vec::with_capacity(keys.len());

        for key in keys {
            match self.get(&format!("{}{}", prefix, key)) {
                Some(value) => {
                    hits.insert(key.clone(), value);
                }
                None => misses.push(key.clone()),
            }
        }

        (hits, misses)
    }

    /// Stores every entry under `prefix + key` with the default TTL.
    fn sets(&self, values: HashMap<String, CacheValue>, prefix: &str) -> Result<()> {
        for (key, value) in values {
            self.set(&format!("{}{}", prefix, key), value, 0)?;
        }
        Ok(())
    }

    /// Deletes `prefix + key` for each key.
    fn delete(&self, keys: &[String], prefix: &str) -> Result<()>;

    /// Alias of [`CacheDriver::delete`].
    fn deletes(&self, keys: &[String], prefix: &str) -> Result<()> {
        self.delete(keys, prefix)
    }

    /// Removes every entry regardless of prefix.
    fn delete_all(&self) -> Result<()>;

    /// Snapshots the cache to `path`. Backends that are already durable
    /// implement this as a no-op.
    fn persist(&self, path: &Path) -> Result<()>;

    /// Restores the cache from `path`. No-op for durable backends.
    fn restore(&self, path: &Path) -> Result<()>;
}

// == DB Cache Store ==
/// Cache driver backed by an [`EntryStore`].
pub struct DbCacheStore<S> {
    store: S,
    default_ttl: i64,
}

impl<S: EntryStore> DbCacheStore<S> {
    // == Constructor ==
    /// Creates a driver over `store` with the one hour default TTL.
    pub fn new(store: S) -> Self {
        Self {
            store,
            default_ttl: DEFAULT_TTL_SECS,
        }
    }

    /// Overrides the TTL used when `set` is called with a non-positive TTL.
    pub fn with_default_ttl(mut self, default_ttl: i64) -> Self {
        if default_ttl > 0 {
            self.default_ttl = default_ttl;
        }
        self
    }

    /// Returns the underlying entry store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the default TTL in seconds.
    pub fn default_ttl(&self) -> i64 {
        self.default_ttl
    }
}

impl<S: EntryStore> CacheDriver for DbCacheStore<S> {
    fn set(&self, key: &str, value: CacheValue, ttl_secs: i64) -> Result<()> {
        let payload = codec::encode(&value)?;
        let expires_at = expiry_from_ttl(Utc::now(), ttl_secs, self.default_ttl);

        self.store.upsert(key, &payload, expires_at).map_err(|e| {
            warn!("DbCacheStore set {}: {}", key, e);
            e
        })
    }

    fn get(&self, key: &str) -> Option<CacheValue> {
        let entry = match self.store.read_by_key(key) {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                warn!("DbCacheStore get {}: {}", key, e);
                return None;
            }
        };

        match codec::decode(&entry.payload) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("DbCacheStore get {}: corrupt entry treated as miss: {}", key, e);
                None
            }
        }
    }

    fn delete(&self, keys: &[String], prefix: &str) -> Result<()> {
        for key in keys {
            let full_key = format!("{}{}", prefix, key);
            let result = self.store.delete_by_key(&full_key);
            debug!("DbCacheStore delete {}: {:?}", full_key, result);
            result?;
        }
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        self.store.delete_all()
    }

    fn persist(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn restore(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheEntry, SqliteEntryStore, MAX_PAYLOAD_SIZE};
    use crate::error::CacheError;
    use chrono::{DateTime, Duration};
    use std::collections::BTreeMap;
    use std::thread::sleep;

    fn new_cache() -> DbCacheStore<SqliteEntryStore> {
        DbCacheStore::new(SqliteEntryStore::open_in_memory().unwrap())
    }

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    /// Store whose every operation fails.
    struct FailingStore;

    impl EntryStore for FailingStore {
        fn upsert(&self, _: &str, _: &[u8], _: DateTime<Utc>) -> Result<()> {
            Err(CacheError::Internal("store down".into()))
        }
        fn read_by_key(&self, _: &str) -> Result<Option<CacheEntry>> {
            Err(CacheError::Internal("store down".into()))
        }
        fn delete_by_key(&self, _: &str) -> Result<()> {
            Err(CacheError::Internal("store down".into()))
        }
        fn delete_all(&self) -> Result<()> {
            Err(CacheError::Internal("store down".into()))
        }
    }

    #[test]
    fn test_set_and_get() {
        let cache = new_cache();
        cache.set("key1", CacheValue::from("value1"), 60).unwrap();
        assert_eq!(cache.get("key1"), Some(CacheValue::from("value1")));
    }

    #[test]
    fn test_get_unset_key() {
        let cache = new_cache();
        assert_eq!(cache.get("nonexistent"), None);
    }

    #[test]
    fn test_set_heterogeneous_values() {
        let cache = new_cache();
        let mut map = BTreeMap::new();
        map.insert("n".to_string(), CacheValue::Int(3));

        cache.set("s", "text".into(), 0).unwrap();
        cache.set("i", CacheValue::Int(-1), 0).unwrap();
        cache.set("m", CacheValue::Map(map.clone()), 0).unwrap();

        assert_eq!(cache.get("s"), Some(CacheValue::Str("text".into())));
        assert_eq!(cache.get("i"), Some(CacheValue::Int(-1)));
        assert_eq!(cache.get("m"), Some(CacheValue::Map(map)));
    }

    #[test]
    fn test_default_ttl_is_one_hour() {
        let cache = new_cache();
        cache.set("k", CacheValue::Bool(true), 0).unwrap();

        let entry = cache.store().read_by_key("k").unwrap().unwrap();
        let remaining = entry.expires_at - Utc::now();
        assert!(remaining > Duration::minutes(59));
        assert!(remaining <= Duration::hours(1));
    }

    #[test]
    fn test_custom_default_ttl() {
        let cache = new_cache().with_default_ttl(120);
        assert_eq!(cache.default_ttl(), 120);
        cache.set("k", CacheValue::Null, -1).unwrap();

        let entry = cache.store().read_by_key("k").unwrap().unwrap();
        assert!(entry.expires_at - Utc::now() <= Duration::seconds(120));
    }

    #[test]
    fn test_set_with_huge_ttl() {
        let cache = new_cache();
        cache.set("forever", CacheValue::Int(1), i64::MAX).unwrap();
        cache.set("long", CacheValue::Int(2), 10_000_000_000_000).unwrap();

        assert_eq!(cache.get("forever"), Some(CacheValue::Int(1)));
        assert_eq!(cache.get("long"), Some(CacheValue::Int(2)));
    }

    #[test]
    fn test_huge_default_ttl() {
        let cache = new_cache().with_default_ttl(i64::MAX);
        cache.set("k", CacheValue::Bool(true), 0).unwrap();
        assert_eq!(cache.get("k"), Some(CacheValue::Bool(true)));
    }

    #[test]
    fn test_ttl_expiration() {
        let cache = new_cache();
        cache.set("key1", "value1".into(), 1).unwrap();
        assert!(cache.get("key1").is_some());

        sleep(std::time::Duration::from_millis(1100));

        assert_eq!(cache.get("key1"), None);
        assert_eq!(cache.store().count().unwrap(), 0, "expired row must be purged");
    }

    #[test]
    fn test_last_write_wins() {
        let cache = new_cache();
        cache.set("k", CacheValue::Int(1), 60).unwrap();
        cache.set("k", CacheValue::Int(2), 60).unwrap();

        assert_eq!(cache.get("k"), Some(CacheValue::Int(2)));
        assert_eq!(cache.store().count().unwrap(), 1);
    }

    #[test]
    fn test_set_too_large_keeps_previous_value() {
        let cache = new_cache();
        cache.set("k", "small".into(), 60).unwrap();

        let result = cache.set("k", CacheValue::Bytes(vec![0; MAX_PAYLOAD_SIZE]), 60);
        assert!(matches!(result, Err(CacheError::PayloadTooLarge { .. })));
        assert_eq!(cache.get("k"), Some(CacheValue::from("small")));
    }

    #[test]
    fn test_corrupt_payload_is_miss() {
        let cache = new_cache();
        cache
            .store()
            .upsert("bad", &[200, 1, 2], Utc::now() + Duration::hours(1))
            .unwrap();

        assert_eq!(cache.get("bad"), None);
    }

    #[test]
    fn test_gets_partitions_hits_and_misses() {
        let cache = new_cache();
        let mut values = HashMap::new();
        values.insert("a".to_string(), CacheValue::Int(1));
        values.insert("b".to_string(), CacheValue::Int(2));
        cache.sets(values, "p").unwrap();

        let (hits, misses) = cache.gets(&keys(&["a", "b", "c"]), "p");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits["a"], CacheValue::Int(1));
        assert_eq!(hits["b"], CacheValue::Int(2));
        assert_eq!(misses, keys(&["c"]));
    }

    #[test]
    fn test_gets_misses_keep_input_order() {
        let cache = new_cache();
        cache.set("p_y", "y".into(), 0).unwrap();

        let (_, misses) = cache.gets(&keys(&["z", "y", "x", "w"]), "p_");
        assert_eq!(misses, keys(&["z", "x", "w"]));
    }

    #[test]
    fn test_sets_applies_prefix() {
        let cache = new_cache();
        let mut values = HashMap::new();
        values.insert("a".to_string(), CacheValue::Int(1));
        cache.sets(values, "ns:").unwrap();

        assert_eq!(cache.get("ns:a"), Some(CacheValue::Int(1)));
        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn test_delete_with_prefix() {
        let cache = new_cache();
        cache.set("pa", CacheValue::Int(1), 0).unwrap();
        cache.set("pb", CacheValue::Int(2), 0).unwrap();

        cache.delete(&keys(&["a", "missing"]), "p").unwrap();

        assert_eq!(cache.get("pa"), None);
        assert_eq!(cache.get("pb"), Some(CacheValue::Int(2)));
    }

    #[test]
    fn test_deletes_alias() {
        let cache = new_cache();
        cache.set("pa", CacheValue::Int(1), 0).unwrap();
        cache.deletes(&keys(&["a"]), "p").unwrap();
        assert_eq!(cache.get("pa"), None);
    }

    #[test]
    fn test_delete_all_ignores_prefix() {
        let cache = new_cache();
        cache.set("one:a", CacheValue::Int(1), 0).unwrap();
        cache.set("two:b", CacheValue::Int(2), 0).unwrap();
        cache.set("c", CacheValue::Int(3), 0).unwrap();

        cache.delete_all().unwrap();
        assert_eq!(cache.store().count().unwrap(), 0);
    }

    #[test]
    fn test_persist_restore_are_noops() {
        let cache = new_cache();
        cache.set("k", CacheValue::Int(1), 0).unwrap();

        assert!(cache.persist(Path::new("/nonexistent/snapshot")).is_ok());
        assert!(cache.restore(Path::new("/nonexistent/snapshot")).is_ok());
        assert_eq!(cache.get("k"), Some(CacheValue::Int(1)));
    }

    #[test]
    fn test_store_failures() {
        let cache = DbCacheStore::new(FailingStore);

        assert!(cache.set("k", CacheValue::Null, 0).is_err());
        assert_eq!(cache.get("k"), None);
        assert!(cache.delete(&keys(&["a"]), "").is_err());
        assert!(cache.delete_all().is_err());

        let mut values = HashMap::new();
        values.insert("a".to_string(), CacheValue::Int(1));
        assert!(cache.sets(values, "").is_err());
    }
}
