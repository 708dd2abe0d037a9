//! Settings Cache Module
//!
//! String-typed view over any [`CacheDriver`] for site settings.

use std::collections::HashMap;

use tracing::warn;

use crate::cache::{CacheDriver, CacheValue};
use crate::error::Result;

/// Batch get/set of string settings.
pub trait SettingsCache {
    /// Fetches settings stored under `prefix + key`.
    ///
    /// A stored value that is not a string is reported as a miss.
    fn get_settings(&self, keys: &[String], prefix: &str) -> (HashMap<String, String>, Vec<String>);

    /// Stores every setting under `prefix + key` with the default TTL.
    fn set_settings(&self, values: HashMap<String, String>, prefix: &str) -> Result<()>;
}

impl<T: CacheDriver + ?Sized> SettingsCache for T {
    fn get_settings(&self, keys: &[String], prefix: &str) -> (HashMap<String, String>, Vec<String>) {
        let (raw, _) = self.gets(keys, prefix);
        let mut settings = HashMap::with_capacity(raw.len());
        let mut misses = Vec::new();

        for key in keys {
            match raw.get(key) {
                Some(CacheValue::Str(value)) => {
                    settings.insert(key.clone(), value.clone());
                }
                Some(other) => {
                    warn!(
                        "Setting {}{} holds a {} value, treating as miss",
                        prefix,
                        key,
                        other.type_name()
                    );
                    misses.push(key.clone());
                }
                None => misses.push(key.clone()),
            }
        }

        (settings, misses)
    }

    fn set_settings(&self, values: HashMap<String, String>, prefix: &str) -> Result<()> {
        let values = values
            .into_iter()
            .map(|(key, value)| (key, CacheValue::Str(value)))
            .collect();
        self.sets(values, prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DbCacheStore, SqliteEntryStore};

    fn new_cache() -> DbCacheStore<SqliteEntryStore> {
        DbCacheStore::new(SqliteEntryStore::open_in_memory().unwrap())
    }

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_set_and_get_settings() {
        let cache = new_cache();
        let mut values = HashMap::new();
        values.insert("siteName".to_string(), "My Drive".to_string());
        values.insert("siteURL".to_string(), "https://example.com".to_string());
        cache.set_settings(values, "setting_").unwrap();

        let (settings, misses) =
            cache.get_settings(&keys(&["siteName", "siteURL", "missing"]), "setting_");

        assert_eq!(settings["siteName"], "My Drive");
        assert_eq!(settings["siteURL"], "https://example.com");
        assert_eq!(misses, keys(&["missing"]));
    }

    #[test]
    fn test_settings_stored_as_strings() {
        let cache = new_cache();
        let mut values = HashMap::new();
        values.insert("a".to_string(), "1".to_string());
        cache.set_settings(values, "s_").unwrap();

        assert_eq!(cache.get("s_a"), Some(CacheValue::Str("1".into())));
    }

    #[test]
    fn test_non_string_value_is_miss() {
        let cache = new_cache();
        cache.set("s_num", CacheValue::Int(5), 0).unwrap();
        cache.set("s_name", "x".into(), 0).unwrap();

        let (settings, misses) = cache.get_settings(&keys(&["num", "gone", "name"]), "s_");

        assert_eq!(settings.len(), 1);
        assert_eq!(settings["name"], "x");
        assert_eq!(misses, keys(&["num", "gone"]));
    }

    #[test]
    fn test_settings_through_trait_object() {
        let cache: Box<dyn CacheDriver> = Box::new(new_cache());
        let mut values = HashMap::new();
        values.insert("k".to_string(), "v".to_string());
        cache.set_settings(values, "").unwrap();

        let (settings, misses) = cache.get_settings(&keys(&["k"]), "");
        assert_eq!(settings["k"], "v");
        assert!(misses.is_empty());
    }
}
