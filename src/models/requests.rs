//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::HashMap;

use serde::Deserialize;

use crate::cache::MAX_KEY_LENGTH;

/// Validates a single cache key.
fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} characters",
            MAX_KEY_LENGTH
        ));
    }
    None
}

/// Request body for `PUT /cache`
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// Any JSON value
    pub value: serde_json::Value,
    /// TTL in seconds; missing, zero or negative uses the default
    #[serde(default)]
    pub ttl: Option<i64>,
}

impl SetRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Request body for `POST /cache/batch` and `POST /settings/query`
#[derive(Debug, Clone, Deserialize)]
pub struct BatchKeysRequest {
    pub keys: Vec<String>,
    #[serde(default)]
    pub prefix: String,
}

/// Request body for `PUT /settings`
#[derive(Debug, Clone, Deserialize)]
pub struct SetSettingsRequest {
    pub values: HashMap<String, String>,
    #[serde(default)]
    pub prefix: String,
}

impl SetSettingsRequest {
    /// Returns an error message for the first invalid prefixed key.
    pub fn validate(&self) -> Option<String> {
        self.values
            .keys()
            .find_map(|key| validate_key(&format!("{}{}", self.prefix, key)))
    }
}
