//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashMap;

use serde::Serialize;

/// Response body for `GET /cache/:key`
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: serde_json::Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for write operations
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    /// Success message
    pub message: String,
}

impl MessageResponse {
    pub fn set(key: &str) -> Self {
        Self {
            message: format!("Key '{}' set successfully", key),
        }
    }

    pub fn deleted(key: &str) -> Self {
        Self {
            message: format!("Key '{}' deleted successfully", key),
        }
    }

    pub fn cleared() -> Self {
        Self {
            message: "All keys deleted successfully".to_string(),
        }
    }

    pub fn settings_saved(count: usize) -> Self {
        Self {
            message: format!("{} settings saved", count),
        }
    }
}

/// Response body for `POST /cache/batch`
#[derive(Debug, Clone, Serialize)]
pub struct BatchGetResponse {
    pub hits: HashMap<String, serde_json::Value>,
    pub misses: Vec<String>,
}

/// Response body for `POST /settings/query`
#[derive(Debug, Clone, Serialize)]
pub struct SettingsResponse {
    pub values: HashMap<String, String>,
    pub misses: Vec<String>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
