//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// A missing or expired key is not an error inside the library: lookups
/// return `None`. `NotFound` only exists so the HTTP layer can answer 404.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Value could not be serialized
    #[error("Encode error: {0}")]
    Encode(String),

    /// Payload could not be deserialized
    #[error("Decode error: {0}")]
    Decode(String),

    /// Encoded value does not fit in the payload column
    #[error("Payload of {size} bytes exceeds maximum of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    /// Persistence layer failure
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    /// File system failure while opening the database
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<rusqlite::Error> for CacheError {
    fn from(err: rusqlite::Error) -> Self {
        CacheError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl CacheError {
    /// Returns true if the error is a uniqueness/constraint violation
    /// reported by SQLite (e.g. a concurrent writer won the insert).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            CacheError::Database {
                source: Some(rusqlite::Error::SqliteFailure(e, _)),
                ..
            } if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) | CacheError::PayloadTooLarge { .. } => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
