//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /cache` - Store a JSON value under a key
//! - `GET /cache/:key` - Retrieve a value by key
//! - `DELETE /cache/:key` - Delete a key
//! - `DELETE /cache` - Delete every key
//! - `POST /cache/batch` - Retrieve several prefixed keys
//! - `PUT /settings` - Store string settings under a prefix
//! - `POST /settings/query` - Retrieve string settings under a prefix
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
