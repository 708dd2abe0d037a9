//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint. The cache API is
//! blocking, so every call runs on the blocking thread pool.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{CacheDriver, CacheValue, DbCacheStore, SettingsCache, SqliteEntryStore};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    BatchGetResponse, BatchKeysRequest, GetResponse, HealthResponse, MessageResponse, SetRequest,
    SetSettingsRequest, SettingsResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared cache driver
    pub cache: Arc<dyn CacheDriver>,
}

impl AppState {
    /// Creates a new AppState around any cache driver.
    pub fn new(cache: impl CacheDriver + 'static) -> Self {
        Self {
            cache: Arc::new(cache),
        }
    }

    /// Opens the SQLite cache described by the configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = SqliteEntryStore::open(&config.db_path)?;
        let cache = DbCacheStore::new(store).with_default_ttl(config.default_ttl);
        Ok(Self::new(cache))
    }

    /// Runs a blocking cache call off the async runtime.
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn CacheDriver) -> Result<T> + Send + 'static,
    {
        let cache = Arc::clone(&self.cache);
        tokio::task::spawn_blocking(move || f(cache.as_ref()))
            .await
            .map_err(|e| CacheError::Internal(format!("Cache task failed: {}", e)))?
    }
}

/// Handler for PUT /cache
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let SetRequest { key, value, ttl } = req;
    let response = MessageResponse::set(&key);
    state
        .run(move |cache| cache.set(&key, CacheValue::from(value), ttl.unwrap_or(0)))
        .await?;

    Ok(Json(response))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let lookup = key.clone();
    let value = state.run(move |cache| Ok(cache.get(&lookup))).await?;

    match value {
        Some(value) => Ok(Json(GetResponse::new(key, value.into()))),
        None => Err(CacheError::NotFound(key)),
    }
}

/// Handler for DELETE /cache/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MessageResponse>> {
    let response = MessageResponse::deleted(&key);
    state
        .run(move |cache| cache.delete(&[key], ""))
        .await?;

    Ok(Json(response))
}

/// Handler for DELETE /cache
pub async fn delete_all_handler(State(state): State<AppState>) -> Result<Json<MessageResponse>> {
    state.run(|cache| cache.delete_all()).await?;
    Ok(Json(MessageResponse::cleared()))
}

/// Handler for POST /cache/batch
pub async fn batch_get_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchKeysRequest>,
) -> Result<Json<BatchGetResponse>> {
    let (hits, misses) = state
        .run(move |cache| Ok(cache.gets(&req.keys, &req.prefix)))
        .await?;

    let hits = hits.into_iter().map(|(k, v)| (k, v.into())).collect();
    Ok(Json(BatchGetResponse { hits, misses }))
}

/// Handler for POST /settings/query
pub async fn get_settings_handler(
    State(state): State<AppState>,
    Json(req): Json<BatchKeysRequest>,
) -> Result<Json<SettingsResponse>> {
    let (values, misses) = state
        .run(move |cache| Ok(cache.get_settings(&req.keys, &req.prefix)))
        .await?;

    Ok(Json(SettingsResponse { values, misses }))
}

/// Handler for PUT /settings
pub async fn set_settings_handler(
    State(state): State<AppState>,
    Json(req): Json<SetSettingsRequest>,
) -> Result<Json<MessageResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let count = req.values.len();
    state
        .run(move |cache| cache.set_settings(req.values, &req.prefix))
        .await?;

    Ok(Json(MessageResponse::settings_saved(count)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
