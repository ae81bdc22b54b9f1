//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::cache::{entry_size, ByteView, CacheStore};
use crate::error::{CacheError, Result};
use crate::models::{
    DeleteResponse, EvictResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
    StatsResponse,
};

/// Application state shared across all handlers.
///
/// The cache store is not synchronized on its own; every handler goes through
/// this lock.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RwLock<CacheStore>>,
}

impl AppState {
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a new AppState sized by the configured byte budget.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(CacheStore::new(config.max_bytes))
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let value = ByteView::from(req.value);
    let size = entry_size(&req.key, &value);

    let mut cache = state.cache.write().await;
    cache.set(req.key.clone(), value)?;

    Ok(Json(SetResponse::new(req.key, size)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: a hit promotes the entry and updates stats
    let mut cache = state.cache.write().await;
    let value = cache.get(&key)?;

    Ok(Json(GetResponse::new(key, &value)))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.cache.write().await;
    cache.delete(&key)?;

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for POST /evict
///
/// Evicts the least recently used entry, if any.
pub async fn evict_handler(State(state): State<AppState>) -> Json<EvictResponse> {
    let mut cache = state.cache.write().await;
    let evicted = cache.evict_oldest();
    if let Some(key) = &evicted {
        info!(key = %key, "manually evicted oldest entry");
    }

    let stats = cache.stats();
    Json(EvictResponse {
        evicted,
        total_entries: stats.total_entries,
        used_bytes: stats.used_bytes,
    })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(cache.stats().into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
