//! Storage API Handlers
//!
//! HTTP endpoints that expose the sharded store to the router. Writes arrive
//! as form bodies, reads as query strings, and every response is a plain
//! text body with a status code (the stats endpoint is the JSON exception).
//!
//! They act as the bridge between the Axum web framework and the logic in
//! `shards.rs`.

use axum::extract::{Extension, Form, Query};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;
use sysinfo::System;

use super::protocol::{
    DelForm, GetParams, NodeStats, PutForm, RangeParams, encode_pairs, ENDPOINT_ALL,
    ENDPOINT_DEL, ENDPOINT_GET, ENDPOINT_PUT, ENDPOINT_RANGE, ENDPOINT_STATS,
};
use super::shards::ShardedStore;
use super::wal::WriteLog;

/// Shared state of one storage node: the shards and the optional write log.
pub struct NodeState {
    pub store: ShardedStore,
    pub wal: Option<WriteLog>,
}

impl NodeState {
    pub fn new(store: ShardedStore, wal: Option<WriteLog>) -> Arc<Self> {
        Arc::new(Self { store, wal })
    }
}

/// Build the node's HTTP application.
pub fn app(state: Arc<NodeState>) -> Router {
    Router::new()
        .route(ENDPOINT_PUT, post(handle_put))
        .route(ENDPOINT_DEL, post(handle_del))
        .route(ENDPOINT_GET, get(handle_get))
        .route(ENDPOINT_RANGE, get(handle_range))
        .route(ENDPOINT_ALL, get(handle_all))
        .route(ENDPOINT_STATS, get(handle_stats))
        .layer(Extension(state))
}

/// Write or overwrite a key.
///
/// Keys and values with embedded newlines are rejected here so that the
/// line-delimited export encoding stays unambiguous end to end.
pub async fn handle_put(
    Extension(state): Extension<Arc<NodeState>>,
    Form(req): Form<PutForm>,
) -> (StatusCode, String) {
    if req.key.contains('\n') || req.val.contains('\n') {
        return (
            StatusCode::BAD_REQUEST,
            "keys and values must not contain newlines".to_string(),
        );
    }

    state.store.put(&req.key, &req.val);

    if let Some(wal) = &state.wal
        && let Err(e) = wal.append_set(&req.key, &req.val)
    {
        tracing::error!("Failed to append to write log: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "write log append failed".to_string(),
        );
    }

    tracing::debug!("Saved key {}", req.key);
    (StatusCode::OK, "OK".to_string())
}

/// Delete a key. Deleting an absent key is still a success.
pub async fn handle_del(
    Extension(state): Extension<Arc<NodeState>>,
    Form(req): Form<DelForm>,
) -> (StatusCode, String) {
    let existed = state.store.del(&req.key);

    if let Some(wal) = &state.wal
        && let Err(e) = wal.append_del(&req.key)
    {
        tracing::error!("Failed to append to write log: {}", e);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "write log append failed".to_string(),
        );
    }

    tracing::debug!("Deleted key {} (existed: {})", req.key, existed);
    (StatusCode::OK, "OK".to_string())
}

/// Read a key from the local shards.
pub async fn handle_get(
    Extension(state): Extension<Arc<NodeState>>,
    Query(req): Query<GetParams>,
) -> (StatusCode, String) {
    match state.store.get(&req.key) {
        Some(val) => (StatusCode::OK, val),
        None => (StatusCode::NOT_FOUND, "Not Found".to_string()),
    }
}

/// Export every pair whose key hash lies on the requested arc.
///
/// A missing or malformed bound never reaches this handler; the query
/// extractor rejects it with a 400 first. The arcs the router asks for are
/// arcs it has already reassigned, so this node is exporting keys it no
/// longer owns.
pub async fn handle_range(
    Extension(state): Extension<Arc<NodeState>>,
    Query(req): Query<RangeParams>,
) -> (StatusCode, String) {
    let pairs = state.store.export_range(req.start, req.end);
    tracing::debug!(
        "Exported {} pairs for range ({}, {}]",
        pairs.len(),
        req.start,
        req.end
    );
    (StatusCode::OK, encode_pairs(&pairs))
}

/// Export every pair on this node. Used when the node is being drained.
pub async fn handle_all(Extension(state): Extension<Arc<NodeState>>) -> (StatusCode, String) {
    let pairs = state.store.export_all();
    tracing::debug!("Exported all {} pairs", pairs.len());
    (StatusCode::OK, encode_pairs(&pairs))
}

/// Statistics snapshot: entries per shard plus process memory.
pub async fn handle_stats(Extension(state): Extension<Arc<NodeState>>) -> Json<NodeStats> {
    let shard_entries = state.store.shard_entry_counts().to_vec();
    let entries = shard_entries.iter().sum();

    let mut sys = System::new();
    sys.refresh_memory();
    // sysinfo reports bytes.
    let mem_total_mb = sys.total_memory() / (1024 * 1024);
    let mem_used_mb = sys.used_memory() / (1024 * 1024);

    Json(NodeStats {
        entries,
        shard_entries,
        mem_used_mb,
        mem_total_mb,
    })
}
