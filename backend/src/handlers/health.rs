//! Health check handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::StoreBackend;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: String,
    pub store_backend: String,
    pub live_subscriptions: usize,
}

/// Health check endpoint handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Check store connectivity
    let store_status = match state.store.ping().await {
        Ok(_) => "connected".to_string(),
        Err(e) => {
            tracing::warn!("store ping failed: {}", e);
            "disconnected".to_string()
        }
    };

    let backend = match state.config.store.backend {
        StoreBackend::Postgres => "postgres",
        StoreBackend::Memory => "memory",
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store_status,
        store_backend: backend.to_string(),
        live_subscriptions: state.changes.active_subscriptions(),
    })
}
