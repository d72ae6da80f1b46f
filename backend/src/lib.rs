//! Farmlytics Platform - Backend
//!
//! Marketplace, community and messaging API for Indian farmers, wholesalers
//! and buyers, with live views and two AI relay endpoints.

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod external;
pub mod handlers;
pub mod middleware;
pub mod realtime;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use error::AppResult;
use external::AiGatewayClient;
use realtime::ChangeFeed;
use store::Store;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub changes: ChangeFeed,
    pub ai: AiGatewayClient,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: Config) -> AppResult<Self> {
        Ok(Self {
            store,
            changes: ChangeFeed::new(config.realtime.channel_capacity),
            ai: AiGatewayClient::new(&config.ai)?,
            config: Arc::new(config),
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .nest("/functions/v1", routes::function_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Farmlytics Platform API v1.0"
}
