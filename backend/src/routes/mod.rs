//! Route definitions for the Farmlytics platform

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes; every route requires a session token
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/profiles", profile_routes())
        .route("/directory", get(handlers::directory))
        .nest("/products", product_routes())
        .nest("/posts", post_routes())
        .nest("/conversations", conversation_routes())
        .route(
            "/diagnoses",
            get(handlers::list_diagnoses).post(handlers::record_diagnosis),
        )
        .nest("/live", live_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// AI relay endpoints, open like the browser calls them
pub fn function_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/diagnose-plant",
            post(handlers::diagnose_plant).options(handlers::relay_preflight),
        )
        .route(
            "/saathi-ai",
            post(handlers::saathi_ai).options(handlers::relay_preflight),
        )
}

/// Profile routes (protected)
fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_profile))
        .route(
            "/me",
            get(handlers::get_my_profile).put(handlers::update_my_profile),
        )
        .route("/:profile_id", get(handlers::get_profile))
}

/// Marketplace routes (protected)
fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_products).post(handlers::add_product))
        .route("/mine", get(handlers::list_my_products))
        .route("/stats", get(handlers::product_stats))
}

/// Community routes (protected)
fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_posts).post(handlers::create_post))
        .route("/:post_id", delete(handlers::delete_post))
        .route("/:post_id/comments", post(handlers::add_comment))
}

/// Conversation routes (protected)
fn conversation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_conversations).post(handlers::start_conversation),
        )
        .route(
            "/:conversation_id/messages",
            get(handlers::list_messages).post(handlers::send_message),
        )
        .route("/:conversation_id/read", post(handlers::mark_read))
}

/// Live view streams (protected)
fn live_routes() -> Router<AppState> {
    Router::new()
        .route("/feed", get(handlers::live_feed))
        .route("/conversations", get(handlers::live_conversations))
        .route(
            "/conversations/:conversation_id/messages",
            get(handlers::live_messages),
        )
        .route("/products", get(handlers::live_products))
}
