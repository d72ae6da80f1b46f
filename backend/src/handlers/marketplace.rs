//! Marketplace HTTP handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::middleware::CurrentUser;
use crate::services::marketplace::{AddProductInput, MarketplaceService};
use crate::AppState;

/// Query parameters for product listing
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub search: Option<String>,
}

fn service(state: &AppState) -> MarketplaceService {
    MarketplaceService::new(state.store.clone(), state.changes.clone())
}

/// List available products
pub async fn list_products(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Query(query): Query<ProductQuery>,
) -> impl IntoResponse {
    match service(&state).list_available(query.search.as_deref()).await {
        Ok(products) => {
            (StatusCode::OK, Json(serde_json::json!({ "products": products }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Per-category price summary of the available products
pub async fn product_stats(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> impl IntoResponse {
    match service(&state).category_stats().await {
        Ok(categories) => {
            let total_products: usize = categories.iter().map(|c| c.product_count).sum();
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "total_products": total_products,
                    "categories": categories,
                })),
            )
                .into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// List the caller's own products
pub async fn list_my_products(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    match service(&state).list_mine(current_user.id()).await {
        Ok(products) => {
            (StatusCode::OK, Json(serde_json::json!({ "products": products }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// List a new product
pub async fn add_product(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<AddProductInput>,
) -> impl IntoResponse {
    match service(&state).add_product(current_user.id(), input).await {
        Ok(product) => (StatusCode::CREATED, Json(product)).into_response(),
        Err(e) => e.into_response(),
    }
}
