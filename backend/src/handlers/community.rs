//! Community feed HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::community::{AddCommentInput, CommunityService, CreatePostInput};
use crate::AppState;

fn service(state: &AppState) -> CommunityService {
    CommunityService::new(state.store.clone(), state.changes.clone())
}

/// List posts with authors and comments
pub async fn list_posts(
    State(state): State<AppState>,
    _current_user: CurrentUser,
) -> impl IntoResponse {
    match service(&state).list_feed().await {
        Ok(posts) => (StatusCode::OK, Json(serde_json::json!({ "posts": posts }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Publish a post
pub async fn create_post(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreatePostInput>,
) -> impl IntoResponse {
    match service(&state).create_post(current_user.id(), input).await {
        Ok(post) => (StatusCode::CREATED, Json(post)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Delete one of the caller's posts
pub async fn delete_post(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(post_id): Path<Uuid>,
) -> impl IntoResponse {
    match service(&state).delete_post(current_user.id(), post_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

/// Comment on a post
pub async fn add_comment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(post_id): Path<Uuid>,
    Json(input): Json<AddCommentInput>,
) -> impl IntoResponse {
    match service(&state).add_comment(current_user.id(), post_id, input).await {
        Ok(comment) => (StatusCode::CREATED, Json(comment)).into_response(),
        Err(e) => e.into_response(),
    }
}
