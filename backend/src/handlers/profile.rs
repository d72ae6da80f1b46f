//! Profile and directory HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use shared::DirectoryFilter;
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::profile::{CreateProfileInput, ProfileService, UpdateProfileInput};
use crate::AppState;

fn service(state: &AppState) -> ProfileService {
    ProfileService::new(state.store.clone(), state.changes.clone())
}

/// Create the caller's profile
pub async fn create_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateProfileInput>,
) -> impl IntoResponse {
    match service(&state).create_profile(current_user.id(), input).await {
        Ok(profile) => (StatusCode::CREATED, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get the caller's own profile
pub async fn get_my_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    match service(&state).get_profile(current_user.id()).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Update the caller's own profile
pub async fn update_my_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateProfileInput>,
) -> impl IntoResponse {
    match service(&state).update_profile(current_user.id(), input).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get any member's profile
pub async fn get_profile(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(profile_id): Path<Uuid>,
) -> impl IntoResponse {
    match service(&state).get_profile(profile_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Search other members
pub async fn directory(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(filter): Query<DirectoryFilter>,
) -> impl IntoResponse {
    match service(&state).directory(current_user.id(), &filter).await {
        Ok(profiles) => {
            (StatusCode::OK, Json(serde_json::json!({ "profiles": profiles }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
