//! Conversation and message HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::conversation::{
    ConversationService, SendMessageInput, StartConversationInput,
};
use crate::AppState;

fn service(state: &AppState) -> ConversationService {
    ConversationService::new(state.store.clone(), state.changes.clone())
}

/// List the caller's conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    match service(&state).list_for(current_user.id()).await {
        Ok(conversations) => (
            StatusCode::OK,
            Json(serde_json::json!({ "conversations": conversations })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Find or create the conversation with another user
pub async fn start_conversation(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<StartConversationInput>,
) -> impl IntoResponse {
    match service(&state)
        .resolve(current_user.id(), input.other_user_id)
        .await
    {
        Ok(conversation) => (StatusCode::OK, Json(conversation)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Messages of a conversation, oldest first
pub async fn list_messages(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(conversation_id): Path<Uuid>,
) -> impl IntoResponse {
    match service(&state)
        .messages(conversation_id, current_user.id())
        .await
    {
        Ok(messages) => {
            (StatusCode::OK, Json(serde_json::json!({ "messages": messages }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}

/// Send a message
pub async fn send_message(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(conversation_id): Path<Uuid>,
    Json(input): Json<SendMessageInput>,
) -> impl IntoResponse {
    match service(&state)
        .send(conversation_id, current_user.id(), input)
        .await
    {
        Ok(message) => (StatusCode::CREATED, Json(message)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Mark incoming messages read
pub async fn mark_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(conversation_id): Path<Uuid>,
) -> impl IntoResponse {
    match service(&state)
        .mark_read(conversation_id, current_user.id())
        .await
    {
        Ok(updated) => {
            (StatusCode::OK, Json(serde_json::json!({ "updated": updated }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
