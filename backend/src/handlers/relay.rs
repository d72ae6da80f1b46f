//! HTTP handlers for the AI relay endpoints
//!
//! Both endpoints are called straight from the browser. Every failure,
//! including an unreadable body, becomes a 500 with the fixed error shape.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{ChatTurn, DiagnosisResult};

use crate::error::{AppError, AppResult};
use crate::services::saathi::FALLBACK_REPLY;
use crate::services::{PlantDiagnosisService, SaathiService};
use crate::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosePlantRequest {
    pub image_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaathiRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Vec<ChatTurn>,
}

#[derive(Debug, Serialize)]
pub struct SaathiResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct RelayError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Preflight for the relay endpoints; CORS headers come from the global layer
pub async fn relay_preflight() -> StatusCode {
    StatusCode::OK
}

/// Diagnose a plant from an image URL
/// POST /functions/v1/diagnose-plant
pub async fn diagnose_plant(State(state): State<AppState>, body: Bytes) -> Response {
    match run_diagnosis(&state, &body).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => {
            tracing::error!("Error in diagnose-plant relay: {}", e);
            relay_error(e, None)
        }
    }
}

/// Answer an assistant chat message
/// POST /functions/v1/saathi-ai
pub async fn saathi_ai(State(state): State<AppState>, body: Bytes) -> Response {
    match run_saathi(&state, &body).await {
        Ok(response) => (StatusCode::OK, Json(SaathiResponse { response })).into_response(),
        Err(e) => {
            tracing::error!("Error in saathi-ai relay: {}", e);
            relay_error(e, Some(FALLBACK_REPLY.to_string()))
        }
    }
}

async fn run_diagnosis(state: &AppState, body: &[u8]) -> AppResult<DiagnosisResult> {
    let request: DiagnosePlantRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::validation("body", format!("Invalid request body: {}", e)))?;

    PlantDiagnosisService::new(state.ai.clone())
        .diagnose(&request.image_url)
        .await
}

async fn run_saathi(state: &AppState, body: &[u8]) -> AppResult<String> {
    let request: SaathiRequest = serde_json::from_slice(body)
        .map_err(|e| AppError::validation("body", format!("Invalid request body: {}", e)))?;

    SaathiService::new(state.ai.clone(), state.config.ai.chat_temperature)
        .reply(&request.message, &request.conversation_history)
        .await
}

fn relay_error(error: AppError, response: Option<String>) -> Response {
    let message = match error {
        AppError::RelayUpstream(msg) => msg,
        AppError::Validation { message, .. } => message,
        other => other.to_string(),
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(RelayError {
            error: message,
            response,
        }),
    )
        .into_response()
}
