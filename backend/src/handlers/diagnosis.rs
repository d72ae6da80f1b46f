//! Diagnosis history HTTP handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::middleware::CurrentUser;
use crate::services::diagnosis::{DiagnosisService, RecordDiagnosisInput};
use crate::AppState;

/// Keep a diagnosis result
pub async fn record_diagnosis(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<RecordDiagnosisInput>,
) -> impl IntoResponse {
    let service = DiagnosisService::new(state.store.clone(), state.changes.clone());

    match service.record(current_user.id(), input).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// The caller's diagnosis history
pub async fn list_diagnoses(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> impl IntoResponse {
    let service = DiagnosisService::new(state.store.clone(), state.changes.clone());

    match service.history(current_user.id()).await {
        Ok(diagnoses) => {
            (StatusCode::OK, Json(serde_json::json!({ "diagnoses": diagnoses }))).into_response()
        }
        Err(e) => e.into_response(),
    }
}
