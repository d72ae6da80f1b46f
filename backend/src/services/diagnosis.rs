//! Diagnosis history: records of completed plant diagnoses

use std::sync::Arc;

use serde::Deserialize;
use shared::{validate_confidence, validate_image_url, DiagnosisRecord, DIAGNOSIS_STATUS_COMPLETED};
use uuid::Uuid;

use super::check;
use crate::error::AppResult;
use crate::realtime::{ChangeEvent, ChangeFeed, ChangeKind, Table};
use crate::store::{NewDiagnosis, Store};

#[derive(Clone)]
pub struct DiagnosisService {
    store: Arc<dyn Store>,
    changes: ChangeFeed,
}

/// A diagnosis result the client wants kept
#[derive(Debug, Deserialize)]
pub struct RecordDiagnosisInput {
    pub image_url: String,
    pub diagnosis: String,
    pub disease_detected: String,
    pub confidence: i32,
    pub recommendations: String,
}

impl DiagnosisService {
    pub fn new(store: Arc<dyn Store>, changes: ChangeFeed) -> Self {
        Self { store, changes }
    }

    pub async fn record(&self, user_id: Uuid, input: RecordDiagnosisInput) -> AppResult<DiagnosisRecord> {
        check("image_url", validate_image_url(&input.image_url))?;
        check("confidence", validate_confidence(input.confidence))?;

        let record = self
            .store
            .insert_diagnosis(NewDiagnosis {
                user_id,
                image_url: input.image_url.trim().to_string(),
                diagnosis: input.diagnosis,
                disease_detected: input.disease_detected,
                confidence: input.confidence,
                recommendations: input.recommendations,
                status: DIAGNOSIS_STATUS_COMPLETED.to_string(),
            })
            .await?;

        self.changes.publish(
            ChangeEvent::new(Table::PlantDiagnoses, ChangeKind::Insert, record.id)
                .with_column("user_id", user_id),
        );

        Ok(record)
    }

    /// The caller's diagnoses, newest first
    pub async fn history(&self, user_id: Uuid) -> AppResult<Vec<DiagnosisRecord>> {
        self.store.list_diagnoses(user_id).await
    }
}
