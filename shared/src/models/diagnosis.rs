//! Plant diagnosis models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalised result returned by the plant diagnosis relay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisResult {
    /// Full model answer
    pub diagnosis: String,
    pub disease: String,
    /// 0-100
    pub confidence: i32,
    pub recommendations: String,
}

/// Stored diagnosis; append-only
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiagnosisRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub image_url: String,
    pub diagnosis: String,
    pub disease_detected: String,
    pub confidence: i32,
    pub recommendations: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Status written for records created from a successful relay call
pub const DIAGNOSIS_STATUS_COMPLETED: &str = "completed";
