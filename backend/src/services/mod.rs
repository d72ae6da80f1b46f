//! Business logic services for the Farmlytics platform

pub mod community;
pub mod conversation;
pub mod diagnosis;
pub mod marketplace;
pub mod plant_diagnosis;
pub mod profile;
pub mod saathi;

pub use community::CommunityService;
pub use conversation::ConversationService;
pub use diagnosis::DiagnosisService;
pub use marketplace::MarketplaceService;
pub use plant_diagnosis::PlantDiagnosisService;
pub use profile::ProfileService;
pub use saathi::SaathiService;

use crate::error::{AppError, AppResult};

/// Lift a shared validation result into an error on `field`
pub(crate) fn check(field: &str, result: Result<(), &'static str>) -> AppResult<()> {
    result.map_err(|message| AppError::validation(field, message))
}
