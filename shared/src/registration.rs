//! Farmlytics ID registration draft
//!
//! The two-step registration form keeps its progress in a client-side draft.
//! The draft is a convenience cache only; nothing here is authoritative.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validation::{validate_aadhaar, validate_indian_mobile, validate_ulpin};

/// Local storage key holding the serialized draft
pub const REGISTRATION_STORAGE_KEY: &str = "farmlytics_form_data";

/// Draft as persisted between steps. Field names follow the stored JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aadhaar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farmer_photo_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub land_area: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ulpin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lpc_type: Option<LpcSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lpc_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lpc_file_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub farmanalytics_number: Option<String>,
}

/// How the land possession certificate was provided
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LpcSource {
    Upload,
    Text,
}

/// Which page of the flow to show
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationStep {
    PersonalDetails,
    LandDetails,
    IdCard,
}

/// Step one submission
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub full_name: String,
    pub aadhaar: String,
    pub mobile: String,
    pub dob: Option<NaiveDate>,
}

/// Step two submission
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandDetails {
    pub land_area: String,
    pub village: String,
    pub ulpin: String,
    pub lpc_type: LpcSource,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("{field}: {message}")]
    InvalidField {
        field: &'static str,
        message: &'static str,
    },

    #[error("Personal details must be completed first")]
    PersonalDetailsMissing,
}

fn invalid(field: &'static str, message: &'static str) -> RegistrationError {
    RegistrationError::InvalidField { field, message }
}

fn required(field: &'static str, value: &str) -> Result<String, RegistrationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(invalid(field, "This field is required"))
    } else {
        Ok(trimmed.to_string())
    }
}

impl RegistrationDraft {
    /// Step to resume at when the draft is loaded
    pub fn resume_step(&self) -> RegistrationStep {
        if self.farmanalytics_number.is_some() {
            RegistrationStep::IdCard
        } else {
            RegistrationStep::PersonalDetails
        }
    }

    /// Validate and merge step one. The photo must already be attached.
    pub fn submit_personal(
        &mut self,
        details: PersonalDetails,
        today: NaiveDate,
    ) -> Result<RegistrationStep, RegistrationError> {
        let full_name = required("fullName", &details.full_name)?;
        let aadhaar = details.aadhaar.trim().to_string();
        validate_aadhaar(&aadhaar).map_err(|m| invalid("aadhaar", m))?;
        let mobile = required("mobile", &details.mobile)?;
        validate_indian_mobile(&mobile).map_err(|m| invalid("mobile", m))?;
        let dob = details
            .dob
            .ok_or_else(|| invalid("dob", "This field is required"))?;
        if dob > today {
            return Err(invalid("dob", "Date of birth cannot be in the future"));
        }
        if self.farmer_photo_base64.as_deref().unwrap_or("").is_empty() {
            return Err(invalid("farmerPhotoBase64", "A farmer photo is required"));
        }

        self.full_name = Some(full_name);
        self.aadhaar = Some(aadhaar);
        self.mobile = Some(mobile);
        self.dob = Some(dob);
        self.age = Some(age_on(dob, today));
        Ok(RegistrationStep::LandDetails)
    }

    /// Validate and merge step two, issuing the Farmlytics number.
    ///
    /// `suffix` is the random three-digit tail (100..=999) chosen by the caller.
    pub fn submit_land(
        &mut self,
        details: LandDetails,
        year: i32,
        suffix: u16,
    ) -> Result<RegistrationStep, RegistrationError> {
        let aadhaar = self
            .aadhaar
            .clone()
            .ok_or(RegistrationError::PersonalDetailsMissing)?;
        let land_area = required("landArea", &details.land_area)?;
        let village = required("village", &details.village)?;
        let ulpin = details.ulpin.trim().to_string();
        validate_ulpin(&ulpin).map_err(|m| invalid("ulpin", m))?;

        let lpc_present = match details.lpc_type {
            LpcSource::Upload => !self.lpc_file_base64.as_deref().unwrap_or("").is_empty(),
            LpcSource::Text => !self.lpc_text.as_deref().unwrap_or("").trim().is_empty(),
        };
        if !lpc_present {
            return Err(invalid("lpc", "Land possession certificate is required"));
        }

        self.farmanalytics_number = Some(farmlytics_number(year, &aadhaar, &ulpin, suffix));
        self.land_area = Some(land_area);
        self.village = Some(village);
        self.ulpin = Some(ulpin);
        self.lpc_type = Some(details.lpc_type);
        Ok(RegistrationStep::IdCard)
    }
}

/// Whole years between `dob` and `today`
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> u32 {
    let mut age = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age.max(0) as u32
}

fn last_four(value: &str) -> &str {
    let start = value.len().saturating_sub(4);
    &value[start..]
}

/// `FA-<yy>-<aadhaar last 4>-<ulpin last 4>-<suffix>`
pub fn farmlytics_number(year: i32, aadhaar: &str, ulpin: &str, suffix: u16) -> String {
    let aadhaar_tail = if aadhaar.is_empty() { "0000" } else { last_four(aadhaar) };
    format!(
        "FA-{:02}-{}-{}-{}",
        year.rem_euclid(100),
        aadhaar_tail,
        last_four(ulpin),
        suffix.clamp(100, 999)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn personal() -> PersonalDetails {
        PersonalDetails {
            full_name: "  Sunita Devi ".to_string(),
            aadhaar: "123412345678".to_string(),
            mobile: "9876543210".to_string(),
            dob: Some(date(1990, 6, 15)),
        }
    }

    fn land(lpc_type: LpcSource) -> LandDetails {
        LandDetails {
            land_area: "2.5".to_string(),
            village: "Rampur".to_string(),
            ulpin: "11112222333344".to_string(),
            lpc_type,
        }
    }

    #[test]
    fn test_age_on_birthday_boundary() {
        assert_eq!(age_on(date(1990, 6, 15), date(2024, 6, 14)), 33);
        assert_eq!(age_on(date(1990, 6, 15), date(2024, 6, 15)), 34);
    }

    #[test]
    fn test_farmlytics_number_format() {
        assert_eq!(
            farmlytics_number(2024, "123412345678", "11112222333344", 417),
            "FA-24-5678-3344-417"
        );
        assert_eq!(farmlytics_number(2031, "", "11112222333344", 5), "FA-31-0000-3344-100");
    }

    #[test]
    fn test_personal_step_requires_photo() {
        let mut draft = RegistrationDraft::default();
        let err = draft.submit_personal(personal(), date(2024, 1, 1)).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::InvalidField {
                field: "farmerPhotoBase64",
                message: "A farmer photo is required"
            }
        );
    }

    #[test]
    fn test_personal_step_rejects_short_aadhaar() {
        let mut draft = RegistrationDraft {
            farmer_photo_base64: Some("data:image/png;base64,AAAA".to_string()),
            ..Default::default()
        };
        let mut details = personal();
        details.aadhaar = "12345".to_string();
        assert!(matches!(
            draft.submit_personal(details, date(2024, 1, 1)),
            Err(RegistrationError::InvalidField { field: "aadhaar", .. })
        ));
        assert!(draft.full_name.is_none());
    }

    #[test]
    fn test_full_flow_reaches_id_card() {
        let mut draft = RegistrationDraft {
            farmer_photo_base64: Some("data:image/png;base64,AAAA".to_string()),
            lpc_text: Some("Khasra 112/4".to_string()),
            ..Default::default()
        };
        assert_eq!(draft.resume_step(), RegistrationStep::PersonalDetails);

        let step = draft.submit_personal(personal(), date(2024, 6, 20)).unwrap();
        assert_eq!(step, RegistrationStep::LandDetails);
        assert_eq!(draft.full_name.as_deref(), Some("Sunita Devi"));
        assert_eq!(draft.age, Some(34));

        let step = draft.submit_land(land(LpcSource::Text), 2024, 321).unwrap();
        assert_eq!(step, RegistrationStep::IdCard);
        assert_eq!(draft.farmanalytics_number.as_deref(), Some("FA-24-5678-3344-321"));
        assert_eq!(draft.resume_step(), RegistrationStep::IdCard);
    }

    #[test]
    fn test_land_step_requires_uploaded_certificate() {
        let mut draft = RegistrationDraft {
            aadhaar: Some("123412345678".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            draft.submit_land(land(LpcSource::Upload), 2024, 100),
            Err(RegistrationError::InvalidField { field: "lpc", .. })
        ));
    }

    #[test]
    fn test_land_step_before_personal() {
        let mut draft = RegistrationDraft::default();
        assert_eq!(
            draft.submit_land(land(LpcSource::Text), 2024, 100),
            Err(RegistrationError::PersonalDetailsMissing)
        );
    }

    #[test]
    fn test_draft_json_uses_stored_keys() {
        let draft = RegistrationDraft {
            full_name: Some("Sunita".to_string()),
            farmanalytics_number: Some("FA-24-5678-3344-321".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["fullName"], "Sunita");
        assert_eq!(json["farmanalyticsNumber"], "FA-24-5678-3344-321");
        assert!(json.get("aadhaar").is_none());
    }
}
