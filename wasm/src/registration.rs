//! Registration form bound to browser local storage

use chrono::NaiveDate;
use shared::{
    LandDetails, PersonalDetails, RegistrationDraft, RegistrationStep, REGISTRATION_STORAGE_KEY,
};
use wasm_bindgen::prelude::*;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

fn today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
}

/// Three-digit tail of the Farmlytics number, 100..=999
fn random_suffix() -> u16 {
    100 + (js_sys::Math::random() * 900.0).floor() as u16
}

fn step_name(step: RegistrationStep) -> String {
    match step {
        RegistrationStep::PersonalDetails => "personalDetails",
        RegistrationStep::LandDetails => "landDetails",
        RegistrationStep::IdCard => "idCard",
    }
    .to_string()
}

fn js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Two-step Farmlytics ID registration
#[wasm_bindgen]
pub struct RegistrationForm {
    draft: RegistrationDraft,
}

#[wasm_bindgen]
impl RegistrationForm {
    /// Load the saved draft; an unreadable one starts fresh
    #[wasm_bindgen(constructor)]
    pub fn load() -> RegistrationForm {
        let draft = local_storage()
            .and_then(|s| s.get_item(REGISTRATION_STORAGE_KEY).ok().flatten())
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        RegistrationForm { draft }
    }

    /// Step to show after loading
    #[wasm_bindgen(js_name = resumeStep)]
    pub fn resume_step(&self) -> String {
        step_name(self.draft.resume_step())
    }

    #[wasm_bindgen(js_name = draftJson)]
    pub fn draft_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.draft).map_err(js_error)
    }

    #[wasm_bindgen(js_name = attachPhoto)]
    pub fn attach_photo(&mut self, base64: String) -> Result<(), JsValue> {
        self.draft.farmer_photo_base64 = Some(base64);
        self.save()
    }

    #[wasm_bindgen(js_name = attachLpcFile)]
    pub fn attach_lpc_file(&mut self, base64: String) -> Result<(), JsValue> {
        self.draft.lpc_file_base64 = Some(base64);
        self.save()
    }

    #[wasm_bindgen(js_name = setLpcText)]
    pub fn set_lpc_text(&mut self, text: String) -> Result<(), JsValue> {
        self.draft.lpc_text = Some(text);
        self.save()
    }

    /// Validate step one; returns the next step
    #[wasm_bindgen(js_name = submitPersonal)]
    pub fn submit_personal(&mut self, details_json: &str) -> Result<String, JsValue> {
        let details: PersonalDetails = serde_json::from_str(details_json).map_err(js_error)?;
        let today = today().ok_or_else(|| JsValue::from_str("Invalid system date"))?;

        let next = self.draft.submit_personal(details, today).map_err(js_error)?;
        self.save()?;
        Ok(step_name(next))
    }

    /// Validate step two; returns the issued Farmlytics number
    #[wasm_bindgen(js_name = submitLand)]
    pub fn submit_land(&mut self, details_json: &str) -> Result<String, JsValue> {
        let details: LandDetails = serde_json::from_str(details_json).map_err(js_error)?;
        let year = js_sys::Date::new_0().get_full_year() as i32;

        self.draft
            .submit_land(details, year, random_suffix())
            .map_err(js_error)?;
        self.save()?;

        Ok(self.draft.farmanalytics_number.clone().unwrap_or_default())
    }

    /// Forget the draft
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.draft = RegistrationDraft::default();
        match local_storage() {
            Some(storage) => storage.remove_item(REGISTRATION_STORAGE_KEY),
            None => Ok(()),
        }
    }

    fn save(&self) -> Result<(), JsValue> {
        let Some(storage) = local_storage() else {
            return Ok(());
        };
        let raw = serde_json::to_string(&self.draft).map_err(js_error)?;
        storage.set_item(REGISTRATION_STORAGE_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_names() {
        assert_eq!(step_name(RegistrationStep::PersonalDetails), "personalDetails");
        assert_eq!(step_name(RegistrationStep::IdCard), "idCard");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_draft_survives_reload() {
        let mut form = RegistrationForm::load();
        form.reset().unwrap();
        form.attach_photo("aGVsbG8=".to_string()).unwrap();

        let reloaded = RegistrationForm::load();
        assert!(reloaded.draft_json().unwrap().contains("aGVsbG8="));
        assert_eq!(reloaded.resume_step(), "personalDetails");
    }

    #[wasm_bindgen_test]
    fn test_suffix_in_range() {
        for _ in 0..50 {
            let suffix = random_suffix();
            assert!((100..=999).contains(&suffix));
        }
    }
}
