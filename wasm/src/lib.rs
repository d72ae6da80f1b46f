//! WebAssembly module for the Farmlytics web client
//!
//! Provides client-side logic for:
//! - The Farmlytics ID registration draft (local storage)
//! - Conversation addressing and assistant context trimming
//! - Browser speech synthesis

use uuid::Uuid;
use wasm_bindgen::prelude::*;

mod registration;
mod voice;

pub use registration::RegistrationForm;
pub use voice::BrowserVoice;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Canonical `[participant1, participant2]` for two user ids
#[wasm_bindgen]
pub fn conversation_participants(a: &str, b: &str) -> Result<js_sys::Array, JsValue> {
    let a = Uuid::parse_str(a).map_err(|e| JsValue::from_str(&format!("Invalid user id: {}", e)))?;
    let b = Uuid::parse_str(b).map_err(|e| JsValue::from_str(&format!("Invalid user id: {}", e)))?;
    if a == b {
        return Err(JsValue::from_str("Cannot start a conversation with yourself"));
    }

    let (lo, hi) = canonical_participants(a, b);
    let pair = js_sys::Array::new();
    pair.push(&JsValue::from_str(&lo.to_string()));
    pair.push(&JsValue::from_str(&hi.to_string()));
    Ok(pair)
}

/// The turns of a JSON chat history that the assistant will actually see
#[wasm_bindgen]
pub fn assistant_context(history_json: &str) -> Result<String, JsValue> {
    let history: Vec<ChatTurn> = serde_json::from_str(history_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid history JSON: {}", e)))?;

    serde_json::to_string(context_window(&history, ASSISTANT_CONTEXT_TURNS))
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Validate a product listing before it is sent
#[wasm_bindgen]
pub fn validate_listing(category: &str, unit: &str) -> Option<String> {
    validate_category(category)
        .and_then(|_| validate_unit(unit))
        .err()
        .map(str::to_string)
}
