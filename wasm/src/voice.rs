//! Browser speech synthesis
//!
//! Speech recognition is not exposed through stable web-sys bindings, so the
//! browser capability only speaks.

use shared::{speakable_text, Language, VoiceCapability};
use wasm_bindgen::prelude::*;

fn synthesis() -> Option<web_sys::SpeechSynthesis> {
    web_sys::window()?.speech_synthesis().ok()
}

/// Speech capability backed by `window.speechSynthesis`
#[wasm_bindgen]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserVoice;

impl VoiceCapability for BrowserVoice {
    fn can_listen(&self) -> bool {
        false
    }

    fn can_speak(&self) -> bool {
        synthesis().is_some()
    }

    fn speak(&self, text: &str, language: Language) -> bool {
        let Some(synth) = synthesis() else {
            return false;
        };
        let text = speakable_text(text);
        if text.is_empty() {
            return false;
        }

        let Ok(utterance) = web_sys::SpeechSynthesisUtterance::new_with_text(&text) else {
            return false;
        };
        utterance.set_lang(language.speech_tag());

        synth.cancel();
        synth.speak(&utterance);
        true
    }

    fn cancel(&self) {
        if let Some(synth) = synthesis() {
            synth.cancel();
        }
    }
}

#[wasm_bindgen]
impl BrowserVoice {
    #[wasm_bindgen(constructor)]
    pub fn new() -> BrowserVoice {
        BrowserVoice
    }

    #[wasm_bindgen(js_name = canListen)]
    pub fn js_can_listen(&self) -> bool {
        self.can_listen()
    }

    #[wasm_bindgen(js_name = canSpeak)]
    pub fn js_can_speak(&self) -> bool {
        self.can_speak()
    }

    /// Speak in `"en"` or `"hi"`
    #[wasm_bindgen(js_name = speak)]
    pub fn js_speak(&self, text: &str, language: &str) -> bool {
        let language = match language {
            "hi" => Language::Hindi,
            _ => Language::English,
        };
        self.speak(text, language)
    }

    #[wasm_bindgen(js_name = cancel)]
    pub fn js_cancel(&self) {
        self.cancel()
    }
}
