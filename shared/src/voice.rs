//! Speech capability abstraction
//!
//! Voice capture and synthesis exist only on some platforms. Callers ask the
//! capability what it supports instead of assuming it is there.

use crate::types::Language;

/// Platform speech features used by the voice assistant
pub trait VoiceCapability {
    /// Whether speech-to-text capture is available
    fn can_listen(&self) -> bool;

    /// Whether text-to-speech is available
    fn can_speak(&self) -> bool;

    /// Speak `text`, cancelling anything already being spoken.
    /// Returns false when nothing was spoken.
    fn speak(&self, text: &str, language: Language) -> bool;

    /// Stop any ongoing speech
    fn cancel(&self);
}

/// Capability for platforms without speech support
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVoice;

impl VoiceCapability for NoVoice {
    fn can_listen(&self) -> bool {
        false
    }

    fn can_speak(&self) -> bool {
        false
    }

    fn speak(&self, _text: &str, _language: Language) -> bool {
        false
    }

    fn cancel(&self) {}
}

/// Strip markdown emphasis and bullets so synthesized speech reads cleanly
pub fn speakable_text(text: &str) -> String {
    text.lines()
        .map(|line| {
            line.trim()
                .trim_start_matches(|c| c == '-' || c == '*' || c == '#' || c == '•')
                .replace("**", "")
                .trim()
                .to_string()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_voice_reports_absent() {
        let voice = NoVoice;
        assert!(!voice.can_listen());
        assert!(!voice.can_speak());
        assert!(!voice.speak("Namaste", Language::Hindi));
    }

    #[test]
    fn test_speakable_text() {
        let text = "**Namaste!**\n\n- Water early\n* Use neem oil\n## Tips";
        assert_eq!(speakable_text(text), "Namaste! Water early Use neem oil Tips");
    }
}
