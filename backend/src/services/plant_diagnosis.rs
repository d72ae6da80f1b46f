//! Plant diagnosis relay: one multimodal completion per image, parsed into a
//! structured result

use shared::DiagnosisResult;

use crate::error::{AppError, AppResult};
use crate::external::{AiGatewayClient, ChatMessage};

/// Disease name used when the answer names none
pub const UNDETERMINED_DISEASE: &str = "Undetermined";

const SYSTEM_PROMPT: &str = r#"You are an expert agricultural AI assistant specializing in plant disease diagnosis for Indian agriculture.

CRITICAL INSTRUCTIONS:
- Provide HIGHLY ACCURATE and PRECISE diagnosis based on visual symptoms
- Give DETAILED, ACTIONABLE treatment recommendations
- Consider Indian climate, crop varieties, and local farming practices
- Be specific about disease names, stages, and severity
- Include both organic and chemical treatment options with exact dosages
- Mention preventive measures to avoid recurrence

Start your answer with exactly these two lines:
Disease: <name of the disease, pest or deficiency, or "Healthy">
Confidence: <a whole number from 0 to 100>%

DIAGNOSIS FORMAT:
1. **Disease Identification**: Exact name and type of disease/pest/deficiency
2. **Severity Level**: Mild/Moderate/Severe
3. **Affected Parts**: Which parts of the plant are affected
4. **Stage**: Early/Progressive/Advanced stage
5. **Immediate Action**: What to do right now (within 24-48 hours)
6. **Treatment Plan**:
   - Organic solutions (neem oil, bio-pesticides, home remedies)
   - Chemical solutions (exact names, dosages, application method)
   - Application frequency and duration
7. **Prevention**: Steps to prevent future occurrences
8. **Additional Care**: Watering, nutrition, sunlight requirements
9. **Expected Recovery Time**: Realistic timeline for improvement
10. **Warning Signs**: When to seek expert help or discard plants

Be compassionate but scientifically accurate. Indian farmers depend on precise information."#;

const USER_INSTRUCTION: &str = "Analyze this plant image carefully. Identify any diseases, pests, \
nutrient deficiencies, or health issues. Provide a comprehensive diagnosis following the format \
specified in your system instructions. Be extremely precise and detailed in your recommendations.";

/// Plant diagnosis relay service
#[derive(Clone)]
pub struct PlantDiagnosisService {
    client: AiGatewayClient,
}

impl PlantDiagnosisService {
    pub fn new(client: AiGatewayClient) -> Self {
        Self { client }
    }

    /// Messages sent upstream for one image
    pub fn build_messages(image_url: &str) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user_with_image(USER_INSTRUCTION, image_url),
        ]
    }

    pub async fn diagnose(&self, image_url: &str) -> AppResult<DiagnosisResult> {
        let image_url = image_url.trim();
        if image_url.is_empty() {
            return Err(AppError::validation("imageUrl", "Image URL is required"));
        }

        let answer = self
            .client
            .complete(&Self::build_messages(image_url), None)
            .await?;

        let result = parse_diagnosis(&answer);
        tracing::info!(
            disease = %result.disease,
            confidence = result.confidence,
            "plant diagnosis completed"
        );
        Ok(result)
    }
}

/// Pull disease, confidence and recommendations out of a free-text answer
pub fn parse_diagnosis(answer: &str) -> DiagnosisResult {
    DiagnosisResult {
        diagnosis: answer.to_string(),
        disease: parse_disease(answer).unwrap_or_else(|| UNDETERMINED_DISEASE.to_string()),
        confidence: parse_confidence(answer).unwrap_or(0),
        recommendations: parse_recommendations(answer).unwrap_or_else(|| answer.to_string()),
    }
}

/// Lowercased line label with list markers and emphasis stripped
fn label(line: &str) -> String {
    line.trim_start_matches(|c: char| {
        c.is_ascii_digit() || c.is_whitespace() || matches!(c, '*' | '#' | '-' | '.' | ')')
    })
    .to_lowercase()
}

fn parse_disease(answer: &str) -> Option<String> {
    answer.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if !label(key).starts_with("disease") {
            return None;
        }
        let value = value.trim().trim_matches('*').trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

fn parse_confidence(answer: &str) -> Option<i32> {
    answer
        .lines()
        .find_map(|line| {
            let line = line.to_lowercase();
            let at = line.find("confidence")?;
            first_number(&line[at..])
        })
        .map(|n| n.clamp(0, 100) as i32)
}

fn first_number(line: &str) -> Option<i64> {
    let start = line.find(|c: char| c.is_ascii_digit())?;
    let digits: String = line[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    // Absurdly long digit runs saturate rather than fail
    Some(digits.parse::<i64>().unwrap_or(i64::MAX))
}

fn parse_recommendations(answer: &str) -> Option<String> {
    let lines: Vec<&str> = answer.lines().collect();
    let start = lines.iter().position(|line| {
        let label = label(line);
        label.starts_with("treatment plan")
            || label.starts_with("recommendation")
            || label.starts_with("immediate action")
    })?;
    let section = lines[start..].join("\n").trim().to_string();
    (!section.is_empty()).then_some(section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::ai_gateway::MessageContent;

    const ANSWER: &str = "Disease: Leaf Blight\nConfidence: 78%\n\n\
        1. **Disease Identification**: Early blight caused by Alternaria solani\n\
        5. **Immediate Action**: Remove infected leaves\n\
        6. **Treatment Plan**:\n   - Neem oil 5 ml per litre";

    #[test]
    fn test_parses_leading_lines() {
        let result = parse_diagnosis(ANSWER);
        assert_eq!(result.disease, "Leaf Blight");
        assert_eq!(result.confidence, 78);
        assert_eq!(result.diagnosis, ANSWER);
        assert!(result
            .recommendations
            .starts_with("5. **Immediate Action**: Remove infected leaves"));
        assert!(result.recommendations.contains("Neem oil"));
    }

    #[test]
    fn test_bold_identification_line() {
        let answer = "1. **Disease Identification**: **Powdery Mildew**\n\
            2. **Severity Level**: Moderate, confidence around 65 percent";
        let result = parse_diagnosis(answer);
        assert_eq!(result.disease, "Powdery Mildew");
        assert_eq!(result.confidence, 65);
    }

    #[test]
    fn test_fallbacks_when_fields_missing() {
        let answer = "The plant looks stressed, water it more often.";
        let result = parse_diagnosis(answer);
        assert_eq!(result.disease, UNDETERMINED_DISEASE);
        assert_eq!(result.confidence, 0);
        assert_eq!(result.recommendations, answer);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let result = parse_diagnosis("Disease: Rust\nConfidence: 250%");
        assert_eq!(result.confidence, 100);
    }

    #[test]
    fn test_messages_carry_image() {
        let messages = PlantDiagnosisService::build_messages("https://img.example/leaf.jpg");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        match &messages[1].content {
            MessageContent::Parts(parts) => assert_eq!(parts.len(), 2),
            other => panic!("expected multimodal content, got {:?}", other),
        }
    }
}
