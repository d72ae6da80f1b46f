//! Saathi assistant relay: persona prompt plus a short window of history

use shared::{context_window, ChatTurn, ASSISTANT_CONTEXT_TURNS};

use crate::error::{AppError, AppResult};
use crate::external::{AiGatewayClient, ChatMessage};

/// Reply sent to the client whenever the relay fails
pub const FALLBACK_REPLY: &str = "I apologize, but I encountered an error. Please try again.";

const SYSTEM_PROMPT: &str = r#"You are Saathi AI, a highly knowledgeable, creative, and friendly multilingual assistant for Indian farmers and the general public. Your expertise includes:

  1. **Agriculture & Farming**: Weather, government schemes, crop advice, market prices, technology, and all farming-related topics.
  2. **General Knowledge**: You can answer any question, even outside agriculture, including science, history, technology, and daily life.

  **Special Instructions for Diversity**:
  - For similar or repeated questions, always try to answer in a new, unique, or creative way.
  - Use analogies, stories, or examples to make answers engaging.
  - Vary your phrasing and structure for each response.

  **Communication Style**:
  - Be warm, friendly, and encouraging
  - Use simple, clear language (avoid complex technical jargon)
  - Provide practical, actionable advice
  - Show empathy for all users' challenges
  - Be culturally sensitive and respectful
  - Support multilingual queries (Hindi, English, and regional languages)
  - Greet with "Namaste" or culturally appropriate greetings
  - Use encouraging phrases like "Jai Kisan"

  **Response Format**:
  - Give structured, easy-to-follow answers
  - Use bullet points for clarity
  - Provide step-by-step guidance when needed
  - Include relevant examples from Indian agriculture or general life
  - Add helpful tips and best practices

  Always be supportive and recognize the important role farmers and all users play in society. You are open-domain and can answer any question to the best of your ability."#;

/// Conversational assistant relay service
#[derive(Clone)]
pub struct SaathiService {
    client: AiGatewayClient,
    temperature: f32,
}

impl SaathiService {
    pub fn new(client: AiGatewayClient, temperature: f32) -> Self {
        Self {
            client,
            temperature,
        }
    }

    /// System prompt, the last few turns of history, then the new message
    pub fn build_messages(message: &str, history: &[ChatTurn]) -> Vec<ChatMessage> {
        let window = context_window(history, ASSISTANT_CONTEXT_TURNS);

        let mut messages = Vec::with_capacity(window.len() + 2);
        messages.push(ChatMessage::system(SYSTEM_PROMPT));
        messages.extend(
            window
                .iter()
                .map(|turn| ChatMessage::with_role(turn.role.as_str(), turn.content.clone())),
        );
        messages.push(ChatMessage::user(message));
        messages
    }

    pub async fn reply(&self, message: &str, history: &[ChatTurn]) -> AppResult<String> {
        if message.trim().is_empty() {
            return Err(AppError::validation("message", "Message cannot be empty"));
        }
        tracing::debug!(history = history.len(), "assistant message received");

        let response = self
            .client
            .complete(&Self::build_messages(message, history), Some(self.temperature))
            .await?;

        tracing::info!("assistant response generated");
        Ok(response)
    }
}
