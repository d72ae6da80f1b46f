//! Conversational assistant models

use serde::{Deserialize, Serialize};

/// Number of prior turns forwarded to the assistant model
pub const ASSISTANT_CONTEXT_TURNS: usize = 5;

/// Speaker of a chat turn
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One turn of the assistant transcript
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

/// The last `limit` turns of `history`, in their original order.
///
/// Older turns are dropped silently; this is a fixed window, not a token
/// budget.
pub fn context_window(history: &[ChatTurn], limit: usize) -> &[ChatTurn] {
    let start = history.len().saturating_sub(limit);
    &history[start..]
}
