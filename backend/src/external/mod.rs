//! External API integrations

pub mod ai_gateway;

pub use ai_gateway::{AiGatewayClient, ChatMessage};
