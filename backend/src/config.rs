//! Configuration management for the Farmlytics platform
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with FARMLYTICS_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Which store backs the API
    pub store: StoreConfig,

    /// Database configuration (postgres store only)
    pub database: DatabaseConfig,

    /// JWT session verification
    pub jwt: JwtConfig,

    /// AI completion gateway used by the relay endpoints
    pub ai: AiConfig,

    /// Change feed settings
    pub realtime: RealtimeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret shared with the auth provider for HS256 session tokens
    pub secret: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// Chat-completions endpoint
    pub endpoint: String,

    /// Bearer credential for the gateway
    pub api_key: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Sampling temperature for the conversational assistant
    pub chat_temperature: f32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RealtimeConfig {
    /// Buffered change events per subscriber before it lags
    pub channel_capacity: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("FARMLYTICS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("store.backend", "postgres")?
            .set_default("database.url", "")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("ai.endpoint", "https://ai.gateway.lovable.dev/v1/chat/completions")?
            .set_default("ai.api_key", "")?
            .set_default("ai.model", "google/gemini-2.5-flash")?
            .set_default("ai.chat_temperature", 1.1)?
            .set_default("ai.timeout_secs", 60)?
            .set_default("realtime.channel_capacity", 256)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (FARMLYTICS_ prefix)
            .add_source(
                Environment::with_prefix("FARMLYTICS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://ai.gateway.lovable.dev/v1/chat/completions".to_string(),
            api_key: String::new(),
            model: "google/gemini-2.5-flash".to_string(),
            chat_temperature: 1.1,
            timeout_secs: 60,
        }
    }
}
