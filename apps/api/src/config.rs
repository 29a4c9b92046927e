use anyhow::{Context, Result};

/// Default Doubao (Volcengine Ark) chat-completions endpoint.
pub const DEFAULT_DOUBAO_API_URL: &str =
    "https://ark.cn-beijing.volces.com/api/v3/chat/completions";

/// Application configuration loaded from environment variables.
/// Panics at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub doubao_api_url: String,
    pub doubao_api_key: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            doubao_api_url: std::env::var("DOUBAO_API_URL")
                .unwrap_or_else(|_| DEFAULT_DOUBAO_API_URL.to_string()),
            doubao_api_key: require_env("DOUBAO_API_KEY")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
