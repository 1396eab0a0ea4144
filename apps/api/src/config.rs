use anyhow::{Context, Result};

/// Application configuration loaded from environment variables once at
/// startup. None of these affect the extraction algorithm itself, only which
/// external model and store are used.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub api_endpoint: String,
    pub openai_api_key: String,
    pub api_version: String,
    pub model: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            api_endpoint: require_env("API_ENDPOINT")?,
            openai_api_key: require_env("OPENAI_API_KEY")?,
            api_version: require_env("API_VERSION")?,
            model: require_env("OPENAI_MODEL")?,
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
