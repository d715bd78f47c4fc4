use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
///
/// Only the LLM provider key is hard-required. `DATABASE_URL` and
/// `ADMIN_LOG_KEY` are optional: without them the interaction log and the
/// admin read path degrade (no-op writes / config error on access) while the
/// plan and chat endpoints keep working.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub anthropic_api_key: String,
    pub admin_log_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: optional_env("DATABASE_URL"),
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            admin_log_key: optional_env("ADMIN_LOG_KEY"),
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

/// Returns `None` for unset or empty variables so a blank `DATABASE_URL=`
/// line in a .env file behaves like an absent one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
