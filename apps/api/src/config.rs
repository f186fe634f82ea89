use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Nothing is strictly required: without `OPENAI_API_KEY` the AI routes serve demo content.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub upload_dir: String,
    pub notification_interval_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_base_url: optional_env("OPENAI_BASE_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            openai_model: optional_env("OPENAI_MODEL")
                .unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            upload_dir: optional_env("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()),
            notification_interval_secs: parse_or(optional_env("NOTIFICATION_INTERVAL_SECS"), 12)
                .context("NOTIFICATION_INTERVAL_SECS must be a whole number of seconds")?,
            port: parse_or(optional_env("PORT"), 8080)
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Reads an env var, treating an empty or whitespace-only value as unset.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a setting, falling back to `default` when it is unset.
fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> Result<T, T::Err> {
    raw.map_or(Ok(default), |v| v.parse())
}

#[cfg(test)]
impl Config {
    /// Offline configuration used by handler tests.
    pub fn for_tests(upload_dir: &str) -> Self {
        Config {
            openai_api_key: None,
            openai_base_url: "http://127.0.0.1:9".to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            upload_dir: upload_dir.to_string(),
            notification_interval_secs: 12,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_defaults_and_rejects_garbage() {
        assert_eq!(parse_or::<u16>(None, 8080).unwrap(), 8080);
        assert_eq!(parse_or::<u16>(Some("3000".to_string()), 8080).unwrap(), 3000);
        assert!(parse_or::<u16>(Some("http".to_string()), 8080).is_err());
    }

    #[test]
    fn test_optional_env_treats_empty_as_unset() {
        std::env::set_var("DEALROOM_TEST_EMPTY_PORT", "");
        assert_eq!(optional_env("DEALROOM_TEST_EMPTY_PORT"), None);
        assert_eq!(
            parse_or::<u16>(optional_env("DEALROOM_TEST_EMPTY_PORT"), 8080).unwrap(),
            8080
        );
        std::env::set_var("DEALROOM_TEST_EMPTY_PORT", " 9000 ");
        assert_eq!(
            parse_or::<u16>(optional_env("DEALROOM_TEST_EMPTY_PORT"), 8080).unwrap(),
            9000
        );
        std::env::remove_var("DEALROOM_TEST_EMPTY_PORT");
    }
}
