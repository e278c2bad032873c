use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable is optional; a value that is present but malformed is a startup error.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absent ⇒ offline mode: every step uses the fallback generator.
    pub anthropic_api_key: Option<String>,
    /// Absent ⇒ templates live in process memory.
    pub redis_url: Option<String>,
    pub session_ttl_secs: u64,
    pub llm_timeout_secs: u64,
    /// Minimum completeness score reported as `canProceed`.
    pub progression_threshold: u8,
    pub scoring_weights_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            redis_url: None,
            session_ttl_secs: 86_400,
            llm_timeout_secs: 60,
            progression_threshold: 60,
            scoring_weights_path: None,
            port: 8080,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            redis_url: optional("REDIS_URL"),
            session_ttl_secs: optional("SESSION_TTL_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("SESSION_TTL_SECS must be a whole number of seconds")?
                .unwrap_or(defaults.session_ttl_secs),
            llm_timeout_secs: optional("LLM_TIMEOUT_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("LLM_TIMEOUT_SECS must be a whole number of seconds")?
                .unwrap_or(defaults.llm_timeout_secs),
            progression_threshold: optional("PROGRESSION_THRESHOLD")
                .map(|v| v.parse::<u8>())
                .transpose()
                .context("PROGRESSION_THRESHOLD must be an integer between 0 and 100")?
                .map(|t| t.min(100))
                .unwrap_or(defaults.progression_threshold),
            scoring_weights_path: optional("SCORING_WEIGHTS_PATH").map(PathBuf::from),
            port: optional("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert!(config.anthropic_api_key.is_none());
        assert!(config.redis_url.is_none());
        assert_eq!(config.session_ttl_secs, 86_400);
        assert_eq!(config.llm_timeout_secs, 60);
        assert_eq!(config.progression_threshold, 60);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = config_from(&[("ANTHROPIC_API_KEY", "  "), ("REDIS_URL", "")]).unwrap();
        assert!(config.anthropic_api_key.is_none());
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("REDIS_URL", "redis://localhost:6379"),
            ("SESSION_TTL_SECS", "3600"),
            ("PROGRESSION_THRESHOLD", "300"),
            ("PORT", "3000"),
        ]);
        assert!(config.is_err(), "300 does not fit u8");

        let config = config_from(&[
            ("ANTHROPIC_API_KEY", "sk-test"),
            ("SESSION_TTL_SECS", "3600"),
            ("PROGRESSION_THRESHOLD", "120"),
            ("PORT", "3000"),
        ])
        .unwrap();
        assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.session_ttl_secs, 3600);
        assert_eq!(config.progression_threshold, 100);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_malformed_values_are_errors() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("LLM_TIMEOUT_SECS", "-1")]).is_err());
    }
}
