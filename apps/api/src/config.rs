use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::scoring::cache::DEFAULT_TTL;
use crate::scoring::model::ModelPaths;

pub const DEFAULT_GEMINI_MODELS: &str = "gemini-2.0-flash-lite";

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    /// Model identifiers in fallback order.
    pub gemini_models: Vec<String>,
    pub model_paths: ModelPaths,
    pub model_cache_ttl: Duration,
    pub rate_limit: usize,
    pub rate_window: Duration,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let models_dir = PathBuf::from(optional_env("MODELS_DIR", "models"));
        let defaults = ModelPaths::in_dir(&models_dir);
        let model_paths = ModelPaths {
            regressor: path_env("SCORING_MODEL_PATH", defaults.regressor),
            vectorizer: path_env("VECTORIZER_PATH", defaults.vectorizer),
            section_encoder: path_env("SECTION_ENCODER_PATH", defaults.section_encoder),
        };

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_models: parse_model_list(&optional_env("GEMINI_MODELS", DEFAULT_GEMINI_MODELS))?,
            model_paths,
            model_cache_ttl: Duration::from_secs(parse_env("MODEL_CACHE_TTL_SECS", DEFAULT_TTL.as_secs())?),
            rate_limit: parse_env("RATE_LIMIT", 100)?,
            rate_window: Duration::from_secs(parse_env("RATE_WINDOW_SECS", 3600)?),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            port: parse_env("PORT", 8000)?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

/// Splits a comma-separated model list, dropping blanks. At least one model is required.
pub fn parse_model_list(raw: &str) -> Result<Vec<String>> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();
    anyhow::ensure!(!models.is_empty(), "GEMINI_MODELS must name at least one model");
    Ok(models)
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn path_env(key: &str, default: PathBuf) -> PathBuf {
    std::env::var_os(key).map(PathBuf::from).unwrap_or(default)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_list_keeps_order() {
        let models = parse_model_list(" gemini-2.0-flash-lite , gemini-1.5-flash,,").unwrap();
        assert_eq!(models, ["gemini-2.0-flash-lite", "gemini-1.5-flash"]);
    }

    #[test]
    fn test_parse_model_list_rejects_empty() {
        assert!(parse_model_list(" , ").is_err());
    }

    #[test]
    fn test_parse_env_default_and_error() {
        // variable names unique to this test so parallel tests do not interfere
        std::env::remove_var("CVSCORE_TEST_UNSET_NUMBER");
        assert_eq!(parse_env::<u16>("CVSCORE_TEST_UNSET_NUMBER", 8000).unwrap(), 8000);

        std::env::set_var("CVSCORE_TEST_BAD_NUMBER", "eighty");
        assert!(parse_env::<u16>("CVSCORE_TEST_BAD_NUMBER", 8000).is_err());
    }
}
