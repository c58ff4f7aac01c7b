use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_GEMINI_FALLBACK_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_SESSION_IDLE_TTL_SECS: u64 = 2 * 60 * 60;
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECS: u64 = 5 * 60;

/// Application configuration loaded from environment variables.
///
/// Only the listen address and generation parameters must parse; a missing
/// `GEMINI_API_KEY` is allowed and makes the advisor answer with its
/// "not configured" result instead of calling out.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_fallback_model: String,
    pub gemini_base_url: String,
    pub generation: GenerationSettings,
    /// Sessions untouched for this long are evicted.
    pub session_idle_ttl: Duration,
    pub session_sweep_interval: Duration,
    pub port: u16,
    pub rust_log: String,
}

/// Sampling parameters forwarded verbatim in `generationConfig`.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            max_output_tokens: 2000,
            top_p: 0.95,
            top_k: 40,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = GenerationSettings::default();

        let sweep_secs: u64 = parse_env(
            "SESSION_SWEEP_INTERVAL_SECS",
            DEFAULT_SESSION_SWEEP_INTERVAL_SECS,
        )?;
        if sweep_secs == 0 {
            bail!("Environment variable 'SESSION_SWEEP_INTERVAL_SECS' must be greater than zero");
        }

        Ok(Config {
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: optional_env("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_fallback_model: optional_env("GEMINI_FALLBACK_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_FALLBACK_MODEL.to_string()),
            gemini_base_url: optional_env("GEMINI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            generation: GenerationSettings {
                temperature: parse_env("GEMINI_TEMPERATURE", defaults.temperature)?,
                max_output_tokens: parse_env(
                    "GEMINI_MAX_OUTPUT_TOKENS",
                    defaults.max_output_tokens,
                )?,
                top_p: parse_env("GEMINI_TOP_P", defaults.top_p)?,
                top_k: parse_env("GEMINI_TOP_K", defaults.top_k)?,
            },
            session_idle_ttl: Duration::from_secs(parse_env(
                "SESSION_IDLE_TTL_SECS",
                DEFAULT_SESSION_IDLE_TTL_SECS,
            )?),
            session_sweep_interval: Duration::from_secs(sweep_secs),
            port: parse_env("PORT", 8080u16)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Returns the variable's value, treating unset and blank the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
