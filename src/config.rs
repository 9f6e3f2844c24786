// src/config.rs
use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::services::gemini::GeminiConfig;

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Where `GET /` gets its content from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Landing {
    /// Inline "you are connected" banner, no static assets.
    Banner,
    /// Pre-built front-end: `index.html` at `/`, the rest of the tree as fallback.
    StaticDir(PathBuf),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub landing: Landing,
    pub gemini: GeminiConfig,
}

impl Config {
    /// Read configuration from the process environment (call `dotenvy::dotenv()` first).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = GeminiConfig::default();

        let gemini = GeminiConfig {
            api_key: lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty()),
            base_url: lookup("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            model: lookup("GEMINI_MODEL").unwrap_or(defaults.model),
            temperature: parse_or(&lookup, "GEMINI_TEMPERATURE", defaults.temperature)?,
            top_p: parse_or(&lookup, "GEMINI_TOP_P", defaults.top_p)?,
            max_output_tokens: parse_or(
                &lookup,
                "GEMINI_MAX_OUTPUT_TOKENS",
                defaults.max_output_tokens,
            )?,
            system_instruction: match lookup("GEMINI_SYSTEM_INSTRUCTION") {
                Some(s) if s.is_empty() => None,
                Some(s) => Some(s),
                None => defaults.system_instruction,
            },
            timeout: parse_opt::<u64, _>(&lookup, "GEMINI_TIMEOUT_SECS")?.map(Duration::from_secs),
        };

        let landing = match lookup("STATIC_DIR") {
            Some(dir) if !dir.trim().is_empty() => Landing::StaticDir(PathBuf::from(dir)),
            _ => Landing::Banner,
        };

        Ok(Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            landing,
            gemini,
        })
    }
}

fn parse_opt<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse_opt(lookup, key)?.unwrap_or(default))
}
