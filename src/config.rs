use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set (copy .env.example to .env)")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Settings read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub port: u16,
    pub static_dir: PathBuf,
    pub document_char_limit: usize,
    pub max_history: usize,
    /// Idle sessions are evicted only when `SESSION_IDLE_MINUTES` is set.
    pub session_idle: Option<Duration>,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("GROQ_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("GROQ_API_KEY"))?;

        let document_char_limit: usize = parse_or(&lookup, "DOCUMENT_CHAR_LIMIT", 6000)?;
        if document_char_limit == 0 {
            return Err(ConfigError::Invalid { name: "DOCUMENT_CHAR_LIMIT", value: "0".to_string() });
        }

        let idle_minutes: Option<u64> = match lookup("SESSION_IDLE_MINUTES") {
            None => None,
            Some(_) => Some(parse_or(&lookup, "SESSION_IDLE_MINUTES", 0)?),
        };
        if idle_minutes == Some(0) {
            return Err(ConfigError::Invalid { name: "SESSION_IDLE_MINUTES", value: "0".to_string() });
        }

        Ok(Self {
            api_key,
            base_url: lookup("GROQ_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            static_dir: lookup("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("frontend/dist")),
            document_char_limit,
            max_history: parse_or(&lookup, "MAX_HISTORY", 6)?,
            session_idle: idle_minutes.map(|m| Duration::from_secs(m * 60)),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
