use conductor_core::ConductorConfig;
use conductor_core::selector::RotationPolicy;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Which judgment collaborator backs the conductor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Gemini,
    /// Offline rules; no API key needed.
    Heuristic,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    /// Completed sessions are archived to Postgres only when this is set.
    pub database_url: Option<String>,
    pub provider: Provider,
    pub openai_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
    pub chat_model: String,
    pub log_level: Level,
    pub prompts_path: PathBuf,
    pub conductor: ConductorConfig,
}

/// Reads an optional variable and parses it, keeping `default` when unset.
fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let provider_str =
            std::env::var("JUDGMENT_PROVIDER").unwrap_or_else(|_| "openai".to_string());
        let provider = match provider_str.to_lowercase().as_str() {
            "openai" => Provider::OpenAI,
            "gemini" => Provider::Gemini,
            "heuristic" => Provider::Heuristic,
            other => {
                return Err(ConfigError::InvalidValue(
                    "JUDGMENT_PROVIDER".to_string(),
                    format!("'{}' is not one of openai, gemini, heuristic", other),
                ));
            }
        };

        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let gemini_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let chat_model = std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let prompts_path = std::env::var("PROMPTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./prompts"));

        match provider {
            Provider::OpenAI => {
                if openai_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "OPENAI_API_KEY must be set for 'openai' provider".to_string(),
                    ));
                }
            }
            Provider::Gemini => {
                if gemini_api_key.is_none() {
                    return Err(ConfigError::MissingVar(
                        "GEMINI_API_KEY must be set for 'gemini' provider".to_string(),
                    ));
                }
            }
            Provider::Heuristic => {}
        }

        let defaults = ConductorConfig::default();
        let max_follow_ups = parse_var(
            "MAX_FOLLOW_UPS",
            defaults.max_follow_ups.unwrap_or_default(),
        )?;
        let judgment_timeout_secs = parse_var(
            "JUDGMENT_TIMEOUT_SECS",
            defaults.judgment_timeout.as_secs(),
        )?;
        if judgment_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "JUDGMENT_TIMEOUT_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let conductor = ConductorConfig {
            min_follow_ups: parse_var("MIN_FOLLOW_UPS", defaults.min_follow_ups)?,
            max_follow_ups: (max_follow_ups > 0).then_some(max_follow_ups),
            max_turns: parse_var("MAX_TURNS", defaults.max_turns)?,
            judgment_timeout: Duration::from_secs(judgment_timeout_secs),
            judgment_attempts: parse_var("JUDGMENT_ATTEMPTS", defaults.judgment_attempts)?,
            closing_max_exchanges: parse_var(
                "CLOSING_MAX_EXCHANGES",
                defaults.closing_max_exchanges,
            )?,
            rotation: parse_var::<RotationPolicy>("TOPIC_ROTATION", defaults.rotation)?,
            evict_archived: parse_var("EVICT_ARCHIVED_SESSIONS", defaults.evict_archived)?,
            ..defaults
        };

        Ok(Self {
            bind_address,
            database_url,
            provider,
            openai_api_key,
            gemini_api_key,
            chat_model,
            log_level,
            prompts_path,
            conductor,
        })
    }
}
