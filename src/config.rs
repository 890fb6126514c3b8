//! Configuration types.

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;
use crate::llm::LlmConfig;

pub const DEFAULT_MODEL: &str = "gpt-4";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BOOKING_URL: &str = "https://calendly.com/YOUR_LINK";
pub const DEFAULT_SESSION_IDLE_MIN: u64 = 60;

/// Which surface the binary serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// HTTP API for the embeddable widget.
    Server,
    /// Single-session terminal REPL.
    Cli,
}

/// Coach configuration.
#[derive(Debug, Clone)]
pub struct CoachConfig {
    pub llm: LlmConfig,
    /// HTTP listen port (server mode).
    pub port: u16,
    /// Link shown on the meal-planner step.
    pub booking_url: String,
    /// Sessions untouched for this long are dropped.
    pub session_idle_timeout: Duration,
    /// Most recent chat messages sent with each turn. `None` sends the whole transcript.
    pub history_limit: Option<usize>,
    pub mode: RunMode,
}

impl CoachConfig {
    /// Build config from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = match (get("OPENAI_API_KEY"), get("OPENAI_API_KEY_FILE")) {
            (Some(key), _) => key,
            (None, Some(path)) => read_key_file(Path::new(&path))?,
            (None, None) => {
                return Err(ConfigError::MissingRequired {
                    key: "OPENAI_API_KEY".to_string(),
                    hint: "export OPENAI_API_KEY=sk-... or set OPENAI_API_KEY_FILE".to_string(),
                });
            }
        };

        let llm = LlmConfig {
            api_key: SecretString::from(api_key),
            model: get("FITX_COACH_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        };

        let port = parse_or("FITX_COACH_PORT", get("FITX_COACH_PORT"), DEFAULT_PORT)?;
        let idle_min = parse_or(
            "FITX_COACH_SESSION_IDLE_MIN",
            get("FITX_COACH_SESSION_IDLE_MIN"),
            DEFAULT_SESSION_IDLE_MIN,
        )?;
        if idle_min == 0 {
            return Err(invalid("FITX_COACH_SESSION_IDLE_MIN", "must be at least 1"));
        }
        let idle_secs = idle_min
            .checked_mul(60)
            .ok_or_else(|| invalid("FITX_COACH_SESSION_IDLE_MIN", "too large"))?;

        let history_limit = match get("FITX_COACH_HISTORY_LIMIT") {
            Some(raw) => {
                let limit: usize = parse("FITX_COACH_HISTORY_LIMIT", &raw)?;
                if limit == 0 {
                    return Err(invalid("FITX_COACH_HISTORY_LIMIT", "must be at least 1"));
                }
                Some(limit)
            }
            None => None,
        };

        let mode = match get("FITX_COACH_MODE").as_deref().map(str::trim) {
            None | Some("server") => RunMode::Server,
            Some("cli") => RunMode::Cli,
            Some(other) => {
                return Err(invalid(
                    "FITX_COACH_MODE",
                    &format!("expected 'server' or 'cli', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            llm,
            port,
            booking_url: get("FITX_COACH_BOOKING_URL")
                .unwrap_or_else(|| DEFAULT_BOOKING_URL.to_string()),
            session_idle_timeout: Duration::from_secs(idle_secs),
            history_limit,
            mode,
        })
    }
}

fn read_key_file(path: &Path) -> Result<String, ConfigError> {
    let key = std::fs::read_to_string(path)?.trim().to_string();
    if key.is_empty() {
        return Err(invalid("OPENAI_API_KEY_FILE", "file is empty"));
    }
    Ok(key)
}

fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| invalid(key, &format!("'{raw}': {e}")))
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.map_or(Ok(default), |raw| parse(key, &raw))
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
