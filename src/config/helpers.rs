use std::env;
use std::time::Duration;

use crate::error::ConfigError;

/// Read an env var, treating absent and blank values as `None`.
pub(crate) fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match env::var(key) {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "value is not valid UTF-8".to_string(),
        }),
    }
}

pub(crate) fn parse_string_env(key: &str, default: String) -> Result<String, ConfigError> {
    Ok(optional_env(key)?.unwrap_or(default))
}

pub(crate) fn parse_duration_secs_env(
    key: &str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match optional_env(key)? {
        None => Ok(default),
        Some(raw) => {
            let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected whole seconds, got '{raw}'"),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "timeout must be at least 1 second".to_string(),
                });
            }
            Ok(Duration::from_secs(secs))
        }
    }
}

/// Parse a comma-separated phrase list, falling back to the built-in table.
pub(crate) fn parse_phrases_env(key: &str, default: &[&str]) -> Result<Vec<String>, ConfigError> {
    let phrases = match optional_env(key)? {
        None => default.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
        Some(raw) => raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_ascii_lowercase())
            .collect(),
    };
    if phrases.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "phrase list must not be empty".to_string(),
        });
    }
    Ok(phrases)
}
