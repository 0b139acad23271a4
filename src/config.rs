use std::time::Duration;

/// Default timeout for tool operations (30 seconds).
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// Default maximum bytes per JSON-RPC message (1 MiB).
const DEFAULT_MAX_MESSAGE_BYTES: usize = 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    NotPositiveInteger { name: &'static str, value: String },
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub tool_timeout: Duration,
    pub max_message_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `SCHEMA_SERVER_TOOL_TIMEOUT_SECS` (optional, default 30): max seconds per tool call
    /// - `SCHEMA_SERVER_MAX_MESSAGE_BYTES` (optional, default 1 MiB): max bytes per message
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`ServerConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tool_timeout = match positive("SCHEMA_SERVER_TOOL_TIMEOUT_SECS", &lookup)? {
            Some(secs) => Duration::from_secs(secs),
            None => defaults.tool_timeout,
        };

        let max_message_bytes = match positive("SCHEMA_SERVER_MAX_MESSAGE_BYTES", &lookup)? {
            Some(bytes) => usize::try_from(bytes).unwrap_or(usize::MAX),
            None => defaults.max_message_bytes,
        };

        Ok(Self {
            tool_timeout,
            max_message_bytes,
        })
    }
}

fn positive<F>(name: &'static str, lookup: &F) -> Result<Option<u64>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(Some(n)),
        _ => Err(ConfigError::NotPositiveInteger { name, value }),
    }
}
