use crate::constants::{auth, discovery, network};
use crate::services::logger::LogLevel;

/// Process-wide knobs read from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub discovery_url: String,
    pub timeout_ms: u64,
    pub access_token_env: String,
    pub token_command: String,
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            discovery_url: discovery::INDEX_URL.to_string(),
            timeout_ms: network::TIMEOUT_API_REQUEST_MS,
            access_token_env: auth::ACCESS_TOKEN_ENV.to_string(),
            token_command: auth::DEFAULT_TOKEN_COMMAND.to_string(),
            log_level: LogLevel::Info,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let read = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            discovery_url: read("GAPI_DISCOVERY_URL").unwrap_or(defaults.discovery_url),
            timeout_ms: read("GAPI_TIMEOUT_MS")
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(defaults.timeout_ms),
            access_token_env: defaults.access_token_env,
            token_command: read(auth::TOKEN_COMMAND_ENV).unwrap_or(defaults.token_command),
            log_level: read("LOG_LEVEL")
                .map(|v| LogLevel::parse(&v))
                .unwrap_or(defaults.log_level),
        }
    }
}
