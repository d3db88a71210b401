//! Bot configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file if present).

use serde::Deserialize;
use std::env;
use std::time::Duration;

/// Environment variable holding the bot token
pub const TOKEN_VAR: &str = "DISCORD_TOKEN";

/// Main bot configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub app: AppSettings,
    pub api: ApiConfig,
    pub gateway: GatewaySettings,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// REST API settings
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Bot token, kept as raw text until validated at login
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_api_base")]
    pub base_url: String,
    #[serde(default = "default_cdn_base")]
    pub cdn_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ApiConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Gateway client settings
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    /// Reported as `$browser` and `$device` in Identify
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// Reported as `$os` in Identify
    #[serde(default = "default_os")]
    pub os: String,
    /// Capacity of the event broadcast channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            os: default_os(),
            event_buffer: default_event_buffer(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "dbot".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_api_base() -> String {
    dbot_core::API.to_string()
}

fn default_cdn_base() -> String {
    dbot_core::CDN.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_client_name() -> String {
    "discord.mybot".to_string()
}

fn default_os() -> String {
    std::env::consts::OS.to_string()
}

fn default_event_buffer() -> usize {
    1024
}

impl BotConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a numeric variable cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns an error if a numeric variable cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .as_deref()
                    .and_then(Environment::parse)
                    .unwrap_or_default(),
            },
            api: ApiConfig {
                token: lookup(TOKEN_VAR),
                base_url: lookup("DBOT_API_BASE").unwrap_or_else(default_api_base),
                cdn_url: lookup("DBOT_CDN_BASE").unwrap_or_else(default_cdn_base),
                request_timeout_secs: parse_var(
                    &lookup,
                    "DBOT_REQUEST_TIMEOUT_SECS",
                    default_request_timeout_secs,
                )?,
            },
            gateway: GatewaySettings {
                client_name: lookup("DBOT_CLIENT_NAME").unwrap_or_else(default_client_name),
                os: lookup("DBOT_OS").unwrap_or_else(default_os),
                event_buffer: parse_var(&lookup, "DBOT_EVENT_BUFFER", default_event_buffer)?,
            },
        })
    }

    /// Get the bot token or fail with a configuration error
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.api
            .token
            .as_deref()
            .ok_or(ConfigError::MissingVar(TOKEN_VAR))
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str, default: fn() -> T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
