//! Configuration structs

mod bot_config;

pub use bot_config::{
    ApiConfig, AppSettings, BotConfig, ConfigError, Environment, GatewaySettings, TOKEN_VAR,
};
