//! Credential validation errors
//!
//! Usage errors raised synchronously when a bot token is rejected before any
//! network activity takes place.

use thiserror::Error;

/// Where bot tokens are issued
pub const DEVELOPER_PORTAL_URL: &str = "https://discordapp.com/developers/applications";

/// Bot token validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialsError {
    /// No token, or an empty one
    #[error("A bot token is required")]
    InvalidCredentials,

    /// Token was supplied as something other than text
    #[error("The bot token must be text, got {found}")]
    InvalidCredentialsType { found: &'static str },

    /// The literal placeholder was passed instead of a real token
    #[error(
        "Invalid token: do not pass the literal \"BOT_TOKEN\", pass your bot's token instead. \
         It can be found at {DEVELOPER_PORTAL_URL}"
    )]
    PlaceholderCredentials,
}

impl CredentialsError {
    /// Get an error code string for logs and diagnostics
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidCredentialsType { .. } => "INVALID_CREDENTIALS_TYPE",
            Self::PlaceholderCredentials => "PLACEHOLDER_CREDENTIALS",
        }
    }
}
