//! Bot credentials
//!
//! A validated, non-empty bot token. The token is never printed: `Debug` is redacted
//! and there is no `Display` impl.

use crate::error::CredentialsError;
use serde_json::Value;
use std::fmt;

/// Bot token credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// Placeholder value shown in setup guides, rejected on login
    pub const PLACEHOLDER: &'static str = "BOT_TOKEN";

    /// Validate a token
    ///
    /// # Errors
    /// Returns `InvalidCredentials` for an empty token and `PlaceholderCredentials`
    /// for the literal placeholder.
    pub fn new(token: impl Into<String>) -> Result<Self, CredentialsError> {
        let token = token.into();

        if token.is_empty() {
            return Err(CredentialsError::InvalidCredentials);
        }

        if token == Self::PLACEHOLDER {
            return Err(CredentialsError::PlaceholderCredentials);
        }

        Ok(Self { token })
    }

    /// Validate a token coming from loosely typed input (JSON, config files)
    ///
    /// `null` counts as a missing token; any other non-string value is a type error.
    pub fn from_value(value: &Value) -> Result<Self, CredentialsError> {
        match value {
            Value::String(token) => Self::new(token.as_str()),
            Value::Null => Err(CredentialsError::InvalidCredentials),
            Value::Bool(_) => Err(CredentialsError::InvalidCredentialsType { found: "boolean" }),
            Value::Number(_) => Err(CredentialsError::InvalidCredentialsType { found: "number" }),
            Value::Array(_) => Err(CredentialsError::InvalidCredentialsType { found: "array" }),
            Value::Object(_) => Err(CredentialsError::InvalidCredentialsType { found: "object" }),
        }
    }

    /// Raw token, as sent in Identify and Resume payloads
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the HTTP `Authorization` header
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("token", &"<redacted>").finish()
    }
}

impl TryFrom<&str> for Credentials {
    type Error = CredentialsError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        Self::new(token)
    }
}

impl TryFrom<String> for Credentials {
    type Error = CredentialsError;

    fn try_from(token: String) -> Result<Self, Self::Error> {
        Self::new(token)
    }
}

impl TryFrom<&Value> for Credentials {
    type Error = CredentialsError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl TryFrom<Value> for Credentials {
    type Error = CredentialsError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(&value)
    }
}
