//! Gateway client error types

use crate::http::RequestError;
use dbot_core::CredentialsError;
use thiserror::Error;

/// Gateway client error type
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The token handed to `login` was rejected
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    /// A connection was attempted before `login`
    #[error("No authorization available, log in first")]
    MissingAuthorization,

    /// The gateway URL lookup failed
    #[error("Gateway lookup failed: {0}")]
    Request(#[from] RequestError),

    /// The gateway URL lookup returned something unusable
    #[error("Invalid gateway lookup response: {0}")]
    InvalidResponse(String),

    /// Opening or using the WebSocket failed
    #[error("WebSocket error: {0}")]
    Socket(String),

    /// The client has shut down
    #[error("Gateway client is shut down")]
    Closed,
}

/// Gateway result type
pub type GatewayResult<T> = Result<T, GatewayError>;
