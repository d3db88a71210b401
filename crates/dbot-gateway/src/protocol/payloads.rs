//! Payload definitions
//!
//! The `d` bodies of the handshake messages exchanged with the gateway.

use serde::{Deserialize, Serialize};

/// Payload for op 10 (Hello)
///
/// Sent by the server immediately after connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPayload {
    /// Heartbeat interval in milliseconds
    pub heartbeat_interval: u64,
}

impl HelloPayload {
    /// Create a Hello payload with custom interval
    #[must_use]
    pub fn with_interval(heartbeat_interval: u64) -> Self {
        Self { heartbeat_interval }
    }
}

/// Payload for op 2 (Identify)
///
/// Sent by the client to start a new session.
#[derive(Clone, Serialize, Deserialize)]
pub struct IdentifyPayload {
    /// Raw bot token
    pub token: String,

    /// Client connection properties
    pub properties: IdentifyProperties,
}

impl IdentifyPayload {
    #[must_use]
    pub fn new(token: impl Into<String>, properties: IdentifyProperties) -> Self {
        Self {
            token: token.into(),
            properties,
        }
    }
}

impl std::fmt::Debug for IdentifyPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentifyPayload")
            .field("token", &"<redacted>")
            .field("properties", &self.properties)
            .finish()
    }
}

/// Client connection properties
///
/// The v7 gateway expects the keys prefixed with `$`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifyProperties {
    /// Operating system
    #[serde(rename = "$os")]
    pub os: String,

    /// Browser or library name
    #[serde(rename = "$browser")]
    pub browser: String,

    /// Device name
    #[serde(rename = "$device")]
    pub device: String,
}

impl IdentifyProperties {
    /// Properties reporting `client_name` as both browser and device
    #[must_use]
    pub fn new(os: impl Into<String>, client_name: impl Into<String>) -> Self {
        let client_name = client_name.into();
        Self {
            os: os.into(),
            browser: client_name.clone(),
            device: client_name,
        }
    }
}

/// Payload for op 6 (Resume)
///
/// Sent by the client to resume a previous session.
#[derive(Clone, Serialize, Deserialize)]
pub struct ResumePayload {
    /// Raw bot token
    pub token: String,

    /// Session ID to resume
    pub session_id: String,

    /// Last sequence number received
    pub seq: u64,
}

impl std::fmt::Debug for ResumePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResumePayload")
            .field("token", &"<redacted>")
            .field("session_id", &self.session_id)
            .field("seq", &self.seq)
            .finish()
    }
}

/// The part of a READY or RESUMED dispatch the client keeps
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionPayload {
    /// Session ID (absent on RESUMED)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}
