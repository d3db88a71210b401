//! Dispatch event types
//!
//! Names carried in the `t` field of dispatch messages. Only the names the
//! client reacts to are modelled; everything else still reaches subscribers
//! untouched as a packet.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dispatch event types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DispatchEventType {
    /// Sent after successful Identify
    Ready,
    /// Sent after successful Resume
    Resumed,
}

impl DispatchEventType {
    /// Get the string representation of the event type
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ready => "READY",
            Self::Resumed => "RESUMED",
        }
    }

    /// Parse an event type from its wire name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "READY" => Some(Self::Ready),
            "RESUMED" => Some(Self::Resumed),
            _ => None,
        }
    }

    /// Whether this event completes a handshake
    #[must_use]
    pub const fn is_session_start(self) -> bool {
        matches!(self, Self::Ready | Self::Resumed)
    }
}

impl fmt::Display for DispatchEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
