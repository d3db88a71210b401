//! Events surfaced to subscribers of the gateway client

use crate::protocol::GatewayMessage;
use std::fmt;

/// Everything the client reports to its subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayEvent {
    /// A READY or RESUMED dispatch completed the handshake
    Connect,
    /// A live socket went away, with the close code that ended it
    Disconnect(u16),
    /// A dispatch message, forwarded verbatim
    Packet(GatewayMessage),
    /// Something recoverable happened; the client is already reconnecting
    Warn(Warning),
    /// Something failed; the client does not retry on its own
    Error(String),
}

impl GatewayEvent {
    /// Short name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Disconnect(_) => "disconnect",
            Self::Packet(_) => "packet",
            Self::Warn(_) => "warn",
            Self::Error(_) => "error",
        }
    }
}

/// Reasons for a `Warn` event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// The gateway invalidated the session
    InvalidSession { resumable: bool },
    /// The gateway asked the client to reconnect
    ReconnectRequested,
    /// The previous heartbeat was never acknowledged
    HeartbeatTimeout,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSession { resumable } => {
                write!(f, "Invalid session (resumable: {resumable})")
            }
            Self::ReconnectRequested => write!(f, "Gateway requested a reconnect"),
            Self::HeartbeatTimeout => write!(f, "Heartbeat was not acknowledged"),
        }
    }
}
