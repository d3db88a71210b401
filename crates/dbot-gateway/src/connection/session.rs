//! Session state
//!
//! What the client remembers across sockets so it can resume, and the
//! handshake it derives from that memory.

use crate::protocol::{GatewayMessage, IdentifyPayload, IdentifyProperties, ResumePayload};
use dbot_core::Credentials;
use std::fmt;

/// Where the client is in its connection lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionPhase {
    /// Not connected and not trying to
    #[default]
    Idle,
    /// Looking up the gateway URL or opening the socket
    Connecting,
    /// Socket open, waiting for Hello and READY/RESUMED
    Handshaking,
    /// Session established
    Live,
    /// Shut down for good
    Shutdown,
}

impl fmt::Display for ConnectionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Handshaking => "handshaking",
            Self::Live => "live",
            Self::Shutdown => "shutdown",
        };
        f.write_str(name)
    }
}

/// Resumable session memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    session_id: Option<String>,
    last_sequence: u64,
    last_heartbeat_acked: bool,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_id: None,
            last_sequence: 0,
            last_heartbeat_acked: true,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    #[must_use]
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    #[must_use]
    pub fn last_heartbeat_acked(&self) -> bool {
        self.last_heartbeat_acked
    }

    /// Whether the next handshake will be a Resume
    #[must_use]
    pub fn is_resumable(&self) -> bool {
        self.session_id.is_some()
    }

    /// Forget the session so the next handshake identifies afresh
    pub fn reset(&mut self) {
        self.session_id = None;
        self.last_sequence = 0;
    }

    /// Record a sequence number; it never moves backwards
    pub fn observe_sequence(&mut self, seq: u64) {
        self.last_sequence = self.last_sequence.max(seq);
    }

    pub fn start_session(&mut self, session_id: String) {
        self.session_id = Some(session_id);
    }

    pub fn ack_heartbeat(&mut self) {
        self.last_heartbeat_acked = true;
    }

    pub fn heartbeat_sent(&mut self) {
        self.last_heartbeat_acked = false;
    }

    /// Resume when a session is known, identify otherwise
    #[must_use]
    pub fn handshake(
        &self,
        credentials: &Credentials,
        properties: &IdentifyProperties,
    ) -> GatewayMessage {
        match &self.session_id {
            Some(session_id) => GatewayMessage::resume(&ResumePayload {
                token: credentials.token().to_string(),
                session_id: session_id.clone(),
                seq: self.last_sequence,
            }),
            None => GatewayMessage::identify(&IdentifyPayload::new(
                credentials.token(),
                properties.clone(),
            )),
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
