//! The manager's handle on one open socket

use super::connector::{SocketChannels, SocketCommand, SocketEvent};
use crate::protocol::{GatewayMessage, ABNORMAL_CLOSURE};
use tokio::sync::mpsc;

/// One attached socket
///
/// Dropping the session detaches it: no further events are read and the
/// writer side sees its channel close.
#[derive(Debug)]
pub struct SocketSession {
    epoch: u64,
    outgoing: mpsc::UnboundedSender<SocketCommand>,
    incoming: mpsc::UnboundedReceiver<SocketEvent>,
}

impl SocketSession {
    #[must_use]
    pub fn new(epoch: u64, channels: SocketChannels) -> Self {
        Self {
            epoch,
            outgoing: channels.outgoing,
            incoming: channels.incoming,
        }
    }

    /// Connection attempt this socket belongs to
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Whether the writer side still accepts frames
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.outgoing.is_closed()
    }

    /// Queue a message; returns false if the socket is gone
    pub fn send(&self, message: &GatewayMessage) -> bool {
        match message.to_json() {
            Ok(json) => self.outgoing.send(SocketCommand::Send(json)).is_ok(),
            Err(e) => {
                tracing::error!(error = %e, op = %message.op, "Failed to encode gateway message");
                false
            }
        }
    }

    /// Next event; a vanished reader counts as an abnormal close
    pub async fn recv(&mut self) -> SocketEvent {
        self.incoming
            .recv()
            .await
            .unwrap_or(SocketEvent::Close(ABNORMAL_CLOSURE))
    }

    /// Stop reading and ask the writer to close with `code`
    pub fn close(mut self, code: u16) {
        self.incoming.close();
        let _ = self.outgoing.send(SocketCommand::Close(code));
    }
}

/// Next event of an optional socket; pending forever when there is none
pub(crate) async fn next_event(socket: &mut Option<SocketSession>) -> SocketEvent {
    match socket {
        Some(socket) => socket.recv().await,
        None => std::future::pending().await,
    }
}
