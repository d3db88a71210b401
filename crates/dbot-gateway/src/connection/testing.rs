//! In-memory connector for unit tests

use super::connector::{Connector, SocketChannels, SocketCommand, SocketEvent};
use crate::error::GatewayError;
use crate::protocol::GatewayMessage;
use async_trait::async_trait;
use dbot_core::Credentials;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// The server side of a fake socket
pub(crate) struct FakeRemote {
    pub url: String,
    pub sent: mpsc::UnboundedReceiver<SocketCommand>,
    pub events: mpsc::UnboundedSender<SocketEvent>,
}

impl FakeRemote {
    pub fn push(&self, message: &GatewayMessage) {
        self.push_raw(&message.to_json().unwrap());
    }

    pub fn push_raw(&self, raw: &str) {
        self.events
            .send(SocketEvent::Message(raw.to_string()))
            .unwrap();
    }

    pub fn close(&self, code: u16) {
        self.events.send(SocketEvent::Close(code)).unwrap();
    }

    /// Next command the client wrote to this socket
    pub async fn next_command(&mut self) -> SocketCommand {
        self.sent.recv().await.expect("socket writer dropped")
    }

    /// Next message the client wrote, panicking on anything else
    pub async fn next_sent(&mut self) -> GatewayMessage {
        match self.next_command().await {
            SocketCommand::Send(json) => GatewayMessage::from_json(&json).unwrap(),
            other => panic!("expected a message, got {other:?}"),
        }
    }

    /// Everything written so far without waiting
    pub fn drain(&mut self) -> Vec<SocketCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = self.sent.try_recv() {
            commands.push(command);
        }
        commands
    }
}

/// A connected pair of socket channels
pub(crate) fn socket_pair(url: &str) -> (SocketChannels, FakeRemote) {
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    (
        SocketChannels {
            outgoing: out_tx,
            incoming: in_rx,
        },
        FakeRemote {
            url: url.to_string(),
            sent: out_rx,
            events: in_tx,
        },
    )
}

/// Connector handing each opened socket's remote end to the test
pub(crate) struct FakeConnector {
    remotes: mpsc::UnboundedSender<FakeRemote>,
    lookups: Arc<AtomicUsize>,
    fail_lookup: Arc<AtomicBool>,
}

impl FakeConnector {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<FakeRemote>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                remotes: tx,
                lookups: Arc::new(AtomicUsize::new(0)),
                fail_lookup: Arc::new(AtomicBool::new(false)),
            },
            rx,
        )
    }

    /// Counter of gateway lookups, shared with the connector
    pub fn lookups(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.lookups)
    }

    /// Switch making lookups fail, shared with the connector
    pub fn fail_lookup(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.fail_lookup)
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn gateway_url(&self, credentials: &Credentials) -> Result<String, GatewayError> {
        let n = self.lookups.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(GatewayError::InvalidResponse("lookup refused".to_string()));
        }
        assert_eq!(credentials.authorization(), "Bot abc");
        Ok(format!("wss://gateway.test/{n}"))
    }

    async fn open(&self, url: &str) -> Result<SocketChannels, GatewayError> {
        let (channels, remote) = socket_pair(url);
        self.remotes
            .send(remote)
            .map_err(|_| GatewayError::Socket("test dropped remotes".to_string()))?;
        Ok(channels)
    }
}
