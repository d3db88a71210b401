//! Gateway connector
//!
//! The two I/O steps of a connection attempt: discovering the gateway URL
//! and opening the WebSocket. The manager only talks to a `Connector`, so
//! tests can swap the network for in-memory channels.

use crate::error::GatewayError;
use crate::http::{fetch_gateway_url, gateway_socket_url, ApiRequest};
use crate::protocol::{ABNORMAL_CLOSURE, NO_STATUS_RECEIVED};
use async_trait::async_trait;
use dbot_common::BotConfig;
use dbot_core::{Api, Credentials};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode as WsCloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long a closing socket waits for the peer to finish the close handshake
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Commands the manager sends to an open socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketCommand {
    /// Send a text frame
    Send(String),
    /// Send a close frame with this code, then stop writing
    Close(u16),
}

/// Events an open socket reports back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SocketEvent {
    /// A text frame arrived
    Message(String),
    /// The socket closed; always the last event
    Close(u16),
    /// A transport error; a `Close` follows
    Error(String),
}

/// Both ends of an open socket as seen by the manager
#[derive(Debug)]
pub struct SocketChannels {
    pub outgoing: mpsc::UnboundedSender<SocketCommand>,
    pub incoming: mpsc::UnboundedReceiver<SocketEvent>,
}

/// Network seam of the gateway client
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Resolve the WebSocket URL for these credentials
    async fn gateway_url(&self, credentials: &Credentials) -> Result<String, GatewayError>;

    /// Open a socket to `url`
    async fn open(&self, url: &str) -> Result<SocketChannels, GatewayError>;
}

/// Connector backed by the REST API and `tokio-tungstenite`
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    request: ApiRequest,
    api: Api,
}

impl WebSocketConnector {
    #[must_use]
    pub fn new(request: ApiRequest, api: Api) -> Self {
        Self { request, api }
    }

    /// Build from the bot configuration
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be constructed
    pub fn from_config(config: &BotConfig) -> Result<Self, GatewayError> {
        let request = ApiRequest::new(config.api.request_timeout())?;
        Ok(Self::new(request, Api::new(config.api.base_url.clone())))
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn gateway_url(&self, credentials: &Credentials) -> Result<String, GatewayError> {
        fetch_gateway_url(&self.request, &self.api, credentials).await
    }

    async fn open(&self, url: &str) -> Result<SocketChannels, GatewayError> {
        let url = gateway_socket_url(url);
        tracing::debug!(url = %url, "Opening gateway socket");

        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|e| GatewayError::Socket(e.to_string()))?;

        Ok(spawn_socket(stream, CLOSE_TIMEOUT))
    }
}

/// Run an open stream on a reader and a writer task
///
/// Once the writer stops (close requested or manager gone) the reader gets
/// `close_timeout` to see the peer's close frame, then it is aborted and
/// both halves of the stream are dropped.
fn spawn_socket(stream: WsStream, close_timeout: Duration) -> SocketChannels {
    let (write, read) = stream.split();

    let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
    let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();

    let reader = tokio::spawn(reader_task(read, incoming_tx));
    tokio::spawn(writer_task(write, outgoing_rx, reader, close_timeout));

    SocketChannels {
        outgoing: outgoing_tx,
        incoming: incoming_rx,
    }
}

async fn reader_task(mut read: SplitStream<WsStream>, tx: mpsc::UnboundedSender<SocketEvent>) {
    let code = loop {
        match read.next().await {
            Some(Ok(Message::Text(text))) => {
                if tx.send(SocketEvent::Message(text)).is_err() {
                    // Manager detached from this socket
                    return;
                }
            }
            Some(Ok(Message::Close(frame))) => {
                break frame.map_or(NO_STATUS_RECEIVED, |f| u16::from(f.code));
            }
            Some(Ok(Message::Binary(data))) => {
                tracing::debug!(len = data.len(), "Ignoring binary gateway frame");
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => {
                let _ = tx.send(SocketEvent::Error(e.to_string()));
                break ABNORMAL_CLOSURE;
            }
            None => break ABNORMAL_CLOSURE,
        }
    };
    let _ = tx.send(SocketEvent::Close(code));
}

async fn writer_task(
    mut write: SplitSink<WsStream, Message>,
    mut rx: mpsc::UnboundedReceiver<SocketCommand>,
    mut reader: JoinHandle<()>,
    close_timeout: Duration,
) {
    while let Some(command) = rx.recv().await {
        match command {
            SocketCommand::Send(text) => {
                if let Err(e) = write.send(Message::Text(text)).await {
                    tracing::debug!(error = %e, "Gateway socket write failed");
                    break;
                }
            }
            SocketCommand::Close(code) => {
                let frame = CloseFrame {
                    code: WsCloseCode::from(code),
                    reason: "".into(),
                };
                let _ = tokio::time::timeout(close_timeout, write.send(Message::Close(Some(frame))))
                    .await;
                break;
            }
        }
    }
    let _ = tokio::time::timeout(close_timeout, write.close()).await;

    if tokio::time::timeout(close_timeout, &mut reader).await.is_err() {
        tracing::debug!(
            timeout = ?close_timeout,
            "Peer did not finish the close handshake, dropping socket"
        );
        reader.abort();
    }
}
