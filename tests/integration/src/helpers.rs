//! Test helpers for integration tests
//!
//! Provides a mock gateway (REST lookup plus WebSocket endpoint) served by
//! axum on an ephemeral port, and helpers for waiting on client events.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use dbot_common::BotConfig;
use dbot_gateway::{GatewayEvent, GatewayMessage, OpCode};
use parking_lot::Mutex;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::fixtures::{ready_payload, SESSION_ID, TEST_TOKEN};

/// How long any single wait in a test may take
pub const WAIT: Duration = Duration::from_secs(5);

/// Commands the test can push into the live mock socket
#[derive(Debug)]
pub enum ServerCommand {
    Send(GatewayMessage),
    Close(u16),
}

#[derive(Clone)]
struct MockState {
    ws_url: String,
    token: String,
    heartbeat_interval: u64,
    sequence: Arc<AtomicU64>,
    lookups: Arc<AtomicUsize>,
    connections: Arc<AtomicUsize>,
    received: mpsc::UnboundedSender<GatewayMessage>,
    closes: mpsc::UnboundedSender<Option<u16>>,
    control: Arc<Mutex<Option<mpsc::UnboundedSender<ServerCommand>>>>,
}

/// Mock gateway instance that manages lifecycle
pub struct MockGateway {
    pub addr: SocketAddr,
    lookups: Arc<AtomicUsize>,
    connections: Arc<AtomicUsize>,
    received: mpsc::UnboundedReceiver<GatewayMessage>,
    closes: mpsc::UnboundedReceiver<Option<u16>>,
    control: Arc<Mutex<Option<mpsc::UnboundedSender<ServerCommand>>>>,
    _handle: JoinHandle<()>,
}

impl MockGateway {
    /// Start a mock gateway with a long heartbeat interval
    pub async fn start() -> Result<Self> {
        Self::start_with_interval(45_000).await
    }

    /// Start a mock gateway advertising `heartbeat_interval` in Hello
    pub async fn start_with_interval(heartbeat_interval: u64) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let (received_tx, received) = mpsc::unbounded_channel();
        let (closes_tx, closes) = mpsc::unbounded_channel();
        let state = MockState {
            ws_url: format!("ws://{addr}/gateway"),
            token: TEST_TOKEN.to_string(),
            heartbeat_interval,
            sequence: Arc::new(AtomicU64::new(0)),
            lookups: Arc::new(AtomicUsize::new(0)),
            connections: Arc::new(AtomicUsize::new(0)),
            received: received_tx,
            closes: closes_tx,
            control: Arc::new(Mutex::new(None)),
        };
        let lookups = Arc::clone(&state.lookups);
        let connections = Arc::clone(&state.connections);
        let control = Arc::clone(&state.control);

        let app = Router::new()
            .route("/api/v7/gateway/bot", get(gateway_bot))
            .route("/gateway", get(gateway_socket))
            .route("/echo", post(echo))
            .route("/empty", get(|| async { StatusCode::OK }))
            .route("/status/:code", get(status))
            .route("/slow", get(slow))
            .with_state(state);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Ok(Self {
            addr,
            lookups,
            connections,
            received,
            closes,
            control,
            _handle: handle,
        })
    }

    /// Base URL for the REST API
    pub fn api_base(&self) -> String {
        format!("http://{}/api/v7", self.addr)
    }

    /// Base URL of the server root
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client configuration pointing at this mock
    pub fn config(&self) -> BotConfig {
        let api_base = self.api_base();
        let config = BotConfig::from_lookup(|key| match key {
            "DBOT_API_BASE" => Some(api_base.clone()),
            "DBOT_REQUEST_TIMEOUT_SECS" => Some("2".to_string()),
            "DISCORD_TOKEN" => Some(TEST_TOKEN.to_string()),
            _ => None,
        });
        config.unwrap_or_else(|e| panic!("mock config: {e}"))
    }

    /// Number of `/gateway/bot` lookups served
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of WebSocket connections accepted
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Push a message to the current socket
    pub fn send(&self, message: GatewayMessage) -> Result<()> {
        self.command(ServerCommand::Send(message))
    }

    /// Close the current socket with `code`
    pub fn close(&self, code: u16) -> Result<()> {
        self.command(ServerCommand::Close(code))
    }

    fn command(&self, command: ServerCommand) -> Result<()> {
        let control = self.control.lock();
        let sender = control.as_ref().context("no socket connected")?;
        sender
            .send(command)
            .map_err(|_| anyhow::anyhow!("socket task has exited"))
    }

    /// Next message the client sent, skipping heartbeats
    pub async fn next_received(&mut self) -> Result<GatewayMessage> {
        tokio::time::timeout(WAIT, async {
            loop {
                let message = self.received.recv().await.context("mock stopped")?;
                if message.op != OpCode::Heartbeat {
                    return Ok(message);
                }
            }
        })
        .await
        .context("timed out waiting for a client message")?
    }

    /// Next message with the given op code, skipping everything else
    pub async fn next_op(&mut self, op: OpCode) -> Result<GatewayMessage> {
        tokio::time::timeout(WAIT, async {
            loop {
                let message = self.received.recv().await.context("mock stopped")?;
                if message.op == op {
                    return Ok(message);
                }
            }
        })
        .await
        .with_context(|| format!("timed out waiting for {op}"))?
    }

    /// Close code of the next client-initiated close (`None` if no frame code)
    pub async fn next_client_close(&mut self) -> Result<Option<u16>> {
        tokio::time::timeout(WAIT, self.closes.recv())
            .await
            .context("timed out waiting for the client to close")?
            .context("mock stopped")
    }
}

async fn gateway_bot(State(state): State<MockState>, headers: HeaderMap) -> Response {
    let _ = state.lookups.fetch_add(1, Ordering::SeqCst);

    let expected = format!("Bot {}", state.token);
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);

    if authorized {
        Json(json!({"url": state.ws_url, "shards": 1})).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "401: Unauthorized", "code": 0})),
        )
            .into_response()
    }
}

async fn gateway_socket(State(state): State<MockState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| serve_socket(state, socket))
}

async fn serve_socket(state: MockState, mut socket: WebSocket) {
    let (control_tx, mut control_rx) = mpsc::unbounded_channel();
    *state.control.lock() = Some(control_tx);
    let _ = state.connections.fetch_add(1, Ordering::SeqCst);

    if send(&mut socket, &GatewayMessage::hello(state.heartbeat_interval))
        .await
        .is_err()
    {
        return;
    }

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let text = match incoming {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Close(frame))) => {
                        let _ = state.closes.send(frame.map(|f| f.code));
                        break;
                    }
                    Some(Ok(_)) => continue,
                    Some(Err(_)) | None => break,
                };
                let Ok(message) = GatewayMessage::from_json(&text) else {
                    continue;
                };

                let reply = match message.op {
                    OpCode::Identify => Some(GatewayMessage::dispatch(
                        "READY",
                        state.sequence.fetch_add(1, Ordering::SeqCst) + 1,
                        ready_payload(),
                    )),
                    OpCode::Resume => Some(GatewayMessage::dispatch(
                        "RESUMED",
                        state.sequence.fetch_add(1, Ordering::SeqCst) + 1,
                        json!({"_trace": ["mock"]}),
                    )),
                    OpCode::Heartbeat => Some(GatewayMessage::heartbeat_ack()),
                    _ => None,
                };
                let _ = state.received.send(message);

                if let Some(reply) = reply {
                    if send(&mut socket, &reply).await.is_err() {
                        break;
                    }
                }
            }
            command = control_rx.recv() => match command {
                Some(ServerCommand::Send(message)) => {
                    if send(&mut socket, &message).await.is_err() {
                        break;
                    }
                }
                Some(ServerCommand::Close(code)) => {
                    let frame = CloseFrame { code, reason: "".into() };
                    let _ = socket.send(Message::Close(Some(frame))).await;
                    break;
                }
                None => break,
            },
        }
    }
}

async fn send(socket: &mut WebSocket, message: &GatewayMessage) -> Result<()> {
    let json = message.to_json()?;
    socket.send(Message::Text(json)).await?;
    Ok(())
}

async fn echo(body: Bytes) -> Bytes {
    body
}

async fn status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("status {code}")).into_response()
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(3)).await;
    "too late"
}

/// Serve one HTTP response whose body stops short of its `Content-Length`
///
/// Returns the URL to request. The server reads the request head, writes the
/// truncated response and hangs up.
pub async fn truncated_body_url() -> Result<String> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        let mut head = Vec::new();
        let mut buf = [0u8; 1024];
        while !head.windows(4).any(|w| w == b"\r\n\r\n") {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => return,
                Ok(n) => head.extend_from_slice(&buf[..n]),
            }
        }
        let response = b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\nContent-Type: text/plain\r\n\r\nshort";
        let _ = stream.write_all(response).await;
        let _ = stream.shutdown().await;
    });

    Ok(format!("http://{addr}/truncated"))
}

/// Wait for the first event matching `predicate`, dropping the rest
pub async fn wait_for_event<F>(
    events: &mut broadcast::Receiver<GatewayEvent>,
    mut predicate: F,
) -> Result<GatewayEvent>
where
    F: FnMut(&GatewayEvent) -> bool,
{
    tokio::time::timeout(WAIT, async {
        loop {
            let event = events.recv().await?;
            if predicate(&event) {
                return Ok(event);
            }
        }
    })
    .await
    .context("timed out waiting for a gateway event")?
}

/// Whether `event` is the READY or RESUMED packet
pub fn is_session_packet(event: &GatewayEvent) -> bool {
    matches!(
        event,
        GatewayEvent::Packet(p) if matches!(p.t.as_deref(), Some("READY" | "RESUMED"))
    )
}

/// Session ID the mock hands out
pub fn mock_session_id() -> &'static str {
    SESSION_ID
}
