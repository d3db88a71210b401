//! Connection manager
//!
//! Owns the socket, the heartbeat timer and the session state, and runs every
//! transition on a single task. Each connect attempt gets a new epoch; lookup
//! results from an older epoch are discarded when they arrive.

use super::connector::{Connector, SocketChannels, SocketEvent};
use super::heartbeat::{next_tick, HeartbeatTimer};
use super::session::{ConnectionPhase, SessionState};
use super::socket::{next_event, SocketSession};
use crate::error::GatewayError;
use crate::events::{DispatchEventType, EventEmitter, GatewayEvent, Warning};
use crate::protocol::{
    describe_close_code, CloseCode, GatewayMessage, IdentifyProperties, OpCode, NORMAL_CLOSURE,
    SERVICE_RESTART,
};
use dbot_core::Credentials;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

/// Requests from the client handle
#[derive(Debug)]
pub(crate) enum Command {
    Login(Credentials),
    Shutdown,
}

/// Result of the lookup-and-open step of one connect attempt
#[derive(Debug)]
pub(crate) struct ConnectOutcome {
    epoch: u64,
    result: Result<SocketChannels, GatewayError>,
}

/// Envelope of a frame whose op code this client does not handle
#[derive(Debug, Deserialize)]
struct UnknownFrame {
    op: u8,
    #[serde(default)]
    s: Option<u64>,
}

/// Gateway connection state machine
pub struct ConnectionManager<C: Connector> {
    connector: Arc<C>,
    properties: IdentifyProperties,
    events: EventEmitter,
    phase: watch::Sender<ConnectionPhase>,

    credentials: Option<Credentials>,
    state: SessionState,
    epoch: u64,
    socket: Option<SocketSession>,
    heartbeat: Option<HeartbeatTimer>,

    outcomes_tx: mpsc::UnboundedSender<ConnectOutcome>,
    outcomes_rx: mpsc::UnboundedReceiver<ConnectOutcome>,
}

impl<C: Connector> ConnectionManager<C> {
    pub(crate) fn new(
        connector: Arc<C>,
        properties: IdentifyProperties,
        events: EventEmitter,
        phase: watch::Sender<ConnectionPhase>,
    ) -> Self {
        let (outcomes_tx, outcomes_rx) = mpsc::unbounded_channel();
        Self {
            connector,
            properties,
            events,
            phase,
            credentials: None,
            state: SessionState::new(),
            epoch: 0,
            socket: None,
            heartbeat: None,
            outcomes_tx,
            outcomes_rx,
        }
    }

    /// Process commands, socket events and heartbeats until shutdown
    ///
    /// Returns when a `Shutdown` command arrives or every client handle is gone.
    pub(crate) async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        tracing::debug!("Connection manager started");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(Command::Login(credentials)) => self.login(credentials),
                    Some(Command::Shutdown) | None => break,
                },
                Some(outcome) = self.outcomes_rx.recv() => self.on_connect_outcome(outcome),
                event = next_event(&mut self.socket) => self.on_socket_event(event),
                () = next_tick(&mut self.heartbeat) => self.send_heartbeat(),
            }
        }

        self.shutdown();
        tracing::debug!("Connection manager stopped");
    }

    pub(crate) fn login(&mut self, credentials: Credentials) {
        tracing::info!("Logging in to gateway");
        self.credentials = Some(credentials);
        self.reconnect(false);
    }

    /// Tear down the current socket and start a new connect attempt
    pub(crate) fn connect(&mut self, resume: bool) -> Result<(), GatewayError> {
        let credentials = self
            .credentials
            .clone()
            .ok_or(GatewayError::MissingAuthorization)?;

        self.disconnect(SERVICE_RESTART);
        if !resume {
            self.state.reset();
        }

        self.epoch += 1;
        let epoch = self.epoch;
        self.set_phase(ConnectionPhase::Connecting);
        tracing::info!(
            epoch,
            resume,
            resumable = self.state.is_resumable(),
            "Connecting to gateway"
        );

        let connector = Arc::clone(&self.connector);
        let outcomes = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = async {
                let url = connector.gateway_url(&credentials).await?;
                connector.open(&url).await
            }
            .await;
            // The manager may already be gone
            let _ = outcomes.send(ConnectOutcome { epoch, result });
        });

        Ok(())
    }

    fn reconnect(&mut self, resume: bool) {
        if let Err(e) = self.connect(resume) {
            tracing::error!(error = %e, "Cannot connect to gateway");
            self.events.emit(GatewayEvent::Error(e.to_string()));
        }
    }

    fn on_connect_outcome(&mut self, outcome: ConnectOutcome) {
        let ConnectOutcome { epoch, result } = outcome;

        if epoch != self.epoch {
            tracing::debug!(epoch, current = self.epoch, "Discarding stale connect result");
            if let Ok(channels) = result {
                SocketSession::new(epoch, channels).close(NORMAL_CLOSURE);
            }
            return;
        }

        match result {
            Ok(channels) => {
                tracing::debug!(epoch, "Gateway socket opened");
                self.socket = Some(SocketSession::new(epoch, channels));
                self.set_phase(ConnectionPhase::Handshaking);
            }
            Err(e) => {
                tracing::error!(epoch, error = %e, "Gateway connect failed");
                self.set_phase(ConnectionPhase::Idle);
                self.events.emit(GatewayEvent::Error(e.to_string()));
            }
        }
    }

    fn on_socket_event(&mut self, event: SocketEvent) {
        match event {
            SocketEvent::Message(raw) => self.on_message(&raw),
            SocketEvent::Close(code) => self.on_close(code),
            SocketEvent::Error(err) => self.on_error(err),
        }
    }

    pub(crate) fn on_message(&mut self, raw: &str) {
        let message = match GatewayMessage::from_json(raw) {
            Ok(message) => message,
            Err(e) => {
                match serde_json::from_str::<UnknownFrame>(raw) {
                    Ok(frame) => {
                        if let Some(seq) = frame.s {
                            self.state.observe_sequence(seq);
                        }
                        tracing::debug!(op = frame.op, "Ignoring unrecognized gateway frame");
                    }
                    Err(_) => {
                        tracing::debug!(error = %e, len = raw.len(), "Ignoring malformed gateway payload");
                    }
                }
                return;
            }
        };

        if let Some(seq) = message.s {
            self.state.observe_sequence(seq);
        }
        tracing::trace!(%message, "Gateway message received");

        match message.op {
            OpCode::Dispatch => self.on_dispatch(message),
            OpCode::Hello => self.on_hello(&message),
            OpCode::HeartbeatAck => self.state.ack_heartbeat(),
            OpCode::Heartbeat => self.send_heartbeat(),
            OpCode::InvalidSession => {
                let resumable = message.is_resumable();
                tracing::warn!(resumable, "Gateway invalidated the session");
                self.events
                    .emit(GatewayEvent::Warn(Warning::InvalidSession { resumable }));
                self.reconnect(resumable);
            }
            OpCode::Reconnect => {
                tracing::warn!("Gateway requested a reconnect");
                self.events
                    .emit(GatewayEvent::Warn(Warning::ReconnectRequested));
                self.reconnect(true);
            }
            op => tracing::debug!(%op, "Ignoring client-only op code"),
        }
    }

    fn on_dispatch(&mut self, message: GatewayMessage) {
        let event_type = message.t.as_deref().and_then(DispatchEventType::from_name);

        if event_type.is_some_and(DispatchEventType::is_session_start) {
            if let Some(session_id) = message.as_session().and_then(|s| s.session_id) {
                self.state.start_session(session_id);
            }
            self.state.ack_heartbeat();
            self.send_heartbeat();
            self.set_phase(ConnectionPhase::Live);

            tracing::info!(
                event = ?event_type,
                session_id = ?self.state.session_id(),
                seq = self.state.last_sequence(),
                "Gateway session established"
            );
            self.events.emit(GatewayEvent::Connect);
        }

        self.events.emit(GatewayEvent::Packet(message));
    }

    fn on_hello(&mut self, message: &GatewayMessage) {
        let interval = message.as_hello().map_or(0, |hello| hello.heartbeat_interval);
        self.identify();
        self.state.ack_heartbeat();
        self.set_heartbeat_timer(interval);
    }

    /// Send Resume if a session is known, Identify otherwise
    fn identify(&self) {
        let (Some(credentials), Some(socket)) = (&self.credentials, &self.socket) else {
            return;
        };

        let handshake = self.state.handshake(credentials, &self.properties);
        tracing::debug!(op = %handshake.op, seq = self.state.last_sequence(), "Sending handshake");
        socket.send(&handshake);
    }

    pub(crate) fn send_heartbeat(&mut self) {
        if !self.state.last_heartbeat_acked() {
            tracing::warn!(
                seq = self.state.last_sequence(),
                "Heartbeat not acknowledged, resuming on a new connection"
            );
            self.events
                .emit(GatewayEvent::Warn(Warning::HeartbeatTimeout));
            self.reconnect(true);
            return;
        }

        let Some(socket) = self.socket.as_ref().filter(|s| s.is_open()) else {
            tracing::debug!("No open socket, skipping heartbeat");
            return;
        };

        let seq = self.state.last_sequence();
        if socket.send(&GatewayMessage::heartbeat(seq)) {
            self.state.heartbeat_sent();
            tracing::trace!(seq, "Heartbeat sent");
        }
    }

    fn set_heartbeat_timer(&mut self, interval_ms: u64) {
        self.heartbeat = HeartbeatTimer::start(interval_ms);
        match &self.heartbeat {
            Some(timer) => tracing::debug!(period = ?timer.period(), "Heartbeat timer started"),
            None => tracing::warn!("Hello carried no heartbeat interval, heartbeating disabled"),
        }
    }

    fn on_close(&mut self, code: u16) {
        let reconnectable = CloseCode::from_u16(code).map_or(true, CloseCode::should_reconnect);
        if reconnectable {
            tracing::info!(code, reason = %describe_close_code(code), "Gateway socket closed");
        } else {
            tracing::warn!(
                code,
                reason = %describe_close_code(code),
                "Gateway socket closed with a non-recoverable code, reconnecting anyway"
            );
        }

        self.disconnect(code);
        self.reconnect(true);
    }

    fn on_error(&mut self, err: String) {
        tracing::warn!(error = %err, "Gateway socket error");
        self.events.emit(GatewayEvent::Error(err));
    }

    /// Tear down the live socket, if any, announcing it with `code`
    pub(crate) fn disconnect(&mut self, code: u16) {
        self.heartbeat = None;
        let Some(socket) = self.socket.take() else {
            return;
        };

        tracing::debug!(epoch = socket.epoch(), code, "Tearing down gateway socket");
        self.events.emit(GatewayEvent::Disconnect(code));
        socket.close(code);
        self.set_phase(ConnectionPhase::Idle);
    }

    /// Close for good; later connect results are discarded
    pub(crate) fn shutdown(&mut self) {
        if *self.phase.borrow() == ConnectionPhase::Shutdown {
            return;
        }
        tracing::info!("Shutting down gateway connection");
        self.epoch += 1;
        self.disconnect(NORMAL_CLOSURE);
        self.set_phase(ConnectionPhase::Shutdown);
    }

    fn set_phase(&self, phase: ConnectionPhase) {
        let previous = self.phase.send_replace(phase);
        if previous != phase {
            tracing::trace!(from = %previous, to = %phase, "Connection phase changed");
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &SessionState {
        &self.state
    }
}
