//! Gateway client handle
//!
//! The public face of the connection manager. All methods are non-blocking;
//! the manager task does the work and reports through the event surface.

use crate::connection::{Command, ConnectionManager, ConnectionPhase, Connector, WebSocketConnector};
use crate::error::GatewayError;
use crate::events::{EventEmitter, GatewayEvent};
use crate::protocol::IdentifyProperties;
use dbot_common::{BotConfig, GatewaySettings};
use dbot_core::{Credentials, CredentialsError};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;

/// Handle to a gateway connection
///
/// Must be created inside a Tokio runtime. Dropping every handle stops the
/// manager task and closes the socket.
#[derive(Debug)]
pub struct GatewayClient {
    commands: mpsc::UnboundedSender<Command>,
    events: EventEmitter,
    phase: watch::Receiver<ConnectionPhase>,
    task: JoinHandle<()>,
}

impl GatewayClient {
    /// Create a client talking to the real gateway
    ///
    /// # Errors
    /// Fails if the HTTP client cannot be constructed
    pub fn new(config: &BotConfig) -> Result<Self, GatewayError> {
        let connector = WebSocketConnector::from_config(config)?;
        Ok(Self::with_connector(connector, &config.gateway))
    }

    /// Create a client using a custom connector
    pub fn with_connector<C: Connector>(connector: C, settings: &GatewaySettings) -> Self {
        let events = EventEmitter::with_capacity(settings.event_buffer);
        let (phase_tx, phase) = watch::channel(ConnectionPhase::Idle);
        let (commands, commands_rx) = mpsc::unbounded_channel();

        let manager = ConnectionManager::new(
            Arc::new(connector),
            IdentifyProperties::new(settings.os.clone(), settings.client_name.clone()),
            events.clone(),
            phase_tx,
        );
        let task = tokio::spawn(manager.run(commands_rx));

        Self {
            commands,
            events,
            phase,
            task,
        }
    }

    /// Subscribe to events emitted from now on
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }

    /// Current connection phase
    #[must_use]
    pub fn phase(&self) -> ConnectionPhase {
        *self.phase.borrow()
    }

    /// Watch connection phase changes
    #[must_use]
    pub fn watch_phase(&self) -> watch::Receiver<ConnectionPhase> {
        self.phase.clone()
    }

    /// Validate the token and start connecting
    ///
    /// Accepts anything convertible into `Credentials`: string slices, owned
    /// strings and `serde_json::Value`s. Validation happens here; connection
    /// failures arrive later as events.
    ///
    /// # Errors
    /// A `Credentials` error for empty, placeholder or non-string tokens, or
    /// `Closed` if the client has shut down.
    pub fn login<T>(&self, token: T) -> Result<(), GatewayError>
    where
        T: TryInto<Credentials, Error = CredentialsError>,
    {
        let credentials = token.try_into()?;
        self.commands
            .send(Command::Login(credentials))
            .map_err(|_| GatewayError::Closed)
    }

    /// Close the socket with a normal closure and stop the manager
    ///
    /// Terminal: later calls to `login` fail with `Closed`.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    /// Wait for the manager task to finish
    ///
    /// Only returns after `shutdown`.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Connection manager task failed");
        }
    }
}
