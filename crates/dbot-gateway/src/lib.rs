//! # dbot-gateway
//!
//! Client for the Discord real-time gateway: REST lookup of the gateway URL,
//! the WebSocket handshake, heartbeating and automatic reconnect/resume.
//!
//! ```no_run
//! use dbot_common::BotConfig;
//! use dbot_gateway::{GatewayClient, GatewayEvent};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = BotConfig::from_env()?;
//! let client = GatewayClient::new(&config)?;
//! let mut events = client.subscribe();
//! client.login(config.require_token()?)?;
//!
//! while let Ok(event) = events.recv().await {
//!     if let GatewayEvent::Packet(packet) = event {
//!         println!("{packet}");
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connection;
pub mod error;
pub mod events;
pub mod http;
pub mod protocol;

pub use client::GatewayClient;
pub use connection::{ConnectionPhase, Connector, WebSocketConnector};
pub use error::{GatewayError, GatewayResult};
pub use events::{GatewayEvent, Warning};
pub use protocol::{GatewayMessage, OpCode};
