//! Connection management
//!
//! The connection manager task, the socket it drives and the network seam
//! it opens sockets through.

mod connector;
mod heartbeat;
mod manager;
mod session;
mod socket;

#[cfg(test)]
pub(crate) mod testing;

pub use connector::{Connector, SocketChannels, SocketCommand, SocketEvent, WebSocketConnector};
pub use heartbeat::HeartbeatTimer;
pub(crate) use manager::{Command, ConnectionManager};
pub use session::{ConnectionPhase, SessionState};
pub use socket::SocketSession;
