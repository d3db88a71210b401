//! Gateway events
//!
//! Dispatch event names and the events the client emits to its subscribers.

mod emitter;
mod event_types;
mod gateway_event;

pub use emitter::{EventEmitter, DEFAULT_CAPACITY};
pub use event_types::DispatchEventType;
pub use gateway_event::{GatewayEvent, Warning};
