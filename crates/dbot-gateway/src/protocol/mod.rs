//! Gateway protocol definitions
//!
//! Defines the WebSocket protocol including op codes, message formats, and close codes.

mod close_codes;
mod messages;
mod opcodes;
mod payloads;

pub use close_codes::{
    describe as describe_close_code, CloseCode, ABNORMAL_CLOSURE, NORMAL_CLOSURE,
    NO_STATUS_RECEIVED, SERVICE_RESTART,
};
pub use messages::GatewayMessage;
pub use opcodes::OpCode;
pub use payloads::{HelloPayload, IdentifyPayload, IdentifyProperties, ResumePayload, SessionPayload};

/// Gateway API version requested on connect
pub const GATEWAY_VERSION: u8 = 7;
