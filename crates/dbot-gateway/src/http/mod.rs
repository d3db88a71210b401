//! REST side of the client
//!
//! A single request helper plus the gateway URL lookup built on it.

mod gateway;
mod request;

pub use gateway::{fetch_gateway_url, gateway_socket_url, GatewayBotResponse};
pub use request::{ApiRequest, RequestBody, RequestError, RequestOptions};
