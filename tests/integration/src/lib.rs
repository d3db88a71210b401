//! Integration test utilities for the gateway client
//!
//! This crate provides a mock Discord gateway for end-to-end tests of the
//! REST lookup and the WebSocket session.

pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
