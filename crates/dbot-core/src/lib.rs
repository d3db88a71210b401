//! # dbot-core
//!
//! Domain layer: credentials, permission flags, identifiers and endpoint builders.
//! This crate performs no I/O.

pub mod endpoints;
pub mod error;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use endpoints::{Api, Cdn, API, CDN, WEB};
pub use error::{CredentialsError, DEVELOPER_PORTAL_URL};
pub use value_objects::{Credentials, Permissions, Snowflake, SnowflakeParseError};
