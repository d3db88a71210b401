//! Value objects - immutable types that represent domain concepts

mod credentials;
mod permissions;
mod snowflake;

pub use credentials::Credentials;
pub use permissions::Permissions;
pub use snowflake::{Snowflake, SnowflakeParseError};
