//! Domain errors

mod credentials_error;

pub use credentials_error::{CredentialsError, DEVELOPER_PORTAL_URL};
