//! REST request helper
//!
//! One HTTP round-trip with an optional body. Responses in the 2xx range
//! resolve to their body bytes, everything else becomes a `RequestError`.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Method};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Request error type
#[derive(Debug, Error)]
pub enum RequestError {
    /// The body was neither text nor raw bytes
    #[error("Request body must be text or bytes, got {found}")]
    InvalidBody { found: &'static str },

    /// A header name or value could not be encoded
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The server answered outside the 2xx range
    #[error("Request failed with status {code} {status_text}")]
    Status {
        code: u16,
        status_text: String,
        body: Option<Vec<u8>>,
    },

    /// The request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// The response body stopped before it was complete
    #[error("Response body incomplete: {0}")]
    Incomplete(String),

    /// Connecting or sending failed
    #[error("Transport error: {0}")]
    Transport(String),
}

impl RequestError {
    fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(err.to_string())
        }
    }

    /// Status code for `Status` errors
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Text(String),
    Bytes(Vec<u8>),
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Bodies coming from dynamic JSON must already be a string
impl TryFrom<Value> for RequestBody {
    type Error = RequestError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let found = match value {
            Value::String(text) => return Ok(Self::Text(text)),
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        };
        Err(RequestError::InvalidBody { found })
    }
}

impl From<RequestBody> for reqwest::Body {
    fn from(body: RequestBody) -> Self {
        match body {
            RequestBody::Text(text) => text.into(),
            RequestBody::Bytes(bytes) => bytes.into(),
        }
    }
}

/// Method and headers for one request
#[derive(Debug, Clone)]
pub struct RequestOptions {
    method: Method,
    headers: HeaderMap,
}

impl RequestOptions {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
        }
    }

    #[must_use]
    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    #[must_use]
    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    /// Set the `Authorization` header; the value is marked sensitive
    ///
    /// # Errors
    /// Returns `InvalidHeader` if the value contains bytes a header cannot carry
    pub fn authorization(mut self, value: &str) -> Result<Self, RequestError> {
        let mut value = HeaderValue::from_str(value)
            .map_err(|_| RequestError::InvalidHeader("authorization".to_string()))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        Ok(self)
    }

    /// Add an arbitrary header
    ///
    /// # Errors
    /// Returns `InvalidHeader` if the name or value is not valid
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, RequestError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| RequestError::InvalidHeader(name.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| RequestError::InvalidHeader(name.to_string()))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Shared HTTP client for REST calls
#[derive(Debug, Clone)]
pub struct ApiRequest {
    client: Client,
}

impl ApiRequest {
    /// Build a client with a per-request timeout
    ///
    /// # Errors
    /// Returns `Transport` if the TLS backend cannot be initialised
    pub fn new(timeout: Duration) -> Result<Self, RequestError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dbot (", env!("CARGO_PKG_VERSION"), ")"))
            .build()
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Perform one request
    ///
    /// Resolves to `None` when a 2xx response has an empty body.
    ///
    /// # Errors
    /// `Status` for non-2xx responses (carrying the body, if any), `Timeout`
    /// when the deadline passes, `Incomplete` when the body stream breaks and
    /// `Transport` for everything else.
    pub async fn send(
        &self,
        url: &str,
        options: RequestOptions,
        body: Option<RequestBody>,
    ) -> Result<Option<Vec<u8>>, RequestError> {
        let RequestOptions { method, headers } = options;
        tracing::debug!(method = %method, url = %url, has_body = body.is_some(), "Sending API request");

        let mut request = self.client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RequestError::from_transport(&e))?;
        let status = response.status();

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                RequestError::Timeout
            } else {
                RequestError::Incomplete(e.to_string())
            }
        })?;
        let body = (!bytes.is_empty()).then(|| bytes.to_vec());

        if status.is_success() {
            Ok(body)
        } else {
            tracing::debug!(status = status.as_u16(), url = %url, "API request failed");
            Err(RequestError::Status {
                code: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
                body,
            })
        }
    }
}
