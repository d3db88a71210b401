//! Gateway URL discovery

use super::{ApiRequest, RequestOptions};
use crate::error::GatewayError;
use crate::protocol::GATEWAY_VERSION;
use dbot_core::{Api, Credentials};
use serde::Deserialize;

/// Response of `GET /gateway/bot`
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayBotResponse {
    /// WebSocket URL to connect to
    pub url: String,
    /// Recommended shard count
    #[serde(default)]
    pub shards: Option<u32>,
}

/// Ask the REST API where the gateway lives
///
/// # Errors
/// `Request` when the HTTP call fails, `InvalidResponse` when the body is
/// missing or has no usable `url`.
pub async fn fetch_gateway_url(
    request: &ApiRequest,
    api: &Api,
    credentials: &Credentials,
) -> Result<String, GatewayError> {
    let options = RequestOptions::get().authorization(&credentials.authorization())?;
    let body = request
        .send(&api.gateway_bot(), options, None)
        .await?
        .ok_or_else(|| GatewayError::InvalidResponse("empty body".to_string()))?;

    let response: GatewayBotResponse = serde_json::from_slice(&body)
        .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;
    if response.url.is_empty() {
        return Err(GatewayError::InvalidResponse("empty url".to_string()));
    }

    tracing::debug!(url = %response.url, shards = ?response.shards, "Resolved gateway URL");
    Ok(response.url)
}

/// Append the version and encoding query to a discovered gateway URL
///
/// URLs that already carry a query are used as-is.
#[must_use]
pub fn gateway_socket_url(url: &str) -> String {
    if url.contains('?') {
        return url.to_string();
    }
    let has_path = url
        .split_once("://")
        .is_some_and(|(_, rest)| rest.contains('/'));
    let separator = if has_path { "" } else { "/" };
    format!("{url}{separator}?v={GATEWAY_VERSION}&encoding=json")
}
