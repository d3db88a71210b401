//! REST Request Integration Tests
//!
//! Exercise `ApiRequest` and the gateway lookup against the mock server.
//!
//! Run with: cargo test -p integration-tests --test request_tests

use std::time::Duration;

use dbot_core::{Api, Credentials};
use dbot_gateway::http::{
    fetch_gateway_url, ApiRequest, RequestBody, RequestError, RequestOptions,
};
use dbot_gateway::GatewayError;
use integration_tests::{truncated_body_url, MockGateway, TEST_TOKEN};

fn request() -> ApiRequest {
    ApiRequest::new(Duration::from_secs(2)).expect("Failed to build client")
}

// ============================================================================
// Request Tests
// ============================================================================

#[tokio::test]
async fn test_text_body_is_echoed() {
    let mock = MockGateway::start().await.expect("Failed to start mock");
    let url = format!("{}/echo", mock.base_url());

    let body = request()
        .send(&url, RequestOptions::post(), Some("hello".into()))
        .await
        .unwrap();

    assert_eq!(body.as_deref(), Some(b"hello".as_slice()));
}

#[tokio::test]
async fn test_bytes_body_is_echoed() {
    let mock = MockGateway::start().await.expect("Failed to start mock");
    let url = format!("{}/echo", mock.base_url());

    let body = request()
        .send(
            &url,
            RequestOptions::post(),
            Some(RequestBody::Bytes(vec![0, 159, 146, 150])),
        )
        .await
        .unwrap();

    assert_eq!(body, Some(vec![0, 159, 146, 150]));
}

#[tokio::test]
async fn test_empty_success_is_none() {
    let mock = MockGateway::start().await.expect("Failed to start mock");
    let url = format!("{}/empty", mock.base_url());

    let body = request().send(&url, RequestOptions::get(), None).await.unwrap();

    assert!(body.is_none());
}

#[tokio::test]
async fn test_error_status_carries_body() {
    let mock = MockGateway::start().await.expect("Failed to start mock");
    let url = format!("{}/status/404", mock.base_url());

    let err = request()
        .send(&url, RequestOptions::get(), None)
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    let RequestError::Status {
        status_text, body, ..
    } = err
    else {
        panic!("expected a status error");
    };
    assert_eq!(status_text, "Not Found");
    assert_eq!(body.as_deref(), Some(b"status 404".as_slice()));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let mock = MockGateway::start().await.expect("Failed to start mock");
    let url = format!("{}/slow", mock.base_url());

    let err = ApiRequest::new(Duration::from_millis(200))
        .unwrap()
        .send(&url, RequestOptions::get(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, RequestError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn test_truncated_body_is_incomplete() {
    let url = truncated_body_url().await.expect("Failed to start server");

    let err = request()
        .send(&url, RequestOptions::get(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, RequestError::Incomplete(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let err = request()
        .send(&format!("http://{addr}/"), RequestOptions::get(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, RequestError::Transport(_)), "got {err:?}");
}

// ============================================================================
// Gateway Lookup Tests
// ============================================================================

#[tokio::test]
async fn test_gateway_lookup_returns_socket_url() {
    let mock = MockGateway::start().await.expect("Failed to start mock");
    let api = Api::new(mock.api_base());
    let credentials = Credentials::new(TEST_TOKEN).unwrap();

    let url = fetch_gateway_url(&request(), &api, &credentials).await.unwrap();

    assert_eq!(url, format!("ws://{}/gateway", mock.addr));
    assert_eq!(mock.lookups(), 1);
}

#[tokio::test]
async fn test_gateway_lookup_with_wrong_token_fails() {
    let mock = MockGateway::start().await.expect("Failed to start mock");
    let api = Api::new(mock.api_base());
    let credentials = Credentials::new("someone-else").unwrap();

    let err = fetch_gateway_url(&request(), &api, &credentials)
        .await
        .unwrap_err();

    assert!(
        matches!(&err, GatewayError::Request(e) if e.status() == Some(401)),
        "got {err:?}"
    );
}
