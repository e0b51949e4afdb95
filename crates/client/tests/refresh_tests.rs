//! Integration tests for transparent access-token refresh
//!
//! Covers the retry-once contract: a single first-attempt 401 triggers one
//! refresh and one replay; everything else is surfaced to the caller as-is.

use orvio_client::{ClientError, OrvioClientBuilder, Session};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stats_body() -> serde_json::Value {
    json!({
        "provider": {
            "currentDevice": null,
            "allDevices": {
                "failedToSendAck": 0,
                "sentAckNotVerified": 1,
                "sentAckVerified": 12,
                "totalMessagesSent": 13,
                "totalDevices": 2,
                "activeDevices": 1
            }
        },
        "consumer": {
            "aggregate": {
                "totalKeys": 1,
                "activeKeys": 1,
                "oldestKey": 1713264000,
                "newestKey": 1713264000,
                "lastUsedKey": 1735693200
            },
            "keys": []
        },
        "credits": { "balance": 42, "mode": "direct" }
    })
}

fn client_for(server: &MockServer) -> orvio_client::AuthenticatedOrvioClient {
    OrvioClientBuilder::new()
        .base_url(server.uri())
        .build_authenticated(Session::new("A1", "R1"))
        .unwrap()
}

#[tokio::test]
async fn success_on_first_attempt_issues_no_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/stats"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A2"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let stats = client.stats().await.unwrap();
    assert_eq!(stats.credits.balance, 42);
    assert_eq!(client.session(), Session::new("A1", "R1"));
}

#[tokio::test]
async fn expired_token_is_refreshed_and_request_replayed_once() {
    let mock_server = MockServer::start().await;

    // Expired token "A1" is rejected; the replay with "A2" succeeds.
    Mock::given(method("GET"))
        .and(path("/auth/stats"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({"refreshToken": "R1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A2"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/stats"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let stats = client.stats().await.unwrap();
    assert_eq!(stats.provider.all_devices.total_messages_sent, 13);

    // The rotated token is held in memory for the caller to persist.
    assert_eq!(client.session(), Session::new("A2", "R1"));
}

#[tokio::test]
async fn failed_replay_response_is_returned_to_caller() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/stats"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A2"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The replay fails with a non-401 error, which is surfaced unchanged.
    Mock::given(method("GET"))
        .and(path("/auth/stats"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.stats().await;
    assert!(matches!(
        result,
        Err(ClientError::ServerError { status: 500, .. })
    ));
}

#[tokio::test]
async fn refresh_failure_takes_precedence_over_original_401() {
    let mock_server = MockServer::start().await;

    // Exactly one stats request: after the refresh fails there is no replay.
    Mock::given(method("GET"))
        .and(path("/auth/stats"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_string("refresh token expired"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.stats().await;
    match result {
        Err(ClientError::AuthenticationFailed(message)) => {
            assert_eq!(message, "refresh token expired");
        }
        other => panic!("expected refresh failure, got {other:?}"),
    }
}

#[tokio::test]
async fn second_401_is_surfaced_without_another_refresh() {
    let mock_server = MockServer::start().await;

    // The server keeps rejecting even after a successful refresh. The replay's
    // 401 must come back to the caller with no further refresh attempt.
    Mock::given(method("GET"))
        .and(path("/auth/stats"))
        .respond_with(ResponseTemplate::new(401).set_body_string("still no"))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A2"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.stats().await;
    match result {
        Err(ClientError::AuthenticationFailed(message)) => assert_eq!(message, "still no"),
        other => panic!("expected second 401, got {other:?}"),
    }
}

#[tokio::test]
async fn non_401_errors_are_never_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/stats"))
        .respond_with(ResponseTemplate::new(403).set_body_string("not yours"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A2"})))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.stats().await;
    assert!(matches!(result, Err(ClientError::Forbidden(_))));
}

#[tokio::test]
async fn later_requests_reuse_the_refreshed_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/auth/stats"))
        .and(header("authorization", "Bearer A1"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "A2"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/auth/stats"))
        .and(header("authorization", "Bearer A2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_body()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client.stats().await.unwrap();
    // Second request goes straight out with the in-memory "A2" token.
    client.stats().await.unwrap();
}
