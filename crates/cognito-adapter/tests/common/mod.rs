/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for cognito-adapter tests

#![allow(dead_code)]

use cognito_adapter::{AuthSession, ClientConfig, CognitoClient, Identity};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server
pub fn client_for(server: &MockServer) -> CognitoClient {
    CognitoClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
        .expect("client init")
}

/// Session using the default demo identity
pub fn session_for(server: &MockServer) -> AuthSession {
    AuthSession::new(client_for(server), Identity::default())
}

/// Mock access token for testing
pub fn mock_access_token() -> String {
    "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.test.signature".to_string()
}

/// Mount a successful `/auth/me` probe expected `times` times
pub async fn mount_probe_ok(server: &MockServer, times: u64) {
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "username": "demo",
            "role": "creator",
        })))
        .expect(times)
        .mount(server)
        .await;
}

/// Mount register + login returning `token`, each expected `times` times
pub async fn mount_acquire(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "ok"})))
        .expect(times)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": token,
            "token_type": "bearer",
        })))
        .expect(times)
        .mount(server)
        .await;
}
