/*
[INPUT]:  HTTP configuration (base URL, timeouts, bearer credentials)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::auth::Credential;
use crate::http::{CognitoError, Result};
use crate::types::ErrorBody;

/// Default base URL of the Cognito backend
const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Main HTTP client for the Cognito API.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CognitoClient {
    http_client: Client,
    base_url: Url,
    timeout: Duration,
}

impl CognitoClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_url(config, DEFAULT_BASE_URL)
    }

    /// Create a new client pointed at an explicit base URL
    pub fn with_config_and_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(cannot_be_base(&base_url));
        }

        Ok(Self {
            http_client,
            base_url,
            timeout: config.timeout,
        })
    }

    /// Base URL every endpoint is joined onto
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build full URL for an endpoint.
    ///
    /// Segments are appended below the base path and percent-encoded, so a
    /// base such as `https://host/cognito` keeps its prefix.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| cannot_be_base(&self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build request builder for public endpoints
    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        Ok(self.http_client.request(method, url))
    }

    /// Build request builder carrying a bearer credential
    pub(crate) fn request_with_token(
        &self,
        method: Method,
        segments: &[&str],
        credential: &Credential,
    ) -> Result<RequestBuilder> {
        Ok(self.request(method, segments)?.bearer_auth(credential.token()))
    }

    /// Send a request and decode a JSON success body.
    ///
    /// Non-success responses become `CognitoError::Api` with the `detail`
    /// from the error body, or `HTTP <code>` when no such body exists.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await.map_err(|err| self.map_transport(err))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.map_transport(err))?;
        trace!(status = status.as_u16(), len = body.len(), "response received");

        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorBody>(&body)
                .map(|error| error.detail_text())
                .unwrap_or_else(|_| format!("HTTP {}", status.as_u16()));
            return Err(CognitoError::api_error(status, message));
        }

        serde_json::from_slice(&body).map_err(|err| {
            CognitoError::InvalidResponse(format!("failed to decode response body: {err}"))
        })
    }

    fn map_transport(&self, err: reqwest::Error) -> CognitoError {
        if err.is_timeout() {
            CognitoError::Timeout {
                duration: self.timeout,
            }
        } else {
            CognitoError::Http(err)
        }
    }
}

fn cannot_be_base(url: &Url) -> CognitoError {
    CognitoError::Config(format!("base URL {url} cannot carry endpoint paths"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> CognitoClient {
        CognitoClient::with_config_and_base_url(ClientConfig::default(), &server.uri())
            .expect("client init")
    }

    #[test]
    fn test_default_base_url() {
        let client = CognitoClient::new().unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = CognitoClient::with_config_and_base_url(ClientConfig::default(), "not a url")
            .unwrap_err();
        assert!(matches!(err, CognitoError::UrlParse(_)));

        let err = CognitoClient::with_config_and_base_url(ClientConfig::default(), "mailto:ops@site.test")
            .unwrap_err();
        assert!(matches!(err, CognitoError::Config(_)));
    }

    #[rstest]
    #[case("http://api.test", "http://api.test/tasks/1")]
    #[case("http://api.test/", "http://api.test/tasks/1")]
    #[case("http://api.test/cognito", "http://api.test/cognito/tasks/1")]
    #[case("http://api.test/cognito/", "http://api.test/cognito/tasks/1")]
    fn test_endpoint_keeps_base_path(#[case] base: &str, #[case] expected: &str) {
        let client = CognitoClient::with_config_and_base_url(ClientConfig::default(), base).unwrap();
        assert_eq!(client.url(&["tasks", "1"]).unwrap().as_str(), expected);
    }

    #[test]
    fn test_endpoint_segments_are_escaped() {
        let client = CognitoClient::new().unwrap();
        let url = client.url(&["tasks", "a/b?c#d"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/tasks/a%2Fb%3Fc%23d");
    }

    #[tokio::test]
    async fn test_path_prefixed_base_routes_under_prefix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cognito/tasks/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let base = format!("{}/cognito/", server.uri());
        let client = CognitoClient::with_config_and_base_url(ClientConfig::default(), &base).unwrap();
        let builder = client.request(Method::GET, &["tasks", "1"]).unwrap();
        let body: serde_json::Value = client.send_json(builder).await.expect("routed under prefix");
        assert_eq!(body["ok"], true);
    }

    #[tokio::test]
    async fn test_send_json_extracts_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tasks/9"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({"detail": "task not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let builder = client.request(Method::GET, &["tasks", "9"]).unwrap();
        let err = client
            .send_json::<serde_json::Value>(builder)
            .await
            .unwrap_err();

        match err {
            CognitoError::Api { code, message } => {
                assert_eq!(code, 404);
                assert_eq!(message, "task not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_json_falls_back_to_status_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let builder = client.request(Method::GET, &["broken"]).unwrap();
        let err = client
            .send_json::<serde_json::Value>(builder)
            .await
            .unwrap_err();

        assert_eq!(err.detail(), "HTTP 502");
    }

    #[tokio::test]
    async fn test_send_json_rejects_malformed_success_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/garbage"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let builder = client.request(Method::GET, &["garbage"]).unwrap();
        let err = client
            .send_json::<serde_json::Value>(builder)
            .await
            .unwrap_err();

        assert!(matches!(err, CognitoError::InvalidResponse(_)));
        assert!(err.is_transport());
    }
}
