/*
[INPUT]:  Cognito HTTP client and a fallback identity
[OUTPUT]: Credentials accepted by the service at call time
[POS]:    Auth layer - lazy validation and automatic re-acquisition
[UPDATE]: When auth endpoints or acquisition steps change
*/

use tracing::{debug, info, warn};

use crate::http::{CognitoClient, CognitoError, Result};
use crate::types::{LoginRequest, RegisterRequest};

use super::{Credential, TokenStore};

const DEFAULT_USERNAME: &str = "demo";
const DEFAULT_PASSWORD: &str = "demo123";
const DEFAULT_ROLE: &str = "creator";

/// Account used when no valid credential is cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub password: String,
    pub role: String,
}

impl Identity {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role: role.into(),
        }
    }

    fn register_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.clone(),
            password: self.password.clone(),
            role: self.role.clone(),
        }
    }

    fn login_request(&self) -> LoginRequest {
        LoginRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD, DEFAULT_ROLE)
    }
}

/// Owns the current credential and keeps it usable.
///
/// Clones share one [`TokenStore`], so concurrent submissions see the same
/// cached credential. Overlapping `ensure_valid` calls may each run their own
/// probe or login; the store keeps whichever credential was obtained last.
#[derive(Debug, Clone)]
pub struct AuthSession {
    client: CognitoClient,
    identity: Identity,
    store: TokenStore,
}

impl AuthSession {
    /// Create a session with an empty credential cache
    pub fn new(client: CognitoClient, identity: Identity) -> Self {
        Self {
            client,
            identity,
            store: TokenStore::new(),
        }
    }

    /// Seed the cache with a previously issued token
    pub fn with_credential(self, token: impl Into<String>) -> Self {
        let credential = Credential::new(token, self.identity.username.clone());
        self.store.replace(credential);
        self
    }

    pub fn client(&self) -> &CognitoClient {
        &self.client
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Cached credential, without validating it
    pub fn current(&self) -> Option<Credential> {
        self.store.get()
    }

    /// Forget `credential` if it is still the cached one
    pub fn invalidate(&self, credential: &Credential) {
        if self.store.invalidate(credential.token()) {
            debug!(username = credential.username(), "cached credential invalidated");
        }
    }

    /// Return a credential the service accepts right now.
    ///
    /// 1. Probe the cached credential, if any, and return it on success
    /// 2. Otherwise register the fallback identity (conflicts are ignored)
    /// 3. Log in and cache the new credential
    ///
    /// Fails with `AuthUnavailable` only when login fails.
    pub async fn ensure_valid(&self) -> Result<Credential> {
        if let Some(cached) = self.store.get() {
            match self.client.me(&cached).await {
                Ok(identity) => {
                    debug!(username = %identity.username, "cached credential accepted");
                    return Ok(cached);
                }
                Err(err) if err.is_auth_error() => {
                    info!(error = %err, "cached credential rejected, re-acquiring");
                    self.store.invalidate(cached.token());
                }
                Err(err) => {
                    warn!(error = %err, "credential probe failed, re-acquiring");
                }
            }
        } else {
            debug!("no cached credential");
        }

        self.acquire().await
    }

    async fn acquire(&self) -> Result<Credential> {
        let username = self.identity.username.as_str();

        match self.client.register(&self.identity.register_request()).await {
            Ok(_) => info!(username, "registered fallback identity"),
            Err(err) => debug!(username, error = %err, "registration skipped"),
        }

        let token = self
            .client
            .login(&self.identity.login_request())
            .await
            .map_err(|err| CognitoError::AuthUnavailable {
                message: format!("login as {username} failed: {}", err.detail()),
            })?;

        let credential = Credential::new(token.access_token, username);
        if !self.store.replace(credential.clone()) {
            debug!(username, "a newer credential was cached concurrently");
        }
        info!(username, "credential acquired");
        Ok(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ClientConfig;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_for(server: &MockServer) -> AuthSession {
        let client =
            CognitoClient::with_config_and_base_url(ClientConfig::default(), &server.uri()).unwrap();
        AuthSession::new(client, Identity::default())
    }

    async fn mount_login(server: &MockServer, token: &str, expected: u64) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(serde_json::json!({
                "username": DEFAULT_USERNAME,
                "password": DEFAULT_PASSWORD,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": token,
                "token_type": "bearer",
            })))
            .expect(expected)
            .mount(server)
            .await;
    }

    #[test]
    fn test_default_identity() {
        let identity = Identity::default();
        assert_eq!(identity.username, "demo");
        assert_eq!(identity.role, "creator");
    }

    #[tokio::test]
    async fn test_rejected_credential_is_replaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .and(header("authorization", "Bearer expired"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(serde_json::json!({"detail": "invalid token"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(serde_json::json!({"detail": "username exists"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_login(&server, "fresh", 1).await;

        let session = session_for(&server).with_credential("expired");
        let credential = session.ensure_valid().await.expect("re-acquired");

        assert_eq!(credential.token(), "fresh");
        assert_eq!(session.current().unwrap().token(), "fresh");
    }

    #[tokio::test]
    async fn test_probe_transport_failure_falls_through_to_login() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "ok"})))
            .mount(&server)
            .await;
        mount_login(&server, "fresh", 1).await;

        let session = session_for(&server).with_credential("cached");
        let credential = session.ensure_valid().await.expect("re-acquired");
        assert_eq!(credential.token(), "fresh");
    }

    #[tokio::test]
    async fn test_login_failure_is_auth_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(serde_json::json!({"detail": "bad password"})),
            )
            .mount(&server)
            .await;

        let session = session_for(&server);
        let err = session.ensure_valid().await.unwrap_err();

        match err {
            CognitoError::AuthUnavailable { message } => assert!(message.contains("bad password")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(session.current().is_none());
    }
}
