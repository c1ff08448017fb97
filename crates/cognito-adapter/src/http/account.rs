/*
[INPUT]:  Identity descriptors and bearer credentials
[OUTPUT]: Registration acknowledgements, access tokens, identity probes
[POS]:    HTTP layer - account endpoints
[UPDATE]: When auth endpoints or payloads change
*/

// ### Account Endpoints

use reqwest::Method;

use crate::auth::Credential;
use crate::http::{CognitoClient, Result};
use crate::types::{IdentityResponse, LoginRequest, MessageResponse, RegisterRequest, TokenResponse};

impl CognitoClient {
    /// Register a new account
    ///
    /// POST /auth/register
    pub async fn register(&self, req: &RegisterRequest) -> Result<MessageResponse> {
        let builder = self.request(Method::POST, &["auth", "register"])?.json(req);
        self.send_json(builder).await
    }

    /// Exchange username/password for an access token
    ///
    /// POST /auth/login
    pub async fn login(&self, req: &LoginRequest) -> Result<TokenResponse> {
        let builder = self.request(Method::POST, &["auth", "login"])?.json(req);
        self.send_json(builder).await
    }

    /// Identity check for a credential
    ///
    /// GET /auth/me
    pub async fn me(&self, credential: &Credential) -> Result<IdentityResponse> {
        let builder = self.request_with_token(Method::GET, &["auth", "me"], credential)?;
        self.send_json(builder).await
    }
}
