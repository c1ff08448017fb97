/*
[INPUT]:  Error sources (HTTP, API, serialization, auth, submission)
[OUTPUT]: Structured error types with context and retry hints
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the Cognito adapter
#[derive(Error, Debug)]
pub enum CognitoError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// No credential could be obtained from the service
    #[error("Authentication unavailable: {message}")]
    AuthUnavailable { message: String },

    /// The service refused a task submission
    #[error("Submission rejected: {detail}")]
    SubmissionRejected { detail: String },

    /// Locator was empty after trimming
    #[error("Locator must not be empty")]
    EmptyLocator,

    /// Transcript text was blank
    #[error("Transcript must not be empty")]
    EmptyTranscript,

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request timed out
    #[error("Request timeout after {duration:?}")]
    Timeout { duration: Duration },
}

impl CognitoError {
    /// Check if the error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            CognitoError::Api { code, .. } => *code >= 500,
            other => other.is_transport(),
        }
    }

    /// Check if the request never produced a usable response
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CognitoError::Http(_) | CognitoError::Timeout { .. } | CognitoError::InvalidResponse(_)
        )
    }

    /// Check if error indicates the credential was refused
    pub fn is_auth_error(&self) -> bool {
        match self {
            CognitoError::Api { code, .. } => *code == 401 || *code == 403,
            CognitoError::AuthUnavailable { .. } => true,
            _ => false,
        }
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        CognitoError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }

    /// Human readable detail carried by the error, used for rejection reports
    pub fn detail(&self) -> String {
        match self {
            CognitoError::Api { message, .. } => message.clone(),
            CognitoError::SubmissionRejected { detail } => detail.clone(),
            CognitoError::AuthUnavailable { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for Cognito operations
pub type Result<T> = std::result::Result<T, CognitoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let timeout_err = CognitoError::Timeout {
            duration: Duration::from_secs(30),
        };
        assert!(timeout_err.is_retryable());
        assert!(timeout_err.is_transport());

        let server_err = CognitoError::api_error(StatusCode::BAD_GATEWAY, "upstream");
        assert!(server_err.is_retryable());
        assert!(!server_err.is_transport());

        assert!(!CognitoError::EmptyLocator.is_retryable());
        assert!(!CognitoError::api_error(StatusCode::NOT_FOUND, "missing").is_retryable());
    }

    #[test]
    fn test_sub_second_timeout_message() {
        let err = CognitoError::Timeout {
            duration: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Request timeout after 250ms");
    }

    #[test]
    fn test_error_is_auth_error() {
        assert!(CognitoError::api_error(StatusCode::UNAUTHORIZED, "bad token").is_auth_error());
        assert!(
            CognitoError::AuthUnavailable {
                message: "login failed".to_string()
            }
            .is_auth_error()
        );
        assert!(
            !CognitoError::Timeout {
                duration: Duration::from_secs(30)
            }
            .is_auth_error()
        );
        assert!(!CognitoError::api_error(StatusCode::BAD_REQUEST, "exists").is_auth_error());
    }

    #[test]
    fn test_api_error_creation() {
        let err = CognitoError::api_error(StatusCode::BAD_REQUEST, "Invalid url");
        match err {
            CognitoError::Api { code, ref message } => {
                assert_eq!(code, 400);
                assert_eq!(message, "Invalid url");
            }
            _ => panic!("Expected Api error variant"),
        }
        assert_eq!(err.detail(), "Invalid url");
    }
}
