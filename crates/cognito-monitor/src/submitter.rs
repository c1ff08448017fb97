/*
[INPUT]:  User-supplied locator or transcript and an AuthSession
[OUTPUT]: Task handle plus the initial synthetic snapshot
[POS]:    Submission layer - locator normalization and authenticated intake
[UPDATE]: When intake rules or rejection handling change
*/

use std::fmt;
use std::future::Future;

use cognito_adapter::{AuthSession, CognitoError, Credential, Result, TaskHandle};
use tracing::{info, warn};

use crate::snapshot::TaskSnapshot;

const DEFAULT_SCHEME: &str = "https://";

/// What a task was created from. Also decides which status endpoint tracks it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOrigin {
    /// Normalized media locator sent to the intake endpoint
    Url(String),
    /// Transcript text attached to an existing episode
    Transcript { episode_id: i64 },
}

impl fmt::Display for TaskOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOrigin::Url(locator) => f.write_str(locator),
            TaskOrigin::Transcript { episode_id } => write!(f, "episode {episode_id} transcript"),
        }
    }
}

/// Accepted submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub handle: TaskHandle,
    pub origin: TaskOrigin,
    pub snapshot: TaskSnapshot,
}

/// Trim `raw` and qualify it with `https://` when it carries no scheme.
///
/// A leading `//` is collapsed before the scheme is prepended. Locators that
/// already carry a scheme are returned unchanged.
pub fn normalize_locator(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CognitoError::EmptyLocator);
    }

    if has_scheme(trimmed) {
        return Ok(trimmed.to_string());
    }

    let rest = trimmed.strip_prefix("//").unwrap_or(trimmed);
    Ok(format!("{DEFAULT_SCHEME}{rest}"))
}

fn has_scheme(locator: &str) -> bool {
    let Some((scheme, _)) = locator.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[derive(Debug, Clone)]
pub struct TaskSubmitter {
    session: AuthSession,
}

impl TaskSubmitter {
    pub fn new(session: AuthSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Submit a locator under a valid session.
    ///
    /// Empty locators fail before any network call.
    pub async fn submit(&self, raw_locator: &str) -> Result<Submission> {
        let locator = normalize_locator(raw_locator)?;
        let client = self.session.client();
        let target = locator.as_str();

        let accepted = self
            .authorized(|credential| async move { client.submit_url(&credential, target).await })
            .await?;

        let handle = accepted.task_id;
        info!(task_id = %handle, locator = %locator, "task submitted");
        Ok(Self::accepted(handle, TaskOrigin::Url(locator)))
    }

    /// Submit transcript text for an existing episode.
    ///
    /// Blank transcripts fail before any network call. The text is sent as
    /// given, without trimming.
    pub async fn submit_transcript(&self, episode_id: i64, transcript: &str) -> Result<Submission> {
        if transcript.trim().is_empty() {
            return Err(CognitoError::EmptyTranscript);
        }
        let client = self.session.client();

        let accepted = self
            .authorized(|credential| async move {
                client
                    .submit_transcript(&credential, episode_id, transcript)
                    .await
            })
            .await?;

        let handle = accepted.task_id;
        info!(task_id = %handle, episode_id, chars = transcript.len(), "transcript submitted");
        Ok(Self::accepted(handle, TaskOrigin::Transcript { episode_id }))
    }

    /// Run `call` with a valid credential. A credential refused by the
    /// endpoint is dropped and the call retried once with a fresh one. Any
    /// other error reply becomes `SubmissionRejected`.
    async fn authorized<T, F, Fut>(&self, call: F) -> Result<T>
    where
        F: Fn(Credential) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let credential = self.session.ensure_valid().await?;
        let response = match call(credential.clone()).await {
            Err(err) if err.is_auth_error() => {
                warn!(username = credential.username(), "credential refused at submission, retrying once");
                self.session.invalidate(&credential);
                let fresh = self.session.ensure_valid().await?;
                call(fresh).await
            }
            other => other,
        };

        response.map_err(|err| match err {
            CognitoError::Api { message, .. } => CognitoError::SubmissionRejected { detail: message },
            other => other,
        })
    }

    fn accepted(handle: TaskHandle, origin: TaskOrigin) -> Submission {
        Submission {
            snapshot: TaskSnapshot::submitted(handle.clone()),
            handle,
            origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("example.com/v", "https://example.com/v")]
    #[case("https://example.com/v", "https://example.com/v")]
    #[case("//example.com/v", "https://example.com/v")]
    #[case("  site.test/video \n", "https://site.test/video")]
    #[case("http://example.com/v", "http://example.com/v")]
    #[case("HTTPS://Example.com/V", "HTTPS://Example.com/V")]
    #[case("www.bilibili.com/video/BV1xx", "https://www.bilibili.com/video/BV1xx")]
    fn test_normalize_locator(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_locator(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    fn test_empty_locator_is_rejected(#[case] raw: &str) {
        assert!(matches!(normalize_locator(raw), Err(CognitoError::EmptyLocator)));
    }

    #[test]
    fn test_origin_display() {
        assert_eq!(TaskOrigin::Url("https://a.test/v".to_string()).to_string(), "https://a.test/v");
        assert_eq!(TaskOrigin::Transcript { episode_id: 4 }.to_string(), "episode 4 transcript");
    }

    #[test]
    fn test_scheme_detection() {
        assert!(has_scheme("rtmp://live.test/stream"));
        assert!(has_scheme("git+ssh://host/repo"));
        assert!(!has_scheme("example.com/a://b"));
        assert!(!has_scheme("://missing"));
        assert!(!has_scheme("example.com"));
    }
}
