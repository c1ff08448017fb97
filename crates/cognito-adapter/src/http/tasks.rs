/*
[INPUT]:  Normalized locators, transcripts, task handles and bearer credentials
[OUTPUT]: Task handles and task status reports
[POS]:    HTTP layer - intake, transcript and task status endpoints
[UPDATE]: When adding task endpoints or changing payloads
*/

use reqwest::Method;

use crate::auth::Credential;
use crate::http::{CognitoClient, Result};
use crate::types::{
    SubmitResponse, SubmitTranscriptRequest, SubmitUrlRequest, TaskHandle, TaskStatusResponse,
};

impl CognitoClient {
    /// Submit a media URL for ingestion
    ///
    /// POST /intake/submit_url
    /// Requires: Authorization header
    pub async fn submit_url(&self, credential: &Credential, url: &str) -> Result<SubmitResponse> {
        let body = SubmitUrlRequest {
            url: url.to_string(),
        };
        let builder = self
            .request_with_token(Method::POST, &["intake", "submit_url"], credential)?
            .json(&body);
        self.send_json(builder).await
    }

    /// Submit transcript text for an existing episode
    ///
    /// POST /episodes/transcript
    /// Requires: Authorization header
    pub async fn submit_transcript(
        &self,
        credential: &Credential,
        episode_id: i64,
        transcript: &str,
    ) -> Result<SubmitResponse> {
        let body = SubmitTranscriptRequest {
            episode_id,
            transcript: transcript.to_string(),
        };
        let builder = self
            .request_with_token(Method::POST, &["episodes", "transcript"], credential)?
            .json(&body);
        self.send_json(builder).await
    }

    /// Query the current status of an intake task
    ///
    /// GET /tasks/{task_id}
    pub async fn task_status(&self, handle: &TaskHandle) -> Result<TaskStatusResponse> {
        let builder = self.request(Method::GET, &["tasks", handle.as_str()])?;
        self.send_json(builder).await
    }

    /// Query the current status of a transcript task
    ///
    /// GET /episodes/tasks/{task_id}
    pub async fn episode_task_status(&self, handle: &TaskHandle) -> Result<TaskStatusResponse> {
        let builder = self.request(Method::GET, &["episodes", "tasks", handle.as_str()])?;
        self.send_json(builder).await
    }
}
