/*
[INPUT]:  AuthSession (or MonitorConfig), locator or transcript, poll interval, update callback
[OUTPUT]: MonitorHandle tying a submitted task to its running poll loop
[POS]:    Composition layer - submit-and-monitor entry point
[UPDATE]: When changing how submission and polling are wired together
*/

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use cognito_adapter::{AuthSession, TaskHandle};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::config::MonitorConfig;
use crate::poller::{
    EpisodeTaskSource, PollExit, PollUpdate, PollerHandle, SharedRecord, StatusSource, TaskPoller,
};
use crate::snapshot::{TaskRecord, TaskSnapshot};
use crate::submitter::{Submission, TaskOrigin, TaskSubmitter};
use crate::transition_log::TransitionEntry;

/// Submits tasks and starts one independent poll loop per task
#[derive(Debug, Clone)]
pub struct TaskMonitor {
    submitter: TaskSubmitter,
    url_source: Arc<dyn StatusSource>,
    transcript_source: Arc<dyn StatusSource>,
}

impl TaskMonitor {
    /// Poll through the session's own client
    pub fn new(session: AuthSession) -> Self {
        let client = session.client().clone();
        let url_source: Arc<dyn StatusSource> = Arc::new(client.clone());
        let transcript_source: Arc<dyn StatusSource> = Arc::new(EpisodeTaskSource::new(client));
        Self {
            submitter: TaskSubmitter::new(session),
            url_source,
            transcript_source,
        }
    }

    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        let client = config.build_client()?;
        Ok(Self::new(AuthSession::new(client, config.identity())))
    }

    pub fn submitter(&self) -> &TaskSubmitter {
        &self.submitter
    }

    /// Submit `locator` and follow the resulting task.
    ///
    /// Submission failures are returned to the caller; polling failures
    /// never are. `on_update` runs after every successful poll tick.
    pub async fn submit_and_monitor<F>(
        &self,
        locator: &str,
        interval: Duration,
        on_update: F,
    ) -> cognito_adapter::Result<MonitorHandle>
    where
        F: FnMut(&PollUpdate) + Send + 'static,
    {
        let submission = self.submitter.submit(locator).await?;
        Ok(self.follow(submission, interval, on_update))
    }

    /// Submit a transcript for `episode_id` and follow the processing task
    pub async fn submit_transcript_and_monitor<F>(
        &self,
        episode_id: i64,
        transcript: &str,
        interval: Duration,
        on_update: F,
    ) -> cognito_adapter::Result<MonitorHandle>
    where
        F: FnMut(&PollUpdate) + Send + 'static,
    {
        let submission = self
            .submitter
            .submit_transcript(episode_id, transcript)
            .await?;
        Ok(self.follow(submission, interval, on_update))
    }

    fn follow<F>(&self, submission: Submission, interval: Duration, on_update: F) -> MonitorHandle
    where
        F: FnMut(&PollUpdate) + Send + 'static,
    {
        let source = match submission.origin {
            TaskOrigin::Url(_) => Arc::clone(&self.url_source),
            TaskOrigin::Transcript { .. } => Arc::clone(&self.transcript_source),
        };
        let record: SharedRecord = Arc::new(Mutex::new(TaskRecord::new(submission.snapshot)));

        let poller = TaskPoller::new(source, Arc::clone(&record)).start(
            submission.handle.clone(),
            interval,
            on_update,
        );

        MonitorHandle {
            handle: submission.handle,
            origin: submission.origin,
            record,
            poller,
        }
    }
}

/// A submitted task and its poll loop
#[derive(Debug)]
pub struct MonitorHandle {
    handle: TaskHandle,
    origin: TaskOrigin,
    record: SharedRecord,
    poller: PollerHandle,
}

impl MonitorHandle {
    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    /// What was submitted
    pub fn origin(&self) -> &TaskOrigin {
        &self.origin
    }

    pub fn cancel(&self) {
        self.poller.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.poller.cancellation_token()
    }

    pub fn is_finished(&self) -> bool {
        self.poller.is_finished()
    }

    /// Shared record, readable after the handle is consumed by [`wait`](Self::wait)
    pub fn record(&self) -> SharedRecord {
        Arc::clone(&self.record)
    }

    pub async fn snapshot(&self) -> TaskSnapshot {
        self.record.lock().await.snapshot().clone()
    }

    pub async fn history(&self) -> Vec<TransitionEntry> {
        self.record.lock().await.log().entries().to_vec()
    }

    pub async fn wait(self) -> Result<PollExit> {
        self.poller.wait().await
    }
}
