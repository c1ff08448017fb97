/*
[INPUT]:  TaskHandle, StatusSource, shared TaskRecord, poll interval, update callback
[OUTPUT]: Background poll loop that stops on a terminal status or cancellation
[POS]:    Execution layer - per-task status polling state machine
[UPDATE]: When changing tick ordering, stop conditions or callback payloads
*/

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use cognito_adapter::{CognitoClient, TaskHandle, TaskStatus, TaskStatusResponse};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::classifier::{Severity, StatusDescriptor, classify};
use crate::snapshot::{ApplyOutcome, TaskRecord, TaskSnapshot};
use crate::transition_log::TransitionEntry;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

pub type SharedRecord = Arc<Mutex<TaskRecord>>;

/// Anything that can report the status of a task
#[async_trait]
pub trait StatusSource: fmt::Debug + Send + Sync + 'static {
    async fn fetch_status(&self, handle: &TaskHandle) -> cognito_adapter::Result<TaskStatusResponse>;
}

/// Intake tasks, read from `/tasks/{id}`
#[async_trait]
impl StatusSource for CognitoClient {
    async fn fetch_status(&self, handle: &TaskHandle) -> cognito_adapter::Result<TaskStatusResponse> {
        self.task_status(handle).await
    }
}

/// Transcript tasks, read from `/episodes/tasks/{id}`
#[derive(Debug, Clone)]
pub struct EpisodeTaskSource {
    client: CognitoClient,
}

impl EpisodeTaskSource {
    pub fn new(client: CognitoClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StatusSource for EpisodeTaskSource {
    async fn fetch_status(&self, handle: &TaskHandle) -> cognito_adapter::Result<TaskStatusResponse> {
        self.client.episode_task_status(handle).await
    }
}

/// Payload handed to the update callback after every successful tick
#[derive(Debug, Clone)]
pub struct PollUpdate {
    pub snapshot: TaskSnapshot,
    pub descriptor: StatusDescriptor,
    /// Present only when this tick changed `(status, message)`
    pub new_entry: Option<TransitionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollExit {
    Terminal(TaskStatus),
    Cancelled,
}

/// Polls one task until it reaches a terminal status
#[derive(Debug)]
pub struct TaskPoller {
    source: Arc<dyn StatusSource>,
    record: SharedRecord,
}

impl TaskPoller {
    pub fn new(source: Arc<dyn StatusSource>, record: SharedRecord) -> Self {
        Self { source, record }
    }

    /// Spawn the poll loop. The first query is issued immediately, later ones
    /// every `interval`; a new query is never issued while one is in flight.
    pub fn start<F>(self, handle: TaskHandle, interval: Duration, on_update: F) -> PollerHandle
    where
        F: FnMut(&PollUpdate) + Send + 'static,
    {
        let shutdown = CancellationToken::new();
        let loop_shutdown = shutdown.clone();
        let join = tokio::spawn(async move {
            self.run(handle, interval.max(MIN_INTERVAL), on_update, loop_shutdown)
                .await
        });

        PollerHandle { shutdown, join }
    }

    async fn run<F>(
        self,
        handle: TaskHandle,
        interval: Duration,
        mut on_update: F,
        shutdown: CancellationToken,
    ) -> PollExit
    where
        F: FnMut(&PollUpdate) + Send + 'static,
    {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut tick: u64 = 0;

        debug!(task_id = %handle, interval_ms = interval.as_millis() as u64, "poll loop starting");

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    debug!(task_id = %handle, "poll loop cancelled");
                    return PollExit::Cancelled;
                }
                _ = ticker.tick() => {}
            }
            tick += 1;

            // The query runs detached so cancellation only drops its result.
            let source = Arc::clone(&self.source);
            let query_handle = handle.clone();
            let query = tokio::spawn(async move { source.fetch_status(&query_handle).await });

            let joined = tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    debug!(task_id = %handle, tick, "poll loop cancelled with a query in flight");
                    return PollExit::Cancelled;
                }
                joined = query => joined,
            };

            let report = match joined {
                Ok(Ok(report)) => report,
                Ok(Err(err)) if err.is_retryable() => {
                    debug!(task_id = %handle, tick, error = %err, "status query failed, skipping tick");
                    continue;
                }
                Ok(Err(err)) => {
                    warn!(task_id = %handle, tick, error = %err, "status query refused, skipping tick");
                    continue;
                }
                Err(err) => {
                    warn!(task_id = %handle, tick, error = %err, "status query aborted, skipping tick");
                    continue;
                }
            };

            if shutdown.is_cancelled() {
                return PollExit::Cancelled;
            }

            let snapshot = TaskSnapshot::from_report(handle.clone(), report);
            if !snapshot.status.is_known() {
                debug!(task_id = %handle, tick, status = %snapshot.status, "unrecognized task status");
            }
            let descriptor = classify(&snapshot.status);

            let outcome = {
                let mut record = self.record.lock().await;
                record.apply(tick, snapshot.clone(), descriptor.terminal)
            };
            let new_entry = match outcome {
                ApplyOutcome::Applied(entry) => entry,
                ApplyOutcome::Stale => {
                    debug!(task_id = %handle, tick, "stale status report discarded");
                    continue;
                }
            };

            if let Some(entry) = &new_entry {
                info!(
                    task_id = %handle,
                    status = %entry.status,
                    message = %entry.message,
                    progress = descriptor.progress,
                    "task transition"
                );
            }

            let terminal = descriptor.terminal;
            let update = PollUpdate {
                snapshot,
                descriptor,
                new_entry,
            };
            on_update(&update);

            if terminal {
                let status = update.snapshot.status;
                if update.descriptor.severity == Severity::Error {
                    warn!(task_id = %handle, status = %status, "task reached terminal state");
                } else {
                    info!(task_id = %handle, status = %status, "task reached terminal state");
                }
                return PollExit::Terminal(status);
            }
        }
    }
}

/// Control handle for a running poll loop
#[derive(Debug)]
pub struct PollerHandle {
    shutdown: CancellationToken,
    join: JoinHandle<PollExit>,
}

impl PollerHandle {
    /// Stop polling. Idempotent and safe after the loop has ended on its own.
    pub fn cancel(&self) {
        self.shutdown.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Token that cancels this loop, for wiring into signal handlers
    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Wait for the loop to stop
    pub async fn wait(self) -> Result<PollExit> {
        self.join.await.context("poll loop task failed")
    }
}
