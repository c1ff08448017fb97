/*
[INPUT]:  Submission results and successful poll reports
[OUTPUT]: Live task snapshot plus its transition history
[POS]:    Shared state between the poll loop and readers
[UPDATE]: When adding task-level fields exposed to consumers
*/

use cognito_adapter::{TaskHandle, TaskStatus, TaskStatusResponse};
use serde::Serialize;

use crate::transition_log::{TransitionEntry, TransitionLog};

pub const SUBMITTED_MESSAGE: &str = "submitted, queued";

/// Most recent known state of a monitored task
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskSnapshot {
    pub handle: TaskHandle,
    pub status: TaskStatus,
    pub message: String,
    pub result_id: Option<i64>,
}

impl TaskSnapshot {
    /// Synthetic snapshot recorded right after a submission is accepted
    pub fn submitted(handle: TaskHandle) -> Self {
        Self {
            handle,
            status: TaskStatus::Pending,
            message: SUBMITTED_MESSAGE.to_string(),
            result_id: None,
        }
    }

    pub fn from_report(handle: TaskHandle, report: TaskStatusResponse) -> Self {
        Self {
            handle,
            status: report.status,
            message: report.message,
            result_id: report.episode_id,
        }
    }
}

/// Result of feeding one poll tick into a [`TaskRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// An equal or newer tick was already applied, or a terminal state was latched
    Stale,
    /// Snapshot replaced; carries the history entry when one was appended
    Applied(Option<TransitionEntry>),
}

/// Snapshot and history of one task, always mutated together under one lock
#[derive(Debug)]
pub struct TaskRecord {
    snapshot: TaskSnapshot,
    log: TransitionLog,
    last_tick: u64,
    terminal: bool,
}

impl TaskRecord {
    /// Start a record whose history already holds `initial`
    pub fn new(initial: TaskSnapshot) -> Self {
        let mut log = TransitionLog::new();
        log.append(&initial);
        Self {
            snapshot: initial,
            log,
            last_tick: 0,
            terminal: false,
        }
    }

    pub fn snapshot(&self) -> &TaskSnapshot {
        &self.snapshot
    }

    pub fn log(&self) -> &TransitionLog {
        &self.log
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Apply the result of poll tick `tick` as one step: replace the
    /// snapshot, then append to the history if `(status, message)` changed.
    pub fn apply(&mut self, tick: u64, snapshot: TaskSnapshot, terminal: bool) -> ApplyOutcome {
        if self.terminal || tick <= self.last_tick {
            return ApplyOutcome::Stale;
        }

        self.last_tick = tick;
        self.terminal = terminal;
        let appended = self.log.append(&snapshot);
        self.snapshot = snapshot;

        let entry = if appended { self.log.last().cloned() } else { None };
        ApplyOutcome::Applied(entry)
    }
}
