/*
[INPUT]:  Task snapshots in observation order
[OUTPUT]: Deduplicated, timestamped history of status changes
[POS]:    History layer - append-only transition record per task
[UPDATE]: When changing dedup rules or history queries
*/

use chrono::{DateTime, Utc};
use cognito_adapter::TaskStatus;
use serde::Serialize;

use crate::snapshot::TaskSnapshot;

/// One recorded status change; never mutated after insertion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionEntry {
    pub timestamp: DateTime<Utc>,
    pub status: TaskStatus,
    pub message: String,
}

impl TransitionEntry {
    fn matches(&self, snapshot: &TaskSnapshot) -> bool {
        (&self.status, self.message.as_str()) == (&snapshot.status, snapshot.message.as_str())
    }
}

/// Append-only history. No two adjacent entries share `(status, message)`.
#[derive(Debug, Clone, Default)]
pub struct TransitionLog {
    entries: Vec<TransitionEntry>,
}

impl TransitionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `snapshot` unless it repeats the last entry.
    ///
    /// Returns `true` if a new entry was appended.
    pub fn append(&mut self, snapshot: &TaskSnapshot) -> bool {
        if self.entries.last().is_some_and(|last| last.matches(snapshot)) {
            return false;
        }

        self.entries.push(TransitionEntry {
            timestamp: Utc::now(),
            status: snapshot.status.clone(),
            message: snapshot.message.clone(),
        });
        true
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[TransitionEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&TransitionEntry> {
        self.entries.last()
    }

    /// The most recent `limit` entries, oldest first; `0` means all
    pub fn recent(&self, limit: usize) -> &[TransitionEntry] {
        if limit == 0 || limit >= self.entries.len() {
            return &self.entries;
        }
        &self.entries[self.entries.len() - limit..]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
