/*
[INPUT]:  Raw status strings reported by the task service
[OUTPUT]: Typed TaskStatus with lossless handling of unknown values
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When the service adds or renames task stages
*/

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a remote task.
///
/// The service may skip or repeat intermediate stages, so no ordering is
/// implied between the non-terminal variants. Values outside the known set
/// are kept verbatim in `Unknown`. Transcript jobs report success as
/// `completed`, which parses to `Succeeded`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    Pending,
    Downloading,
    Transcribing,
    Processing,
    Succeeded,
    Failed,
    Unknown(String),
}

impl TaskStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Downloading => "downloading",
            TaskStatus::Transcribing => "transcribing",
            TaskStatus::Processing => "processing",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
            TaskStatus::Unknown(raw) => raw,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TaskStatus::Unknown(_))
    }
}

impl From<&str> for TaskStatus {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => TaskStatus::Pending,
            "downloading" => TaskStatus::Downloading,
            "transcribing" => TaskStatus::Transcribing,
            "processing" => TaskStatus::Processing,
            "succeeded" | "completed" => TaskStatus::Succeeded,
            "failed" => TaskStatus::Failed,
            _ => TaskStatus::Unknown(raw.to_string()),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        TaskStatus::from(raw.as_str())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
