/*
[INPUT]:  TaskStatus values observed by the poller
[OUTPUT]: Display descriptors (progress estimate, severity, label, terminal flag)
[POS]:    Presentation support - shared by poller terminal check and consumers
[UPDATE]: When task stages or their presentation change
*/

use std::fmt;

use cognito_adapter::TaskStatus;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Active,
    Success,
    Error,
    Unknown,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Severity::Info => "info",
            Severity::Active => "active",
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Unknown => "unknown",
        };
        f.pad(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDescriptor {
    /// Rough completion estimate, 0-100
    pub progress: u8,
    pub severity: Severity,
    pub label: String,
    pub terminal: bool,
}

/// Map a status to its descriptor. Never fails: statuses outside the known
/// set get progress 0, `Severity::Unknown` and the raw value as label.
pub fn classify(status: &TaskStatus) -> StatusDescriptor {
    let (progress, severity, label, terminal) = match status {
        TaskStatus::Pending => (5, Severity::Info, "Queued", false),
        TaskStatus::Downloading => (25, Severity::Active, "Downloading media", false),
        TaskStatus::Transcribing => (50, Severity::Active, "Transcribing audio", false),
        TaskStatus::Processing => (75, Severity::Active, "Processing transcript", false),
        TaskStatus::Succeeded => (100, Severity::Success, "Completed", true),
        TaskStatus::Failed => (100, Severity::Error, "Failed", true),
        TaskStatus::Unknown(raw) => {
            return StatusDescriptor {
                progress: 0,
                severity: Severity::Unknown,
                label: raw.clone(),
                terminal: false,
            };
        }
    };

    StatusDescriptor {
        progress,
        severity,
        label: label.to_string(),
        terminal,
    }
}
