/*
[INPUT]:  Public API exports for cognito-monitor crate
[OUTPUT]: Module declarations and public re-exports
[POS]:    Crate root - library entry point
[UPDATE]: When adding new modules or public exports
*/

pub mod classifier;
pub mod config;
pub mod monitor;
pub mod poller;
pub mod snapshot;
pub mod submitter;
pub mod transition_log;

// Re-export main types for convenience
pub use classifier::{Severity, StatusDescriptor, classify};
pub use config::MonitorConfig;
pub use monitor::{MonitorHandle, TaskMonitor};
pub use poller::{
    EpisodeTaskSource, PollExit, PollUpdate, PollerHandle, StatusSource, TaskPoller,
};
pub use snapshot::{TaskRecord, TaskSnapshot};
pub use submitter::{Submission, TaskOrigin, TaskSubmitter, normalize_locator};
pub use transition_log::{TransitionEntry, TransitionLog};
