use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use xpisign_types::WorkflowState;

use super::FailureContext;

/// Progress of one package through submit, poll and download
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SubmissionEvent {
    /// Package read from disk, upload about to start
    Uploading {
        addon_id: String,
        version: String,
        file_name: String,
        size: u64,
    },

    /// Service accepted the upload
    Submitted { guid: String, status_url: String },

    /// Waiting before the next status request
    PollScheduled {
        attempt: u32,
        max_attempts: u32,
        delay: Duration,
    },

    /// A status snapshot arrived
    Polled {
        attempt: u32,
        processed: bool,
        valid: bool,
    },

    /// Final snapshot handed to the download stage
    Validated {
        guid: String,
        valid: bool,
        errors: u32,
        warnings: u32,
        notices: u32,
        files: usize,
    },

    DownloadStarted { url: String, destination: PathBuf },

    DownloadCompleted {
        path: PathBuf,
        size: u64,
        sha256: String,
        verified: bool,
    },

    StateChanged {
        from: Option<WorkflowState>,
        to: WorkflowState,
    },

    /// The workflow stopped at `stage`
    Failed {
        stage: Option<WorkflowState>,
        failure: FailureContext,
    },
}
