//! Structured logging integration for events
//!
//! Converts domain events into tracing records with structured fields.

use xpisign_events::{AppEvent, EventMessage, GeneralEvent, SubmissionEvent};
use tracing::{debug, error, info, warn};

/// Log an event through tracing at the level recorded in its metadata
pub fn log_event_with_tracing(message: &EventMessage) {
    let event = &message.event;
    let meta = &message.meta;

    match event {
        AppEvent::Submission(submission_event) => match submission_event {
            SubmissionEvent::Uploading {
                addon_id,
                version,
                file_name,
                size,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    addon_id = %addon_id,
                    version = %version,
                    file_name = %file_name,
                    size = size,
                    "Uploading package"
                );
            }
            SubmissionEvent::Submitted { guid, status_url } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    guid = %guid,
                    status_url = %status_url,
                    "Upload accepted"
                );
            }
            SubmissionEvent::PollScheduled {
                attempt,
                max_attempts,
                delay,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    attempt = attempt,
                    max_attempts = max_attempts,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Status poll scheduled"
                );
            }
            SubmissionEvent::Polled {
                attempt,
                processed,
                valid,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    attempt = attempt,
                    processed = processed,
                    valid = valid,
                    "Status received"
                );
            }
            SubmissionEvent::Validated {
                guid,
                valid,
                errors,
                warnings,
                notices,
                files,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    guid = %guid,
                    valid = valid,
                    errors = errors,
                    warnings = warnings,
                    notices = notices,
                    files = files,
                    "Validation finished"
                );
            }
            SubmissionEvent::DownloadStarted { url, destination } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    url = %url,
                    destination = %destination.display(),
                    "Download started"
                );
            }
            SubmissionEvent::DownloadCompleted {
                path,
                size,
                sha256,
                verified,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    path = %path.display(),
                    size = size,
                    sha256 = %sha256,
                    verified = verified,
                    "Download completed"
                );
            }
            SubmissionEvent::StateChanged { from, to } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    from = ?from,
                    to = %to,
                    "Workflow state changed"
                );
            }
            SubmissionEvent::Failed { stage, failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    stage = ?stage,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Signing failed"
                );
            }
        },

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::OperationStarted { operation } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    operation = %operation,
                    "Operation started"
                );
            }
            GeneralEvent::OperationCompleted { operation, success } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    operation = %operation,
                    success = success,
                    "Operation completed"
                );
            }
            GeneralEvent::Warning { message } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    message = %message,
                    "Warning"
                );
            }
            GeneralEvent::DebugLog { message } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    message = %message,
                    "Debug log"
                );
            }
        },
    }
}
