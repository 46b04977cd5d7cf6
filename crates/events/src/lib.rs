#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for xpisign
//!
//! Library crates never print or log directly. They emit [`AppEvent`]s on
//! an unbounded channel and the CLI decides how to render and log them.

pub mod meta;
pub use meta::{EventLevel, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, FailureContext, GeneralEvent, SubmissionEvent};

use tokio::sync::mpsc::UnboundedSender;

/// An event together with its envelope
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EventMessage {
    pub meta: EventMeta,
    pub event: AppEvent,
}

impl EventMessage {
    /// Wrap an event with metadata derived from its domain and level.
    #[must_use]
    pub fn from_event(event: AppEvent, correlation_id: Option<&str>) -> Self {
        let mut meta = EventMeta::new(event.log_level(), event.event_source());
        if let Some(id) = correlation_id {
            meta = meta.with_correlation_id(id);
        }
        Self { meta, event }
    }
}

pub type EventSender = UnboundedSender<EventMessage>;

pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events
///
/// Implemented by the raw [`EventSender`] and by any struct that owns one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Correlation id stamped on every emitted event
    fn correlation_id(&self) -> Option<&str> {
        None
    }

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(EventMessage::from_event(event, self.correlation_id()));
        }
    }

    fn emit_submission(&self, event: SubmissionEvent) {
        self.emit(AppEvent::Submission(event));
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit an operation started event
    fn emit_operation_started(&self, operation: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::OperationStarted {
            operation: operation.into(),
        }));
    }

    /// Emit an operation completed event
    fn emit_operation_completed(&self, operation: impl Into<String>, success: bool) {
        self.emit(AppEvent::General(GeneralEvent::OperationCompleted {
            operation: operation.into(),
            success,
        }));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xpisign_errors::{Error, SubmissionError};

    #[tokio::test]
    async fn test_emit_wraps_meta() {
        let (tx, mut rx) = channel();
        tx.emit_submission(SubmissionEvent::Submitted {
            guid: "g".into(),
            status_url: "https://x/status".into(),
        });

        let message = rx.recv().await.unwrap();
        assert_eq!(message.meta.source, EventSource::SUBMISSION);
        assert_eq!(message.meta.level, EventLevel::Info);
        assert!(message.meta.correlation_id.is_none());
    }

    #[test]
    fn test_failure_level_and_context() {
        let err: Error = SubmissionError::NoFilesAvailable { guid: "g".into() }.into();
        let event = AppEvent::Submission(SubmissionEvent::Failed {
            stage: None,
            failure: FailureContext::from_error(&err),
        });
        assert_eq!(event.log_level(), tracing::Level::ERROR);
        assert_eq!(event.log_target(), "xpisign::events::submission");

        let message = EventMessage::from_event(event, Some("addon@example.org"));
        assert_eq!(
            message.meta.correlation_id.as_deref(),
            Some("addon@example.org")
        );
        match message.event {
            AppEvent::Submission(SubmissionEvent::Failed { failure, .. }) => {
                assert_eq!(failure.code.as_deref(), Some("submission.no_files"));
                assert!(failure.retryable);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (tx, rx) = channel();
        drop(rx);
        tx.emit_debug("nobody is listening");
    }
}
