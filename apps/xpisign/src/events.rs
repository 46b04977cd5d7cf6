//! Event handling and progress display

use console::{style, Term};
use xpisign_events::{AppEvent, EventMessage, GeneralEvent, SubmissionEvent};

use crate::logging::log_event_with_tracing;

/// Logs every event and prints a line per workflow milestone
pub struct EventHandler {
    term: Term,
    colors_enabled: bool,
    /// JSON mode keeps stderr quiet
    quiet: bool,
    debug_enabled: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, quiet: bool, debug_enabled: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            quiet,
            debug_enabled,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        log_event_with_tracing(&message);

        if self.quiet {
            return;
        }

        if let Some(line) = self.render(&message.event) {
            // Best effort: a closed stderr must not fail the workflow
            let _ = self.term.write_line(&line);
        }
    }

    fn render(&self, event: &AppEvent) -> Option<String> {
        match event {
            AppEvent::Submission(event) => self.render_submission(event),
            AppEvent::General(GeneralEvent::Warning { message }) => Some(format!(
                "{} {message}",
                style("warning:").yellow().force_styling(self.colors_enabled)
            )),
            AppEvent::General(GeneralEvent::DebugLog { message }) if self.debug_enabled => {
                Some(format!(
                    "{} {message}",
                    style("debug:").dim().force_styling(self.colors_enabled)
                ))
            }
            AppEvent::General(_) => None,
        }
    }

    fn render_submission(&self, event: &SubmissionEvent) -> Option<String> {
        let line = match event {
            SubmissionEvent::Uploading {
                addon_id,
                version,
                file_name,
                size,
            } => format!("Uploading {file_name} ({size} bytes) as {addon_id} {version}"),
            SubmissionEvent::Submitted { guid, .. } => format!("Submitted, upload {guid}"),
            SubmissionEvent::PollScheduled {
                attempt,
                max_attempts,
                delay,
            } => format!(
                "Waiting {}s for validation (check {attempt}/{max_attempts})",
                delay.as_secs()
            ),
            SubmissionEvent::Validated {
                valid,
                errors,
                warnings,
                notices,
                ..
            } => {
                let verdict = if *valid {
                    style("passed").green()
                } else {
                    style("failed").red()
                };
                format!(
                    "Validation {} ({errors} errors, {warnings} warnings, {notices} notices)",
                    verdict.force_styling(self.colors_enabled)
                )
            }
            SubmissionEvent::DownloadStarted { destination, .. } => {
                format!("Downloading signed package to {}", destination.display())
            }
            SubmissionEvent::DownloadCompleted { path, size, .. } => format!(
                "{} {} ({size} bytes)",
                style("Signed").green().bold().force_styling(self.colors_enabled),
                path.display()
            ),
            SubmissionEvent::StateChanged { from, to } if self.debug_enabled => format!(
                "{} {} -> {to}",
                style("state:").dim().force_styling(self.colors_enabled),
                from.map_or("start", |state| state.as_str())
            ),
            SubmissionEvent::Polled { .. }
            | SubmissionEvent::StateChanged { .. }
            | SubmissionEvent::Failed { .. } => return None,
        };
        Some(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use xpisign_types::WorkflowState;

    #[test]
    fn test_milestones_render() {
        let handler = EventHandler::new(false, false, false);

        let line = handler
            .render(&AppEvent::Submission(SubmissionEvent::PollScheduled {
                attempt: 1,
                max_attempts: 1,
                delay: Duration::from_secs(30),
            }))
            .unwrap();
        assert_eq!(line, "Waiting 30s for validation (check 1/1)");

        let line = handler
            .render(&AppEvent::Submission(SubmissionEvent::Validated {
                guid: "g".into(),
                valid: false,
                errors: 2,
                warnings: 0,
                notices: 1,
                files: 0,
            }))
            .unwrap();
        assert_eq!(line, "Validation failed (2 errors, 0 warnings, 1 notices)");
    }

    #[test]
    fn test_state_changes_only_in_debug() {
        let event = AppEvent::Submission(SubmissionEvent::StateChanged {
            from: Some(WorkflowState::Submitted),
            to: WorkflowState::Polled,
        });

        assert!(EventHandler::new(false, false, false).render(&event).is_none());
        assert_eq!(
            EventHandler::new(false, false, true).render(&event).unwrap(),
            "state: submitted -> polled"
        );
    }
}
