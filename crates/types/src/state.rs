//! Submission workflow state machine

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage reached by a submission
///
/// `Submitted → Polled → Downloaded`, with `Failed` reachable from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Upload accepted and receipt decoded
    Submitted,
    /// Status snapshot decoded
    Polled,
    /// Signed artifact written to disk
    Downloaded,
    /// A stage failed; nothing further runs
    Failed,
}

impl WorkflowState {
    /// States a workflow may start in.
    #[must_use]
    pub fn is_entry(self) -> bool {
        matches!(self, Self::Submitted | Self::Failed)
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Downloaded | Self::Failed)
    }

    /// Whether `next` is a legal successor of `self`.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Submitted, Self::Polled) | (Self::Polled, Self::Downloaded) => true,
            (current, Self::Failed) => !current.is_terminal(),
            _ => false,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Polled => "polled",
            Self::Downloaded => "downloaded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::WorkflowState::{Downloaded, Failed, Polled, Submitted};

    #[test]
    fn test_happy_path_transitions() {
        assert!(Submitted.is_entry());
        assert!(Submitted.can_transition_to(Polled));
        assert!(Polled.can_transition_to(Downloaded));
        assert!(Downloaded.is_terminal());
    }

    #[test]
    fn test_failed_reachable_from_non_terminal_states() {
        assert!(Submitted.can_transition_to(Failed));
        assert!(Polled.can_transition_to(Failed));
        assert!(!Downloaded.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Failed));
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!Submitted.can_transition_to(Downloaded));
        assert!(!Polled.can_transition_to(Submitted));
        assert!(!Failed.can_transition_to(Polled));
        assert!(!Polled.is_entry());
    }
}
