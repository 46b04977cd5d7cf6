//! Tracking of workflow state transitions

use xpisign_errors::Error;
use xpisign_types::WorkflowState;

/// Current workflow state plus every state visited so far
#[derive(Debug, Default, Clone)]
pub struct StateTracker {
    current: Option<WorkflowState>,
    history: Vec<WorkflowState>,
}

impl StateTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<WorkflowState> {
        self.current
    }

    #[must_use]
    pub fn history(&self) -> &[WorkflowState] {
        &self.history
    }

    /// Move to `next`, returning the state left behind.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the transition is not allowed.
    pub fn transition(&mut self, next: WorkflowState) -> Result<Option<WorkflowState>, Error> {
        let allowed = match self.current {
            None => next.is_entry(),
            Some(current) => current.can_transition_to(next),
        };
        if !allowed {
            return Err(Error::internal(format!(
                "illegal workflow transition {} -> {next}",
                self.current.map_or("start", WorkflowState::as_str),
            )));
        }

        let previous = self.current.replace(next);
        self.history.push(next);
        Ok(previous)
    }
}
