use crate::error::{Error, Result};
use serde::Serialize;
use uuid::Uuid;

/// Lifecycle of one form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Submitted,
    Extracting,
    Generating,
    ParseFailed,
    Validated,
    Reviewing,
    Reviewed,
    Failed,
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubmissionState::Idle => write!(f, "idle"),
            SubmissionState::Submitted => write!(f, "submitted"),
            SubmissionState::Extracting => write!(f, "extracting"),
            SubmissionState::Generating => write!(f, "generating"),
            SubmissionState::ParseFailed => write!(f, "parse_failed"),
            SubmissionState::Validated => write!(f, "validated"),
            SubmissionState::Reviewing => write!(f, "reviewing"),
            SubmissionState::Reviewed => write!(f, "reviewed"),
            SubmissionState::Failed => write!(f, "failed"),
        }
    }
}

impl SubmissionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SubmissionState::Reviewed | SubmissionState::Failed)
    }

    pub fn can_transition_to(self, next: SubmissionState) -> bool {
        use SubmissionState::*;

        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (_, Failed)
                | (Idle, Submitted)
                | (Submitted, Extracting)
                | (Extracting, Generating)
                | (Generating, ParseFailed)
                | (ParseFailed, Generating)
                | (Generating, Validated)
                | (Validated, Reviewing)
                | (Reviewing, Reviewed)
        )
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionTracker {
    id: Uuid,
    history: Vec<SubmissionState>,
}

impl SubmissionTracker {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            history: vec![SubmissionState::Idle],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SubmissionState {
        self.history
            .last()
            .copied()
            .unwrap_or(SubmissionState::Idle)
    }

    pub fn history(&self) -> &[SubmissionState] {
        &self.history
    }

    pub fn advance(&mut self, next: SubmissionState) -> Result<()> {
        let current = self.state();
        if !current.can_transition_to(next) {
            return Err(Error::Internal(format!(
                "illegal submission transition {} -> {}",
                current, next
            )));
        }
        tracing::debug!(submission_id = %self.id, from = %current, to = %next, "submission state changed");
        self.history.push(next);
        Ok(())
    }

    /// Moves to `Failed` unless the submission already finished.
    pub fn fail(&mut self) {
        if !self.state().is_terminal() {
            let _ = self.advance(SubmissionState::Failed);
        }
    }
}
