use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::SessionId;

/// Lifecycle of an interview session. Moves forward only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Setup,
    Active,
    Completing,
    Completed,
    FeedbackPending,
    FeedbackReady,
    FeedbackError,
    Saved,
    Closed,
}

impl SessionStatus {
    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::{
            Active, Closed, Completed, Completing, FeedbackError, FeedbackPending, FeedbackReady,
            Saved, Setup,
        };
        matches!(
            (self, next),
            (Setup, Active)
                | (Active, Completing)
                | (Completing, Completed)
                | (Completed | FeedbackError, FeedbackPending)
                | (FeedbackPending, FeedbackReady | FeedbackError)
                | (FeedbackReady, Saved)
        ) || (next == Closed && self != Closed)
    }

    /// Sessions in these states are no longer held in memory.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Saved | SessionStatus::Closed)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "SETUP",
            Self::Active => "ACTIVE",
            Self::Completing => "COMPLETING",
            Self::Completed => "COMPLETED",
            Self::FeedbackPending => "FEEDBACK_PENDING",
            Self::FeedbackReady => "FEEDBACK_READY",
            Self::FeedbackError => "FEEDBACK_ERROR",
            Self::Saved => "SAVED",
            Self::Closed => "CLOSED",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("cannot move session from {from} to {to}")]
pub struct TransitionError {
    pub from: SessionStatus,
    pub to: SessionStatus,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSetupError {
    #[error("an interview needs at least one question")]
    NoQuestions,

    #[error("duration must be at least one minute")]
    InvalidDuration,

    #[error(transparent)]
    Transition(#[from] TransitionError),
}

/// The in-memory interview session.
///
/// Mutated only through its transition methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewSession {
    session_id: SessionId,
    questions: Vec<String>,
    duration_minutes: u32,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    status: SessionStatus,
}

impl InterviewSession {
    /// A session awaiting its questions.
    #[must_use]
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            questions: Vec::new(),
            duration_minutes: 0,
            started_at: None,
            completed_at: None,
            status: SessionStatus::Setup,
        }
    }

    /// Load questions and start the clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionSetupError::NoQuestions` / `InvalidDuration` for bad input, or
    /// `SessionSetupError::Transition` when the session is not in SETUP.
    pub fn begin(
        &mut self,
        questions: Vec<String>,
        duration_minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<(), SessionSetupError> {
        self.ensure(SessionStatus::Active)?;
        if questions.is_empty() {
            return Err(SessionSetupError::NoQuestions);
        }
        if duration_minutes == 0 {
            return Err(SessionSetupError::InvalidDuration);
        }
        self.questions = questions;
        self.duration_minutes = duration_minutes;
        self.started_at = Some(now);
        self.status = SessionStatus::Active;
        Ok(())
    }

    /// Move to `next`, recording the completion time when entering COMPLETED.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the move is not allowed from the current state.
    pub fn transition(
        &mut self,
        next: SessionStatus,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        if next == SessionStatus::Active {
            // only `begin` may activate a session
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        self.ensure(next)?;
        if next == SessionStatus::Completed {
            self.completed_at = Some(now);
        }
        self.status = next;
        Ok(())
    }

    fn ensure(&self, next: SessionStatus) -> Result<(), TransitionError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(TransitionError {
                from: self.status,
                to: next,
            })
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    #[must_use]
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }
}
