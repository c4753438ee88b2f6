//! Shared error types for the services crate.

use thiserror::Error;

use interview_core::model::{SessionSetupError, SessionStatus, SetupValidationError, TransitionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the interview REST client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("request failed with status {status}{}", suffix(.message))]
    HttpStatus {
        status: reqwest::StatusCode,
        message: Option<String>,
    },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    /// Message reported by the server, if the error carried one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::HttpStatus { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

fn suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Errors emitted while creating a session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SetupError {
    #[error(transparent)]
    Validation(#[from] SetupValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `CompletionCoordinator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompletionError {
    #[error("submitting answers failed: {0}")]
    SubmitAnswers(#[source] ApiError),
    #[error("marking the interview complete failed: {0}")]
    MarkComplete(#[source] ApiError),
}

/// Errors emitted by `FeedbackFetcher`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedbackError {
    #[error("feedback request timed out, try later")]
    Timeout,
    #[error("feedback request was cancelled")]
    Cancelled,
    #[error("failed to fetch feedback: {0}")]
    Fetch(#[source] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileSaveGuard`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SaveError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `SessionController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot {action} while session is {status}")]
    InvalidState {
        action: &'static str,
        status: SessionStatus,
    },
    #[error("answer at least one question before ending the interview")]
    PrematureEnd,
    #[error("question {index} is out of range ({count} questions)")]
    QuestionOutOfRange { index: usize, count: usize },
    #[error("session was closed")]
    Closed,
    #[error("failed to start interview: {0}")]
    Start(#[source] ApiError),
    #[error(transparent)]
    Setup(#[from] SessionSetupError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Completion(#[from] CompletionError),
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_includes_server_message() {
        let err = ApiError::HttpStatus {
            status: reqwest::StatusCode::NOT_FOUND,
            message: Some("Session not found".into()),
        };
        assert_eq!(
            err.to_string(),
            "request failed with status 404 Not Found: Session not found"
        );
        assert_eq!(err.server_message(), Some("Session not found"));
    }

    #[test]
    fn timeout_message_tells_user_to_retry_later() {
        assert_eq!(
            FeedbackError::Timeout.to_string(),
            "feedback request timed out, try later"
        );
    }
}
