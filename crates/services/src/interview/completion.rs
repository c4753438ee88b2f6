use std::sync::Arc;

use tracing::{debug, info};

use interview_core::model::{AnswerSnapshot, SessionId};

use crate::api::InterviewApi;
use crate::error::CompletionError;

/// Finalizes a session on the backend: submit answers, then mark complete.
///
/// Both calls are idempotent server-side, so a failed attempt can be replayed
/// with the same snapshot.
#[derive(Clone)]
pub struct CompletionCoordinator {
    api: Arc<dyn InterviewApi>,
}

impl CompletionCoordinator {
    #[must_use]
    pub fn new(api: Arc<dyn InterviewApi>) -> Self {
        Self { api }
    }

    /// # Errors
    ///
    /// Returns `CompletionError::SubmitAnswers` if the answers were rejected (the
    /// complete call is then never made), or `CompletionError::MarkComplete`.
    pub async fn complete(
        &self,
        session_id: &SessionId,
        answers: &AnswerSnapshot,
    ) -> Result<(), CompletionError> {
        debug!(session_id = %session_id, answered = answers.len(), "submitting answers");
        self.api
            .submit_answers(session_id, answers)
            .await
            .map_err(CompletionError::SubmitAnswers)?;
        self.api
            .complete(session_id)
            .await
            .map_err(CompletionError::MarkComplete)?;
        info!(session_id = %session_id, "interview completed");
        Ok(())
    }
}
