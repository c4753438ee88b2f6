use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use interview_core::Clock;
use interview_core::model::{
    DEFAULT_DURATION_MINUTES, InterviewSetupDraft, SavedInterviewRecord, SessionId,
};
use storage::{SavedInterviews, StorageError};

use super::completion::CompletionCoordinator;
use super::controller::{SessionContext, SessionController};
use super::feedback::{FEEDBACK_TIMEOUT, FeedbackFetcher};
use super::save_guard::ProfileSaveGuard;
use super::ticker::{TICK_PERIOD, Ticker};
use crate::api::{HistoryPage, InterviewApi};
use crate::error::{ApiError, SessionError, SetupError};

/// A session created on the backend but not yet started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedInterview {
    pub session_id: SessionId,
    pub context: SessionContext,
    pub duration_minutes: u32,
}

/// Entry point for running interviews: setup, open, history, saved records.
#[derive(Clone)]
pub struct InterviewService {
    clock: Clock,
    api: Arc<dyn InterviewApi>,
    saved: SavedInterviews,
    feedback_timeout: Duration,
    tick_period: Duration,
}

impl InterviewService {
    #[must_use]
    pub fn new(clock: Clock, api: Arc<dyn InterviewApi>, saved: SavedInterviews) -> Self {
        Self {
            clock,
            api,
            saved,
            feedback_timeout: FEEDBACK_TIMEOUT,
            tick_period: TICK_PERIOD,
        }
    }

    #[must_use]
    pub fn with_feedback_timeout(mut self, timeout: Duration) -> Self {
        self.feedback_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Validate `draft` locally, then create the session on the backend.
    ///
    /// # Errors
    ///
    /// Returns `SetupError::Validation` without any network call for a bad
    /// draft, or `SetupError::Api` if the backend call fails.
    pub async fn setup(&self, draft: InterviewSetupDraft) -> Result<PreparedInterview, SetupError> {
        let setup = draft.validate()?;
        let session_id = self.api.setup(&setup).await?;
        info!(
            session_id = %session_id,
            interview_type = %setup.interview_type(),
            difficulty = %setup.difficulty(),
            "interview session created"
        );
        Ok(PreparedInterview {
            context: SessionContext::new(setup.company_name(), setup.job_description())
                .with_job_role(setup.job_title()),
            duration_minutes: setup.duration_minutes(),
            session_id,
        })
    }

    /// A controller in SETUP for an existing session id.
    #[must_use]
    pub fn controller(&self, session_id: SessionId, context: SessionContext) -> SessionController {
        SessionController::new(
            session_id,
            context,
            self.clock,
            CompletionCoordinator::new(Arc::clone(&self.api)),
            FeedbackFetcher::new(Arc::clone(&self.api), self.saved.clone())
                .with_timeout(self.feedback_timeout),
            ProfileSaveGuard::new(Arc::clone(&self.api), self.saved.clone()),
        )
        .with_tick_period(self.tick_period)
    }

    /// Start `prepared`, using `preloaded` questions when given and non-empty
    /// and otherwise fetching them with the "start" action.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Start` if the start call fails, or
    /// `SessionError::Setup` if the backend returned no questions.
    pub async fn open(
        &self,
        prepared: &PreparedInterview,
        preloaded: Option<Vec<String>>,
    ) -> Result<(SessionController, Ticker), SessionError> {
        let mut controller =
            self.controller(prepared.session_id.clone(), prepared.context.clone());
        let (questions, duration) = match preloaded.filter(|questions| !questions.is_empty()) {
            Some(questions) => (questions, prepared.duration_minutes),
            None => {
                let started = self
                    .api
                    .start(&prepared.session_id)
                    .await
                    .map_err(SessionError::Start)?;
                (
                    started.questions,
                    started.duration.unwrap_or(DEFAULT_DURATION_MINUTES),
                )
            }
        };
        let ticker = controller.begin(questions, duration)?;
        Ok((controller, ticker))
    }

    /// # Errors
    ///
    /// Returns `ApiError` if the history call fails.
    pub async fn history(&self) -> Result<HistoryPage, ApiError> {
        self.api.history().await
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the saved store cannot be read.
    pub async fn saved_interviews(&self) -> Result<Vec<SavedInterviewRecord>, StorageError> {
        self.saved.list().await
    }

    /// Remove a saved record. Returns `false` if none matched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the saved store cannot be updated.
    pub async fn delete_saved(&self, session_id: &SessionId) -> Result<bool, StorageError> {
        let removed = self.saved.remove(session_id).await?;
        if removed {
            info!(session_id = %session_id, "saved interview deleted");
        }
        Ok(removed)
    }
}
