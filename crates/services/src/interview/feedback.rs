use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use interview_core::model::{FeedbackReport, SessionId};
use storage::SavedInterviews;

use super::cancel::CancelToken;
use crate::api::InterviewApi;
use crate::error::FeedbackError;

/// Upper bound on a single feedback request.
pub const FEEDBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// A fetched report plus whether the session is already in the saved store.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedFeedback {
    pub report: FeedbackReport,
    pub already_saved: bool,
}

/// Requests the feedback report under a timeout and a cancellation token.
///
/// Never retries on its own; a retry is another call to `fetch`.
#[derive(Clone)]
pub struct FeedbackFetcher {
    api: Arc<dyn InterviewApi>,
    saved: SavedInterviews,
    timeout: Duration,
}

impl FeedbackFetcher {
    #[must_use]
    pub fn new(api: Arc<dyn InterviewApi>, saved: SavedInterviews) -> Self {
        Self {
            api,
            saved,
            timeout: FEEDBACK_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// # Errors
    ///
    /// - `FeedbackError::Cancelled` if `cancel` fires first.
    /// - `FeedbackError::Timeout` if no response arrives within the timeout.
    /// - `FeedbackError::Fetch` for any failed or malformed response.
    /// - `FeedbackError::Storage` if the saved store cannot be checked.
    pub async fn fetch(
        &self,
        session_id: &SessionId,
        cancel: &CancelToken,
    ) -> Result<FetchedFeedback, FeedbackError> {
        debug!(session_id = %session_id, timeout_secs = self.timeout.as_secs(), "requesting feedback");
        let request = tokio::time::timeout(self.timeout, self.api.feedback(session_id));
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(FeedbackError::Cancelled),
            result = request => match result {
                Ok(Ok(report)) => Ok(report),
                Ok(Err(err)) => Err(FeedbackError::Fetch(err)),
                Err(_elapsed) => Err(FeedbackError::Timeout),
            },
        };
        let report = match outcome {
            Ok(report) => report,
            Err(err) => {
                warn!(session_id = %session_id, error = %err, "feedback fetch failed");
                return Err(err);
            }
        };

        let already_saved = self.saved.contains(session_id).await?;
        Ok(FetchedFeedback {
            report,
            already_saved,
        })
    }
}
