use std::sync::Arc;

use tracing::{info, warn};

use interview_core::model::SavedInterviewRecord;
use storage::SavedInterviews;

use crate::api::InterviewApi;
use crate::error::SaveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    /// A record for the session already existed; nothing was written.
    AlreadySaved,
}

/// Writes a finished interview to the saved store at most once per session id.
#[derive(Clone)]
pub struct ProfileSaveGuard {
    api: Arc<dyn InterviewApi>,
    saved: SavedInterviews,
}

impl ProfileSaveGuard {
    #[must_use]
    pub fn new(api: Arc<dyn InterviewApi>, saved: SavedInterviews) -> Self {
        Self { api, saved }
    }

    /// Persist `record` unless its session is already saved.
    ///
    /// The remote "save-to-profile" notification is best-effort: its failure
    /// is logged and the local write still happens.
    ///
    /// # Errors
    ///
    /// Returns `SaveError::Storage` if the saved collection cannot be read or written.
    pub async fn save(&self, record: SavedInterviewRecord) -> Result<SaveOutcome, SaveError> {
        let session_id = record.session_id.clone();
        if self.saved.contains(&session_id).await? {
            info!(session_id = %session_id, "interview already saved");
            return Ok(SaveOutcome::AlreadySaved);
        }

        if let Err(err) = self.api.save_to_profile(&session_id).await {
            warn!(session_id = %session_id, error = %err, "save-to-profile notification failed");
        }

        if self.saved.insert_unique(record).await? {
            info!(session_id = %session_id, "interview saved");
            Ok(SaveOutcome::Saved)
        } else {
            Ok(SaveOutcome::AlreadySaved)
        }
    }
}
