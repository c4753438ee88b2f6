use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AnswerSnapshot, FeedbackReport, SessionId};

pub const DEFAULT_JOB_ROLE: &str = "Interview Practice";

/// Durable projection of a completed interview and its feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedInterviewRecord {
    pub session_id: SessionId,
    pub questions: Vec<String>,
    pub answers: AnswerSnapshot,
    pub feedback: FeedbackReport,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub completed_at: DateTime<Utc>,
    /// Session length in minutes.
    pub duration: u32,
    pub company_name: String,
    pub job_description: String,
    pub job_role: String,
    pub saved_to_profile: bool,
}

/// True if a record for `session_id` is already present.
#[must_use]
pub fn contains_session(records: &[SavedInterviewRecord], session_id: &SessionId) -> bool {
    records.iter().any(|record| &record.session_id == session_id)
}

/// Append `record` unless one with the same session id exists.
///
/// Returns `true` when the record was appended. Existing entries are never touched.
pub fn append_unique(records: &mut Vec<SavedInterviewRecord>, record: SavedInterviewRecord) -> bool {
    if contains_session(records, &record.session_id) {
        return false;
    }
    records.push(record);
    true
}
