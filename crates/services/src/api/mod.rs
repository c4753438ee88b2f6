//! REST surface of the interview backend.

mod auth;
mod http;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use interview_core::model::{AnswerSnapshot, FeedbackReport, InterviewSetup, SessionId};

use crate::error::ApiError;

pub use auth::{StaticTokenProvider, TokenProvider};
pub use http::{ApiConfig, HttpInterviewApi};

/// Questions and duration returned when a session is started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartedInterview {
    #[serde(default)]
    pub questions: Vec<String>,
    /// Minutes; the backend may omit it.
    #[serde(default)]
    pub duration: Option<u32>,
}

/// One row of the remote interview history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub session_id: SessionId,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub interview_type: String,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub status: String,
    /// Epoch seconds.
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub completed_at: Option<i64>,
    #[serde(default)]
    pub overall_score: Option<f64>,
}

impl HistoryEntry {
    #[must_use]
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.created_at, 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub count: usize,
}

/// Calls the interview backend exposes to the session engine.
#[async_trait]
pub trait InterviewApi: Send + Sync {
    /// `POST /interview/setup`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on auth, transport, status, or decoding failures.
    async fn setup(&self, setup: &InterviewSetup) -> Result<SessionId, ApiError>;

    /// `POST /interview/conduct` with `action: "start"`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on auth, transport, status, or decoding failures.
    async fn start(&self, session_id: &SessionId) -> Result<StartedInterview, ApiError>;

    /// `POST /interview/conduct` with `action: "submit-answers"`.
    ///
    /// Idempotent server-side for an identical payload.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on auth, transport, or status failures.
    async fn submit_answers(
        &self,
        session_id: &SessionId,
        answers: &AnswerSnapshot,
    ) -> Result<(), ApiError>;

    /// `POST /interview/conduct` with `action: "complete"`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on auth, transport, or status failures.
    async fn complete(&self, session_id: &SessionId) -> Result<(), ApiError>;

    /// `POST /interview/conduct` with `action: "save-to-profile"`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on auth, transport, or status failures.
    async fn save_to_profile(&self, session_id: &SessionId) -> Result<(), ApiError>;

    /// `POST /interview/feedback`. Callers bound the wait themselves.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on auth, transport, status, or decoding failures.
    async fn feedback(&self, session_id: &SessionId) -> Result<FeedbackReport, ApiError>;

    /// `GET /interview/history`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on auth, transport, status, or decoding failures.
    async fn history(&self) -> Result<HistoryPage, ApiError>;
}
