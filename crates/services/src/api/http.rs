use std::env;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use interview_core::model::{AnswerSnapshot, FeedbackReport, InterviewSetup, SessionId};

use super::{HistoryPage, InterviewApi, StartedInterview, TokenProvider};
use crate::error::ApiError;

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
    /// Applied to every call except feedback, which the fetcher bounds itself.
    pub request_timeout: Duration,
}

impl ApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Read `INTERVIEW_API_URL`, falling back to a local backend.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url = env::var("INTERVIEW_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        Self::new(base_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }
}

/// `reqwest`-backed client for the interview endpoints.
#[derive(Clone)]
pub struct HttpInterviewApi {
    client: Client,
    config: ApiConfig,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpInterviewApi {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be initialised.
    pub fn new(config: ApiConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().build()?,
            config,
            tokens,
        })
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let token = self
            .tokens
            .current_token()
            .ok_or(ApiError::Unauthenticated)?;
        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(ApiError::HttpStatus {
                status,
                message: server_message(&body),
            });
        }
        Ok(body.to_vec())
    }

    async fn conduct(&self, body: &ConductRequest<'_>) -> Result<Vec<u8>, ApiError> {
        debug!(session_id = %body.session_id, action = ?body.action, "conduct call");
        let request = self
            .client
            .post(self.config.url("/interview/conduct"))
            .timeout(self.config.request_timeout)
            .json(body);
        self.execute(request).await
    }
}

#[async_trait]
impl InterviewApi for HttpInterviewApi {
    async fn setup(&self, setup: &InterviewSetup) -> Result<SessionId, ApiError> {
        let request = self
            .client
            .post(self.config.url("/interview/setup"))
            .timeout(self.config.request_timeout)
            .json(setup);
        let body: SetupResponse = decode(&self.execute(request).await?)?;
        Ok(body.session_id)
    }

    async fn start(&self, session_id: &SessionId) -> Result<StartedInterview, ApiError> {
        let body = self
            .conduct(&ConductRequest::new(session_id, ConductAction::Start))
            .await?;
        decode(&body)
    }

    async fn submit_answers(
        &self,
        session_id: &SessionId,
        answers: &AnswerSnapshot,
    ) -> Result<(), ApiError> {
        let mut request = ConductRequest::new(session_id, ConductAction::SubmitAnswers);
        request.answers = Some(answers);
        self.conduct(&request).await.map(|_| ())
    }

    async fn complete(&self, session_id: &SessionId) -> Result<(), ApiError> {
        self.conduct(&ConductRequest::new(session_id, ConductAction::Complete))
            .await
            .map(|_| ())
    }

    async fn save_to_profile(&self, session_id: &SessionId) -> Result<(), ApiError> {
        self.conduct(&ConductRequest::new(session_id, ConductAction::SaveToProfile))
            .await
            .map(|_| ())
    }

    async fn feedback(&self, session_id: &SessionId) -> Result<FeedbackReport, ApiError> {
        let request = self
            .client
            .post(self.config.url("/interview/feedback"))
            .json(&FeedbackRequest { session_id });
        decode_feedback(&self.execute(request).await?)
    }

    async fn history(&self) -> Result<HistoryPage, ApiError> {
        let request = self
            .client
            .get(self.config.url("/interview/history"))
            .timeout(self.config.request_timeout);
        decode(&self.execute(request).await?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ConductAction {
    Start,
    SubmitAnswers,
    Complete,
    SaveToProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConductRequest<'a> {
    session_id: &'a SessionId,
    action: ConductAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    answers: Option<&'a AnswerSnapshot>,
}

impl<'a> ConductRequest<'a> {
    fn new(session_id: &'a SessionId, action: ConductAction) -> Self {
        Self {
            session_id,
            action,
            answers: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackRequest<'a> {
    session_id: &'a SessionId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetupResponse {
    session_id: SessionId,
}

#[derive(Debug, Deserialize)]
struct FeedbackResponse {
    feedback: FeedbackReport,
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::Malformed(err.to_string()))
}

fn decode_feedback(body: &[u8]) -> Result<FeedbackReport, ApiError> {
    let FeedbackResponse { feedback } = decode(body)?;
    feedback
        .validate()
        .map_err(|err| ApiError::Malformed(err.to_string()))?;
    Ok(feedback)
}

/// Pull `error` (or `message`) out of a JSON error body.
fn server_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|field| value.get(field).and_then(serde_json::Value::as_str))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::model::AnswerStore;

    #[test]
    fn conduct_body_uses_backend_action_names() {
        let id = SessionId::new("s-1");
        let mut store = AnswerStore::new();
        store.set_answer(2, "Because I like it");
        let snapshot = store.snapshot();

        let mut request = ConductRequest::new(&id, ConductAction::SubmitAnswers);
        request.answers = Some(&snapshot);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "sessionId": "s-1",
                "action": "submit-answers",
                "answers": {"2": "Because I like it"}
            })
        );

        let save = ConductRequest::new(&id, ConductAction::SaveToProfile);
        assert_eq!(
            serde_json::to_value(&save).unwrap(),
            serde_json::json!({"sessionId": "s-1", "action": "save-to-profile"})
        );
    }

    #[test]
    fn extracts_server_error_message() {
        assert_eq!(
            server_message(br#"{"error": "Session not found"}"#).as_deref(),
            Some("Session not found")
        );
        assert_eq!(
            server_message(br#"{"message": "Internal"}"#).as_deref(),
            Some("Internal")
        );
        assert_eq!(server_message(b"<html>bad gateway</html>"), None);
    }

    #[test]
    fn feedback_body_must_be_wrapped_and_in_range() {
        let ok = br#"{"feedback": {"overallScore": 7, "summary": "ok"}}"#;
        assert_eq!(decode_feedback(ok).unwrap().summary, "ok");

        let unwrapped = br#"{"overallScore": 7}"#;
        assert!(matches!(
            decode_feedback(unwrapped),
            Err(ApiError::Malformed(_))
        ));

        let out_of_range = br#"{"feedback": {"overallScore": 42}}"#;
        assert!(matches!(
            decode_feedback(out_of_range),
            Err(ApiError::Malformed(_))
        ));
    }

    #[test]
    fn start_response_tolerates_missing_duration() {
        let started: StartedInterview =
            decode(br#"{"questions": ["Q1", "Q2"]}"#).unwrap();
        assert_eq!(started.questions.len(), 2);
        assert_eq!(started.duration, None);
    }

    #[test]
    fn joins_urls_without_double_slash() {
        let config = ApiConfig::new("https://api.example.com/prod/");
        assert_eq!(
            config.url("/interview/setup"),
            "https://api.example.com/prod/interview/setup"
        );
    }
}
