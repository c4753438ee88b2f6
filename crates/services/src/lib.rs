#![forbid(unsafe_code)]

pub mod analytics;
pub mod api;
pub mod app_services;
pub mod error;
pub mod interview;

pub use interview_core::Clock;

pub use analytics::{AnalyticsConfig, AnalyticsEvent, AnalyticsService};
pub use api::{
    ApiConfig, HistoryEntry, HistoryPage, HttpInterviewApi, InterviewApi, StartedInterview,
    StaticTokenProvider, TokenProvider,
};
pub use app_services::AppServices;
pub use error::{
    ApiError, AppServicesError, CompletionError, FeedbackError, SaveError, SessionError,
    SetupError,
};
pub use interview::{
    CancelToken, CloseHandle, CompletionCoordinator, EndOutcome, FEEDBACK_TIMEOUT,
    FeedbackFetcher, FetchedFeedback, InterviewService, PreparedInterview, ProfileSaveGuard,
    SaveOutcome, SessionContext, SessionController, TICK_PERIOD, Ticker,
};
