use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::analytics::{AnalyticsConfig, AnalyticsService};
use crate::api::{ApiConfig, HttpInterviewApi, InterviewApi, TokenProvider};
use crate::error::AppServicesError;
use crate::interview::InterviewService;

/// Assembles the app-facing services around one storage backend.
#[derive(Clone)]
pub struct AppServices {
    interviews: Arc<InterviewService>,
    analytics: Arc<AnalyticsService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP backend.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or HTTP client setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        api: ApiConfig,
        tokens: Arc<dyn TokenProvider>,
        analytics: AnalyticsConfig,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let api: Arc<dyn InterviewApi> = Arc::new(HttpInterviewApi::new(api, tokens)?);
        Self::with_storage(&storage, clock, api, analytics)
    }

    /// Build services over an arbitrary backend and storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Http` if the analytics client cannot be initialised.
    pub fn with_storage(
        storage: &Storage,
        clock: Clock,
        api: Arc<dyn InterviewApi>,
        analytics: AnalyticsConfig,
    ) -> Result<Self, AppServicesError> {
        let interviews = Arc::new(InterviewService::new(
            clock,
            api,
            storage.saved_interviews(),
        ));
        let analytics = Arc::new(AnalyticsService::new(analytics, clock)?);
        Ok(Self {
            interviews,
            analytics,
        })
    }

    #[must_use]
    pub fn interviews(&self) -> Arc<InterviewService> {
        Arc::clone(&self.interviews)
    }

    #[must_use]
    pub fn analytics(&self) -> Arc<AnalyticsService> {
        Arc::clone(&self.analytics)
    }
}
