//! Best-effort click analytics, constructed once and passed by reference.

use std::env;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::Clock;

const DEFAULT_ANALYTICS_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct AnalyticsConfig {
    pub enabled: bool,
    pub endpoint: Option<String>,
    /// Upper bound on one event post; a silent endpoint never stalls the caller longer.
    pub request_timeout: Duration,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: None,
            request_timeout: DEFAULT_ANALYTICS_TIMEOUT,
        }
    }
}

impl AnalyticsConfig {
    /// `INTERVIEW_ANALYTICS_ENABLED` (anything but `false` enables) and
    /// `INTERVIEW_ANALYTICS_URL` (absent disables).
    #[must_use]
    pub fn from_env() -> Self {
        let enabled = env::var("INTERVIEW_ANALYTICS_ENABLED")
            .map(|value| !value.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        let endpoint = env::var("INTERVIEW_ANALYTICS_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());
        Self {
            enabled,
            endpoint,
            request_timeout: DEFAULT_ANALYTICS_TIMEOUT,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.endpoint.is_some()
    }
}

/// Payload posted for one tracked event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub session_id: String,
    pub user_id: Option<String>,
    pub button_clicked: String,
    pub metadata: serde_json::Value,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

pub struct AnalyticsService {
    client: Client,
    config: AnalyticsConfig,
    clock: Clock,
    session_id: String,
    user_id: Mutex<Option<String>>,
}

impl AnalyticsService {
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be initialised.
    pub fn new(config: AnalyticsConfig, clock: Clock) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(config.request_timeout).build()?,
            config,
            clock,
            session_id: Uuid::new_v4().to_string(),
            user_id: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_active()
    }

    /// Per-process analytics session id.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn set_user_id(&self, user_id: Option<String>) {
        *self.user_id.lock().unwrap_or_else(PoisonError::into_inner) = user_id;
    }

    #[must_use]
    pub fn event(&self, button: &str, metadata: serde_json::Value) -> AnalyticsEvent {
        AnalyticsEvent {
            session_id: self.session_id.clone(),
            user_id: self
                .user_id
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
            button_clicked: button.to_owned(),
            metadata,
            timestamp: self.clock.now().timestamp_millis(),
        }
    }

    /// Post an event. Failures are logged and dropped; nothing is queued.
    pub async fn track(&self, button: &str, metadata: serde_json::Value) {
        let Some(endpoint) = self.config.endpoint.as_deref().filter(|_| self.config.enabled)
        else {
            return;
        };
        let event = self.event(button, metadata);
        match self.client.post(endpoint).json(&event).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(button, "analytics event sent");
            }
            Ok(response) => {
                warn!(button, status = %response.status(), "analytics event rejected");
            }
            Err(err) => {
                warn!(button, error = %err, "analytics event failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_core::time::{fixed_clock, fixed_now};

    #[test]
    fn event_carries_session_and_user() {
        let service = AnalyticsService::new(AnalyticsConfig::default(), fixed_clock()).unwrap();
        service.set_user_id(Some("user-7".into()));

        let event = service.event("end-interview", serde_json::json!({"answered": 3}));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["sessionId"], service.session_id());
        assert_eq!(json["userId"], "user-7");
        assert_eq!(json["buttonClicked"], "end-interview");
        assert_eq!(json["metadata"]["answered"], 3);
        assert_eq!(json["timestamp"], fixed_now().timestamp_millis());
    }

    #[test]
    fn each_service_gets_its_own_session_id() {
        let a = AnalyticsService::new(AnalyticsConfig::default(), fixed_clock()).unwrap();
        let b = AnalyticsService::new(AnalyticsConfig::default(), fixed_clock()).unwrap();
        assert_ne!(a.session_id(), b.session_id());
        assert!(Uuid::parse_str(a.session_id()).is_ok());
    }

    #[test]
    fn needs_both_flag_and_endpoint() {
        let mut config = AnalyticsConfig {
            enabled: true,
            ..AnalyticsConfig::default()
        };
        assert!(!config.is_active());
        config.endpoint = Some("http://localhost:9000/track".into());
        assert!(config.is_active());
        config.enabled = false;
        assert!(!config.is_active());
    }

    #[tokio::test]
    async fn disabled_track_is_a_no_op() {
        let service = AnalyticsService::new(AnalyticsConfig::default(), fixed_clock()).unwrap();
        assert!(!service.enabled());
        service.track("start", serde_json::Value::Null).await;
    }

    #[tokio::test]
    async fn silent_endpoint_does_not_stall_track() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // accept and hold connections without ever answering
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = AnalyticsConfig {
            enabled: true,
            endpoint: Some(format!("http://{addr}/track")),
            request_timeout: Duration::from_millis(200),
        };
        let service = AnalyticsService::new(config, fixed_clock()).unwrap();

        let finished = tokio::time::timeout(
            Duration::from_secs(5),
            service.track("start-interview", serde_json::Value::Null),
        )
        .await;
        assert!(finished.is_ok());
        server.abort();
    }
}
