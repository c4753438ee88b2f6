//! Timed interview session engine.

mod cancel;
mod completion;
mod controller;
mod feedback;
mod save_guard;
mod ticker;
mod workflow;

pub use cancel::{CancelToken, CloseHandle};
pub use completion::CompletionCoordinator;
pub use controller::{EndOutcome, SessionContext, SessionController};
pub use feedback::{FEEDBACK_TIMEOUT, FeedbackFetcher, FetchedFeedback};
pub use save_guard::{ProfileSaveGuard, SaveOutcome};
pub use ticker::{TICK_PERIOD, Ticker};
pub use workflow::{InterviewService, PreparedInterview};
