mod answers;
mod feedback;
mod ids;
mod record;
mod session;
mod setup;

pub use answers::{AnswerSnapshot, AnswerStore};
pub use feedback::{
    CommunicationSkills, FeedbackReport, FeedbackValidationError, QuestionFeedback, ScoredNote,
};
pub use ids::SessionId;
pub use record::{DEFAULT_JOB_ROLE, SavedInterviewRecord, append_unique, contains_session};
pub use session::{InterviewSession, SessionSetupError, SessionStatus, TransitionError};
pub use setup::{
    DEFAULT_DURATION_MINUTES, Difficulty, InterviewSetup, InterviewSetupDraft, InterviewType,
    SetupValidationError,
};
