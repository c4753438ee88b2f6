use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use interview_core::model::{
    AnswerSnapshot, AnswerStore, DEFAULT_JOB_ROLE, FeedbackReport, InterviewSession,
    SavedInterviewRecord, SessionId, SessionStatus,
};
use interview_core::{Clock, Countdown, Tick};

use super::cancel::CloseHandle;
use super::completion::CompletionCoordinator;
use super::feedback::FeedbackFetcher;
use super::save_guard::{ProfileSaveGuard, SaveOutcome};
use super::ticker::{TICK_PERIOD, Ticker};
use crate::error::SessionError;

/// Setup details carried into the saved record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub company_name: String,
    pub job_description: String,
    pub job_role: String,
}

impl SessionContext {
    #[must_use]
    pub fn new(company_name: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            job_description: job_description.into(),
            job_role: DEFAULT_JOB_ROLE.to_owned(),
        }
    }

    /// Use `job_role` when given and not blank.
    #[must_use]
    pub fn with_job_role(mut self, job_role: Option<&str>) -> Self {
        if let Some(role) = job_role.map(str::trim).filter(|role| !role.is_empty()) {
            self.job_role = role.to_owned();
        }
        self
    }
}

/// What an end request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOutcome {
    /// Answers were submitted and the session is COMPLETED.
    Completed,
    /// Completion was already under way or done; nothing happened.
    Ignored,
}

/// Owns one interview session and sequences answers, countdown, completion,
/// feedback and saving.
///
/// Every operation that awaits re-checks the close handle afterwards; once the
/// session is closed no further state change is applied.
pub struct SessionController {
    clock: Clock,
    session: InterviewSession,
    context: SessionContext,
    answers: AnswerStore,
    cursor: usize,
    countdown: Option<Countdown>,
    submitted: Option<AnswerSnapshot>,
    feedback: Option<FeedbackReport>,
    already_saved: bool,
    completion: CompletionCoordinator,
    fetcher: FeedbackFetcher,
    save_guard: ProfileSaveGuard,
    handle: CloseHandle,
    tick_period: Duration,
}

impl SessionController {
    #[must_use]
    pub fn new(
        session_id: SessionId,
        context: SessionContext,
        clock: Clock,
        completion: CompletionCoordinator,
        fetcher: FeedbackFetcher,
        save_guard: ProfileSaveGuard,
    ) -> Self {
        Self {
            clock,
            session: InterviewSession::new(session_id),
            context,
            answers: AnswerStore::new(),
            cursor: 0,
            countdown: None,
            submitted: None,
            feedback: None,
            already_saved: false,
            completion,
            fetcher,
            save_guard,
            handle: CloseHandle::new(),
            tick_period: TICK_PERIOD,
        }
    }

    #[must_use]
    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period;
        self
    }

    /// Load the questions, start the countdown and move to ACTIVE.
    ///
    /// The returned `Ticker` drives `on_tick`; it ends when the countdown stops.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Setup` for an empty question list, a zero duration,
    /// or a session that is not in SETUP, and `SessionError::Closed` after close.
    pub fn begin(
        &mut self,
        questions: Vec<String>,
        duration_minutes: u32,
    ) -> Result<Ticker, SessionError> {
        self.ensure_open()?;
        let now = self.clock.now();
        self.session.begin(questions, duration_minutes, now)?;
        self.countdown = Some(Countdown::start(duration_minutes, now));
        self.cursor = 0;
        info!(
            session_id = %self.session.session_id(),
            questions = self.session.question_count(),
            duration_minutes,
            "interview started"
        );
        Ok(Ticker::new(self.tick_period, self.handle.timer_token()))
    }

    /// Move the cursor to `index`, clamped to the question range.
    ///
    /// Does nothing unless the session is ACTIVE.
    pub fn select_question(&mut self, index: usize) {
        if self.session.status() != SessionStatus::Active {
            return;
        }
        let last = self.session.question_count().saturating_sub(1);
        self.cursor = index.min(last);
    }

    pub fn next_question(&mut self) {
        self.select_question(self.cursor.saturating_add(1));
    }

    pub fn previous_question(&mut self) {
        self.select_question(self.cursor.saturating_sub(1));
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&str> {
        self.session.question(self.cursor)
    }

    #[must_use]
    pub fn current_answer(&self) -> &str {
        self.answers.answer(self.cursor)
    }

    /// Overwrite the answer for `index`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` outside ACTIVE (answers are frozen
    /// once completion starts) and `SessionError::QuestionOutOfRange` for a bad index.
    pub fn set_answer(&mut self, index: usize, text: impl Into<String>) -> Result<(), SessionError> {
        self.require(SessionStatus::Active, "edit answers")?;
        let count = self.session.question_count();
        if index >= count {
            return Err(SessionError::QuestionOutOfRange { index, count });
        }
        self.answers.set_answer(index, text);
        Ok(())
    }

    /// # Errors
    ///
    /// See [`SessionController::set_answer`].
    pub fn set_current_answer(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.set_answer(self.cursor, text)
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> &str {
        self.answers.answer(index)
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }

    /// Seconds left on the countdown, or zero before `begin`.
    #[must_use]
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs_at(self.clock.now())
    }

    #[must_use]
    pub fn remaining_secs_at(&self, now: DateTime<Utc>) -> u64 {
        self.countdown
            .as_ref()
            .map_or(0, |countdown| countdown.remaining_at(now))
    }

    /// Manual end. Rejected with `PrematureEnd` while no question is answered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::PrematureEnd`, `SessionError::InvalidState` before
    /// `begin`, `SessionError::Closed` after close, or `SessionError::Completion` when the backend
    /// calls fail (the session then stays COMPLETING; see `retry_completion`).
    pub async fn request_end(&mut self) -> Result<EndOutcome, SessionError> {
        self.end(false).await
    }

    /// Forced end on countdown expiry; zero answers are allowed.
    ///
    /// # Errors
    ///
    /// Same as [`SessionController::request_end`] minus `PrematureEnd`.
    pub async fn on_expiry(&mut self) -> Result<EndOutcome, SessionError> {
        self.end(true).await
    }

    /// Replay completion with the answers frozen when the session left ACTIVE.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` unless the session is COMPLETING, or
    /// `SessionError::Completion` if the backend calls fail again.
    pub async fn retry_completion(&mut self) -> Result<EndOutcome, SessionError> {
        self.require(SessionStatus::Completing, "retry completion")?;
        self.run_completion().await
    }

    /// Re-evaluate the countdown at `now`; on expiry, finalize the session.
    ///
    /// Returns `None` once the countdown has stopped.
    ///
    /// # Errors
    ///
    /// Propagates the completion failure from `on_expiry`.
    pub async fn on_tick_at(&mut self, now: DateTime<Utc>) -> Result<Option<Tick>, SessionError> {
        if self.sync_closed() {
            return Ok(None);
        }
        let Some(tick) = self.countdown.as_mut().and_then(|countdown| countdown.tick(now)) else {
            return Ok(None);
        };
        if tick.expired {
            self.handle.stop_timer();
            info!(session_id = %self.session.session_id(), "countdown expired");
            self.on_expiry().await?;
        }
        Ok(Some(tick))
    }

    /// [`SessionController::on_tick_at`] using the controller's clock.
    ///
    /// # Errors
    ///
    /// Propagates the completion failure from `on_expiry`.
    pub async fn on_tick(&mut self) -> Result<Option<Tick>, SessionError> {
        let now = self.clock.now();
        self.on_tick_at(now).await
    }

    /// Fetch the feedback report. Allowed from COMPLETED and, as a manual
    /// retry, from FEEDBACK_ERROR. A session left in FEEDBACK_PENDING by a
    /// dropped fetch is fetched again.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Feedback` (the session moves to FEEDBACK_ERROR),
    /// `SessionError::InvalidState`, or `SessionError::Closed`.
    pub async fn fetch_feedback(&mut self) -> Result<&FeedbackReport, SessionError> {
        self.ensure_open()?;
        let status = self.session.status();
        match status {
            SessionStatus::Completed | SessionStatus::FeedbackError => {
                self.session
                    .transition(SessionStatus::FeedbackPending, self.clock.now())?;
            }
            // a previous fetch future was dropped before it resolved
            SessionStatus::FeedbackPending => {
                debug!(session_id = %self.session.session_id(), "resuming abandoned feedback fetch");
            }
            _ => {
                return Err(SessionError::InvalidState {
                    action: "fetch feedback",
                    status,
                });
            }
        }

        let session_id = self.session.session_id().clone();
        let token = self.handle.token().clone();
        let result = self.fetcher.fetch(&session_id, &token).await;
        self.ensure_open()?;

        match result {
            Ok(fetched) => {
                self.session
                    .transition(SessionStatus::FeedbackReady, self.clock.now())?;
                self.already_saved = fetched.already_saved;
                debug!(session_id = %session_id, already_saved = fetched.already_saved, "feedback ready");
                let report: &FeedbackReport = self.feedback.insert(fetched.report);
                Ok(report)
            }
            Err(err) => {
                self.session
                    .transition(SessionStatus::FeedbackError, self.clock.now())?;
                Err(err.into())
            }
        }
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&FeedbackReport> {
        self.feedback.as_ref()
    }

    /// Whether the saved store already holds this session.
    #[must_use]
    pub fn already_saved(&self) -> bool {
        self.already_saved
    }

    /// Save the session and its feedback. Repeated calls report `AlreadySaved`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidState` before feedback is ready,
    /// `SessionError::Save` if the local write fails, or `SessionError::Closed`.
    pub async fn save(&mut self) -> Result<SaveOutcome, SessionError> {
        self.ensure_open()?;
        if self.session.status() == SessionStatus::Saved {
            return Ok(SaveOutcome::AlreadySaved);
        }
        self.require(SessionStatus::FeedbackReady, "save")?;
        let record = self.record()?;

        let result = self.save_guard.save(record).await;
        self.ensure_open()?;
        let outcome = result?;

        self.session
            .transition(SessionStatus::Saved, self.clock.now())?;
        self.already_saved = true;
        self.handle.stop_timer();
        Ok(outcome)
    }

    /// Abandon the session. Stops the ticker and cancels in-flight feedback.
    pub fn close(&mut self) {
        self.handle.close();
        self.sync_closed();
    }

    #[must_use]
    pub fn close_handle(&self) -> CloseHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.session.status()
    }

    #[must_use]
    pub fn session_id(&self) -> &SessionId {
        self.session.session_id()
    }

    #[must_use]
    pub fn session(&self) -> &InterviewSession {
        &self.session
    }

    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Answers frozen when completion started.
    #[must_use]
    pub fn submitted_answers(&self) -> Option<&AnswerSnapshot> {
        self.submitted.as_ref()
    }

    async fn end(&mut self, forced: bool) -> Result<EndOutcome, SessionError> {
        self.ensure_open()?;
        let status = self.session.status();
        match status {
            SessionStatus::Active => {}
            SessionStatus::Setup => {
                return Err(SessionError::InvalidState {
                    action: "end the interview",
                    status,
                });
            }
            _ => {
                debug!(session_id = %self.session.session_id(), %status, "end ignored");
                return Ok(EndOutcome::Ignored);
            }
        }
        if !forced && self.answers.answered_count() == 0 {
            return Err(SessionError::PrematureEnd);
        }

        if let Some(countdown) = self.countdown.as_mut() {
            countdown.stop();
        }
        self.handle.stop_timer();
        self.session
            .transition(SessionStatus::Completing, self.clock.now())?;
        self.submitted = Some(self.answers.snapshot());
        self.run_completion().await
    }

    async fn run_completion(&mut self) -> Result<EndOutcome, SessionError> {
        let session_id = self.session.session_id().clone();
        let snapshot = self.submitted.clone().unwrap_or_default();
        let result = self.completion.complete(&session_id, &snapshot).await;
        self.ensure_open()?;
        if let Err(err) = result {
            warn!(session_id = %session_id, error = %err, "completion failed; session stays COMPLETING");
            return Err(err.into());
        }
        self.session
            .transition(SessionStatus::Completed, self.clock.now())?;
        Ok(EndOutcome::Completed)
    }

    fn record(&self) -> Result<SavedInterviewRecord, SessionError> {
        let feedback = self.feedback.clone().ok_or(SessionError::InvalidState {
            action: "save",
            status: self.session.status(),
        })?;
        Ok(SavedInterviewRecord {
            session_id: self.session.session_id().clone(),
            questions: self.session.questions().to_vec(),
            answers: self
                .submitted
                .clone()
                .unwrap_or_else(|| self.answers.snapshot()),
            feedback,
            completed_at: self
                .session
                .completed_at()
                .unwrap_or_else(|| self.clock.now()),
            duration: self.session.duration_minutes(),
            company_name: self.context.company_name.clone(),
            job_description: self.context.job_description.clone(),
            job_role: self.context.job_role.clone(),
            saved_to_profile: true,
        })
    }

    fn require(&self, expected: SessionStatus, action: &'static str) -> Result<(), SessionError> {
        let status = self.session.status();
        if status == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState { action, status })
        }
    }

    fn ensure_open(&mut self) -> Result<(), SessionError> {
        if self.sync_closed() {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    /// Apply a close requested through the handle. Returns `true` if closed.
    fn sync_closed(&mut self) -> bool {
        if !self.handle.is_closed() {
            return false;
        }
        if self.session.status() != SessionStatus::Closed {
            if let Some(countdown) = self.countdown.as_mut() {
                countdown.stop();
            }
            // CLOSED is reachable from every other state
            let _ = self
                .session
                .transition(SessionStatus::Closed, self.clock.now());
            info!(session_id = %self.session.session_id(), "interview closed");
        }
        true
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.handle.stop_timer();
    }
}
