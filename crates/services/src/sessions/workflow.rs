use rand::{Rng, rng};
use tracing::{info, warn};

use quiz_core::model::{QuestionBank, TypeCounts};

use super::plan::{SessionBuilder, SessionPlan};
use super::progress::ExamResult;
use super::service::{QuizSession, SessionMode, SessionState, SubmitOutcome};
use crate::Clock;
use crate::error::SessionError;
use crate::mastery_service::{MasteryTracker, TrackerOutcome};
use crate::preferences_service::PreferencesService;

/// Result of answering a single question in a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionAnswer {
    pub outcome: SubmitOutcome,
    /// Present only for practice answers, which feed the mastery tracker.
    pub mastery: Option<TrackerOutcome>,
}

/// Orchestrates session start, answering and completion.
///
/// Sessions and the tracker are passed in explicitly; this service only carries the clock
/// and the preference store.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    preferences: PreferencesService,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(clock: Clock, preferences: PreferencesService) -> Self {
        Self { clock, preferences }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Practice over the whole bank, in bank order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if the bank has no questions.
    pub fn start_practice(&self, bank: &QuestionBank) -> Result<QuizSession, SessionError> {
        let plan = SessionBuilder::new(bank).practice();
        self.start(SessionMode::Practice, plan)
    }

    /// Exam sampled from `bank`; the requested counts are remembered for next time.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if nothing could be sampled.
    pub fn start_exam(
        &self,
        bank: &QuestionBank,
        requested: &TypeCounts,
    ) -> Result<QuizSession, SessionError> {
        self.start_exam_with_rng(bank, requested, &mut rng())
    }

    /// # Errors
    ///
    /// Returns `SessionError::Empty` if nothing could be sampled.
    pub fn start_exam_with_rng<R: Rng + ?Sized>(
        &self,
        bank: &QuestionBank,
        requested: &TypeCounts,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        // Saved before sampling: a request that samples nothing is still remembered.
        self.preferences.save_exam_counts(requested);
        let plan = SessionBuilder::new(bank).exam_with_rng(requested, rng);
        if plan.was_clamped() {
            warn!(
                requested = requested.total(),
                selected = plan.selected.total(),
                "exam counts clamped to available questions"
            );
        }
        self.start(SessionMode::Exam, plan)
    }

    /// Review the tracker's current mistakes, optionally applying a new threshold first.
    ///
    /// # Errors
    ///
    /// - `SessionError::Tracker` if `threshold` is zero.
    /// - `SessionError::Empty` if the tracker holds no mistakes.
    pub fn start_review(
        &self,
        tracker: &mut MasteryTracker,
        threshold: Option<u32>,
    ) -> Result<QuizSession, SessionError> {
        self.start_review_with_rng(tracker, threshold, &mut rng())
    }

    /// # Errors
    ///
    /// - `SessionError::Tracker` if `threshold` is zero.
    /// - `SessionError::Empty` if the tracker holds no mistakes.
    pub fn start_review_with_rng<R: Rng + ?Sized>(
        &self,
        tracker: &mut MasteryTracker,
        threshold: Option<u32>,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        if tracker.is_empty() {
            return Err(SessionError::Empty);
        }
        if let Some(threshold) = threshold {
            tracker.set_threshold(threshold)?;
        }
        let questions = tracker.snapshot_for_review_with_rng(rng);
        let counts = TypeCounts::from_questions(&questions);
        self.start(
            SessionMode::Review,
            SessionPlan {
                questions,
                requested: counts,
                selected: counts,
            },
        )
    }

    /// Grade the current question; practice outcomes are forwarded to `tracker`.
    ///
    /// # Errors
    ///
    /// Propagates `QuizSession::submit` errors; nothing is forwarded then.
    pub fn submit(
        &self,
        session: &mut QuizSession,
        tracker: &mut MasteryTracker,
        response: &str,
    ) -> Result<SessionAnswer, SessionError> {
        let outcome = session.submit(response)?;
        let mastery = match session.mode() {
            SessionMode::Practice => {
                let question = &session.questions()[outcome.index];
                Some(tracker.record_outcome(question, outcome.is_correct))
            }
            SessionMode::Exam | SessionMode::Review => None,
        };
        Ok(SessionAnswer { outcome, mastery })
    }

    /// # Errors
    ///
    /// Propagates `QuizSession::advance` errors.
    pub fn advance(&self, session: &mut QuizSession) -> Result<SessionState, SessionError> {
        let state = session.advance(self.clock.now())?;
        if state == SessionState::Complete {
            let progress = session.progress();
            info!(
                mode = %session.mode(),
                total = progress.total,
                correct = progress.correct,
                "session completed"
            );
        }
        Ok(state)
    }

    /// # Errors
    ///
    /// Propagates `QuizSession::finish_exam` errors.
    pub fn finish_exam(&self, session: &mut QuizSession) -> Result<ExamResult, SessionError> {
        let result = session.finish_exam(self.clock.now())?;
        info!(
            total = result.total,
            correct = result.correct,
            score = result.score_percent,
            elapsed = %result.elapsed_hms(),
            "exam finished"
        );
        Ok(result)
    }

    fn start(&self, mode: SessionMode, plan: SessionPlan) -> Result<QuizSession, SessionError> {
        let session = QuizSession::new(mode, plan.questions, self.clock.now())?;
        info!(%mode, questions = session.total(), "session started");
        Ok(session)
    }
}
