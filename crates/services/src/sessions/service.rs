use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use quiz_core::model::Question;

use super::progress::{ExamResult, PracticeSummary, SessionProgress, rounded_percent};
use crate::error::SessionError;

//
// ─── MODES & STATES ────────────────────────────────────────────────────────────
//

/// How a session was built and which side effects its answers have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionMode {
    /// Every bank question in order; outcomes feed the mastery tracker.
    Practice,
    /// Type-quota sample; scored once at the end.
    Exam,
    /// Mastery tracker snapshot; never scored.
    Review,
}

impl SessionMode {
    /// Whether a correct answer in this mode increments the session score.
    #[must_use]
    pub fn is_scored(self) -> bool {
        matches!(self, SessionMode::Practice | SessionMode::Exam)
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionMode::Practice => "practice",
            SessionMode::Exam => "exam",
            SessionMode::Review => "review",
        };
        f.write_str(label)
    }
}

/// Observable position of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingAnswer { index: usize },
    Answered { index: usize, correct: bool },
    Complete,
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// Logged answer for one `(mode, index)` slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    /// Canonical form of what the operator submitted.
    pub submitted: String,
    pub feedback: String,
    pub is_correct: bool,
}

/// Result of a successful `submit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub index: usize,
    pub is_correct: bool,
    pub submitted: String,
    pub feedback: String,
    /// Whether this was the final question of the session.
    pub is_last: bool,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory quiz run over a fixed list of questions.
///
/// Advancing is always explicit: the caller decides when (and after which delay) to call
/// `advance`. Leaving a session simply drops it; nothing here is persisted.
#[derive(Debug, Clone)]
pub struct QuizSession {
    mode: SessionMode,
    questions: Vec<Question>,
    current: usize,
    score: usize,
    answer_log: HashMap<(SessionMode, usize), AnswerRecord>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    reached_last: bool,
    exam_result: Option<ExamResult>,
}

impl QuizSession {
    /// `started_at` should come from the services layer clock to keep time deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn new(
        mode: SessionMode,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        let reached_last = questions.len() == 1;
        Ok(Self {
            mode,
            questions,
            current: 0,
            score: 0,
            answer_log: HashMap::new(),
            started_at,
            completed_at: None,
            reached_last,
            exam_result: None,
        })
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The question on screen, or `None` once the session is complete.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.is_complete() {
            None
        } else {
            self.questions.get(self.current)
        }
    }

    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Whether navigation has ever landed on the final question.
    #[must_use]
    pub fn reached_last(&self) -> bool {
        self.reached_last
    }

    #[must_use]
    pub fn exam_result(&self) -> Option<&ExamResult> {
        self.exam_result.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.is_complete() {
            return SessionState::Complete;
        }
        match self.record(self.current) {
            Some(record) => SessionState::Answered {
                index: self.current,
                correct: record.is_correct,
            },
            None => SessionState::AwaitingAnswer {
                index: self.current,
            },
        }
    }

    /// Logged answer at `index` for this session's mode.
    #[must_use]
    pub fn record(&self, index: usize) -> Option<&AnswerRecord> {
        self.answer_log.get(&(self.mode, index))
    }

    /// Per-question correctness, `None` where nothing was submitted yet.
    #[must_use]
    pub fn question_status(&self) -> Vec<Option<bool>> {
        (0..self.questions.len())
            .map(|index| self.record(index).map(|record| record.is_correct))
            .collect()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.records().count()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.records().filter(|record| record.is_correct).count()
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            total: self.total(),
            answered: self.answered_count(),
            correct: self.correct_count(),
            current: self.current,
            is_complete: self.is_complete(),
        }
    }

    #[must_use]
    pub fn practice_summary(&self) -> PracticeSummary {
        let answered = self.answered_count();
        let correct = self.correct_count();
        PracticeSummary {
            total: self.total(),
            correct,
            incorrect: answered - correct,
            accuracy_percent: rounded_percent(correct, answered),
        }
    }

    /// Grade `response` against the current question and log it.
    ///
    /// # Errors
    ///
    /// - `SessionError::Completed` once the session is over.
    /// - `SessionError::AlreadyAnswered` if this slot already has a logged answer.
    /// - `SessionError::EmptySelection` if `response` selects nothing; state is unchanged.
    pub fn submit(&mut self, response: &str) -> Result<SubmitOutcome, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        let index = self.current;
        if self.record(index).is_some() {
            return Err(SessionError::AlreadyAnswered { index });
        }
        let question = &self.questions[index];
        let submitted = question
            .normalize_response(response)
            .ok_or(SessionError::EmptySelection)?;
        let is_correct = question.is_correct_response(&submitted);
        let feedback = feedback_text(question, &submitted, is_correct);

        if is_correct && self.mode.is_scored() {
            self.score += 1;
        }
        self.answer_log.insert(
            (self.mode, index),
            AnswerRecord {
                submitted: submitted.clone(),
                feedback: feedback.clone(),
                is_correct,
            },
        );

        Ok(SubmitOutcome {
            index,
            is_correct,
            submitted,
            feedback,
            is_last: index + 1 == self.questions.len(),
        })
    }

    /// Move past an answered question, completing the session after the last one.
    ///
    /// # Errors
    ///
    /// - `SessionError::Completed` once the session is over.
    /// - `SessionError::NotAnswered` if the current question has no logged answer; use
    ///   `jump_to` to skip instead.
    pub fn advance(&mut self, now: DateTime<Utc>) -> Result<SessionState, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }
        if self.record(self.current).is_none() {
            return Err(SessionError::NotAnswered {
                index: self.current,
            });
        }
        if self.current + 1 < self.questions.len() {
            self.move_to(self.current + 1);
        } else {
            self.completed_at = Some(now);
        }
        Ok(self.state())
    }

    /// Navigate to any question. The answer log is untouched, so an already answered
    /// question comes back in its `Answered` state.
    ///
    /// # Errors
    ///
    /// - `SessionError::OutOfRange` if `index` is past the end.
    /// - `SessionError::Completed` if the exam was already finished.
    pub fn jump_to(&mut self, index: usize) -> Result<SessionState, SessionError> {
        if self.exam_result.is_some() {
            return Err(SessionError::Completed);
        }
        if index >= self.questions.len() {
            return Err(SessionError::OutOfRange {
                index,
                total: self.questions.len(),
            });
        }
        self.completed_at = None;
        self.move_to(index);
        Ok(self.state())
    }

    /// Score an exam and close it.
    ///
    /// # Errors
    ///
    /// - `SessionError::NotExam` outside exam mode.
    /// - `SessionError::FinalQuestionNotReached` before the last question was shown.
    /// - `SessionError::Completed` if the exam was already finished.
    pub fn finish_exam(&mut self, now: DateTime<Utc>) -> Result<ExamResult, SessionError> {
        if self.mode != SessionMode::Exam {
            return Err(SessionError::NotExam);
        }
        if self.exam_result.is_some() {
            return Err(SessionError::Completed);
        }
        if !self.reached_last {
            return Err(SessionError::FinalQuestionNotReached);
        }

        let total = self.total();
        let correct = self.correct_count();
        let elapsed = (now - self.started_at).max(chrono::Duration::zero());
        let result = ExamResult {
            total,
            correct,
            score_percent: rounded_percent(correct, total),
            elapsed,
        };
        self.completed_at = Some(now);
        self.exam_result = Some(result);
        Ok(result)
    }

    fn move_to(&mut self, index: usize) {
        self.current = index;
        if index + 1 == self.questions.len() {
            self.reached_last = true;
        }
    }

    fn records(&self) -> impl Iterator<Item = &AnswerRecord> {
        self.answer_log
            .iter()
            .filter(|((mode, _), _)| *mode == self.mode)
            .map(|(_, record)| record)
    }
}

/// Operator-facing feedback for one graded answer.
fn feedback_text(question: &Question, submitted: &str, is_correct: bool) -> String {
    let yours = question.describe_response(submitted);
    if is_correct {
        format!("✓ Correct!\nYour answer:\n{yours}")
    } else {
        let expected = question.describe_response(question.answer());
        format!("✗ Incorrect!\nYour answer:\n{yours}\n\nCorrect answer:\n{expected}")
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
