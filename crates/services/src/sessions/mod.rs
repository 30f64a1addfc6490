pub(crate) mod plan;
mod progress;
mod service;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::{SessionBuilder, SessionPlan, review_order, review_order_with_rng};
pub use progress::{ExamResult, PracticeSummary, SessionProgress};
pub use service::{AnswerRecord, QuizSession, SessionMode, SessionState, SubmitOutcome};
pub use workflow::{SessionAnswer, SessionLoopService};
