#![forbid(unsafe_code)]

pub mod app_services;
pub mod bank_service;
pub mod error;
pub mod exam_timer;
pub mod mastery_service;
pub mod preferences_service;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use bank_service::{BankLoad, BankLoader, DocumentFailure, DocumentSummary, FolderSummary};
pub use error::{AppServicesError, BankError, SessionError, TrackerError};
pub use exam_timer::ExamTimer;
pub use mastery_service::{MasteryTracker, TrackerOutcome};
pub use preferences_service::PreferencesService;
pub use sessions::{
    AnswerRecord, ExamResult, PracticeSummary, QuizSession, SessionAnswer, SessionBuilder,
    SessionLoopService, SessionMode, SessionPlan, SessionProgress, SessionState, SubmitOutcome,
};
