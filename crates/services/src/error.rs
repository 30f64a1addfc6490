//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::MasteryError;
use storage::DocumentReadError;

/// Errors emitted by `MasteryTracker`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackerError {
    #[error(transparent)]
    Mastery(#[from] MasteryError),
}

/// Errors emitted while browsing a document folder.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error(transparent)]
    Folder(#[from] DocumentReadError),
}

/// Errors emitted by quiz sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
    #[error("session already completed")]
    Completed,
    #[error("select at least one option")]
    EmptySelection,
    #[error("question {} was already answered", .index + 1)]
    AlreadyAnswered { index: usize },
    #[error("question {} has not been answered yet", .index + 1)]
    NotAnswered { index: usize },
    #[error("question {} is out of range (1-{total})", .index + 1)]
    OutOfRange { index: usize, total: usize },
    #[error("only exam sessions can be finished early")]
    NotExam,
    #[error("reach the final question before finishing the exam")]
    FinalQuestionNotReached,
    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// Errors emitted while assembling `AppServices`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error("cannot use data directory {}: {source}", .path.display())]
    DataDir {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
