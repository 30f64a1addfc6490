use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use quiz_core::model::{MasteryBook, TypeCounts};
use thiserror::Error;

use crate::json::JsonRepository;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("i/o error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid persisted data: {0}")]
    InvalidData(String),
}

/// Durable home of the mistakes book.
///
/// Writes are synchronous full rewrites; callers mutate in memory first and then save.
pub trait MasteryRepository: Send + Sync {
    /// Load the persisted book, or `None` when nothing has been written yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store exists but cannot be read or decoded.
    fn load_book(&self) -> Result<Option<MasteryBook>, StorageError>;

    /// Replace the persisted book with `book`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store cannot be written.
    fn save_book(&self, book: &MasteryBook) -> Result<(), StorageError>;
}

/// Small key-value preferences: last exam counts and last browsed folder.
pub trait PreferencesRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the file exists but cannot be read or decoded.
    fn load_exam_counts(&self) -> Result<Option<TypeCounts>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the file cannot be written.
    fn save_exam_counts(&self, counts: &TypeCounts) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the file exists but cannot be read or decoded.
    fn load_quiz_dir(&self) -> Result<Option<PathBuf>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the file cannot be written.
    fn save_quiz_dir(&self, dir: &Path) -> Result<(), StorageError>;
}

/// In-memory repository for tests and throwaway runs.
///
/// `fail_writes` makes every save return `StorageError::Io`, which is how services tests
/// exercise the non-fatal persistence path.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    book: Arc<Mutex<Option<MasteryBook>>>,
    exam_counts: Arc<Mutex<Option<TypeCounts>>>,
    quiz_dir: Arc<Mutex<Option<PathBuf>>>,
    fail_writes: Arc<AtomicBool>,
    saves: Arc<Mutex<usize>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_book(book: MasteryBook) -> Self {
        let repo = Self::new();
        if let Ok(mut guard) = repo.book.lock() {
            *guard = Some(book);
        }
        repo
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful mastery saves so far.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.lock().map(|guard| *guard).unwrap_or_default()
    }

    /// Last successfully saved book.
    #[must_use]
    pub fn saved_book(&self) -> Option<MasteryBook> {
        self.book.lock().ok().and_then(|guard| guard.clone())
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("writes disabled".into()));
        }
        Ok(())
    }
}

fn poisoned<E: std::fmt::Display>(err: E) -> StorageError {
    StorageError::Io(err.to_string())
}

impl MasteryRepository for InMemoryRepository {
    fn load_book(&self) -> Result<Option<MasteryBook>, StorageError> {
        let guard = self.book.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    fn save_book(&self, book: &MasteryBook) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut guard = self.book.lock().map_err(poisoned)?;
        *guard = Some(book.clone());
        let mut saves = self.saves.lock().map_err(poisoned)?;
        *saves += 1;
        Ok(())
    }
}

impl PreferencesRepository for InMemoryRepository {
    fn load_exam_counts(&self) -> Result<Option<TypeCounts>, StorageError> {
        let guard = self.exam_counts.lock().map_err(poisoned)?;
        Ok(*guard)
    }

    fn save_exam_counts(&self, counts: &TypeCounts) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut guard = self.exam_counts.lock().map_err(poisoned)?;
        *guard = Some(*counts);
        Ok(())
    }

    fn load_quiz_dir(&self) -> Result<Option<PathBuf>, StorageError> {
        let guard = self.quiz_dir.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    fn save_quiz_dir(&self, dir: &Path) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut guard = self.quiz_dir.lock().map_err(poisoned)?;
        *guard = Some(dir.to_path_buf());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub mastery: Arc<dyn MasteryRepository>,
    pub preferences: Arc<dyn PreferencesRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let mastery: Arc<dyn MasteryRepository> = Arc::new(repo.clone());
        let preferences: Arc<dyn PreferencesRepository> = Arc::new(repo);
        Self {
            mastery,
            preferences,
        }
    }

    /// JSON files inside `data_dir`.
    #[must_use]
    pub fn json(data_dir: impl Into<PathBuf>) -> Self {
        let repo = JsonRepository::new(data_dir);
        let mastery: Arc<dyn MasteryRepository> = Arc::new(repo.clone());
        let preferences: Arc<dyn PreferencesRepository> = Arc::new(repo);
        Self {
            mastery,
            preferences,
        }
    }
}
