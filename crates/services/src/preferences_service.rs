use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use quiz_core::model::TypeCounts;
use storage::repository::PreferencesRepository;

/// Remembered exam counts and document folder.
///
/// Reads never fail: missing or corrupt files fall back to defaults with a warning.
/// Writes report success as a `bool` and log failures.
#[derive(Clone)]
pub struct PreferencesService {
    repo: Arc<dyn PreferencesRepository>,
}

impl PreferencesService {
    #[must_use]
    pub fn new(repo: Arc<dyn PreferencesRepository>) -> Self {
        Self { repo }
    }

    /// Last exam counts, all zero when nothing usable is stored.
    #[must_use]
    pub fn exam_counts(&self) -> TypeCounts {
        match self.repo.load_exam_counts() {
            Ok(counts) => counts.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "exam config unreadable; using zero counts");
                TypeCounts::default()
            }
        }
    }

    pub fn save_exam_counts(&self, counts: &TypeCounts) -> bool {
        match self.repo.save_exam_counts(counts) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to save exam config");
                false
            }
        }
    }

    /// Last browsed folder, if it still exists.
    #[must_use]
    pub fn quiz_dir(&self) -> Option<PathBuf> {
        match self.repo.load_quiz_dir() {
            Ok(Some(dir)) if dir.is_dir() => Some(dir),
            Ok(Some(dir)) => {
                warn!(dir = %dir.display(), "remembered folder no longer exists");
                None
            }
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "quiz config unreadable; no remembered folder");
                None
            }
        }
    }

    pub fn remember_quiz_dir(&self, dir: &Path) -> bool {
        match self.repo.save_quiz_dir(dir) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, dir = %dir.display(), "failed to remember folder");
                false
            }
        }
    }
}
