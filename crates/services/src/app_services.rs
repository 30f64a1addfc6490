use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use storage::repository::Storage;
use storage::source::{ParagraphSource, PlainTextSource};

use crate::Clock;
use crate::bank_service::BankLoader;
use crate::error::AppServicesError;
use crate::mastery_service::MasteryTracker;
use crate::preferences_service::PreferencesService;
use crate::sessions::SessionLoopService;

/// Assembles app-facing services over one storage backend.
pub struct AppServices {
    data_dir: Option<PathBuf>,
    bank_loader: BankLoader,
    preferences: PreferencesService,
    session_loop: SessionLoopService,
    tracker: MasteryTracker,
}

impl AppServices {
    /// Build services backed by JSON files in `data_dir`, reading plain-text documents.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::DataDir` if the directory cannot be created.
    pub fn open(data_dir: &Path, clock: Clock) -> Result<Self, AppServicesError> {
        fs::create_dir_all(data_dir).map_err(|source| AppServicesError::DataDir {
            path: data_dir.to_path_buf(),
            source,
        })?;
        let mut services = Self::with_storage(
            Storage::json(data_dir),
            Arc::new(PlainTextSource),
            clock,
        );
        services.data_dir = Some(data_dir.to_path_buf());
        Ok(services)
    }

    /// Build services over explicit storage and document source.
    #[must_use]
    pub fn with_storage(
        storage: Storage,
        source: Arc<dyn ParagraphSource>,
        clock: Clock,
    ) -> Self {
        let preferences = PreferencesService::new(Arc::clone(&storage.preferences));
        let session_loop = SessionLoopService::new(clock, preferences.clone());
        let tracker = MasteryTracker::load(Arc::clone(&storage.mastery));
        Self {
            data_dir: None,
            bank_loader: BankLoader::new(source),
            preferences,
            session_loop,
            tracker,
        }
    }

    /// Directory holding the store files, when file-backed.
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    #[must_use]
    pub fn bank_loader(&self) -> &BankLoader {
        &self.bank_loader
    }

    #[must_use]
    pub fn preferences(&self) -> &PreferencesService {
        &self.preferences
    }

    #[must_use]
    pub fn session_loop(&self) -> &SessionLoopService {
        &self.session_loop
    }

    #[must_use]
    pub fn tracker(&self) -> &MasteryTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut MasteryTracker {
        &mut self.tracker
    }
}
