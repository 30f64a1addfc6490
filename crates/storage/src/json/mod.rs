use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::repository::StorageError;

mod mapping;
mod mastery_repo;
mod preferences_repo;

pub const MASTERY_FILE: &str = "wrong_questions.json";
pub const EXAM_CONFIG_FILE: &str = "exam_config.json";
pub const QUIZ_CONFIG_FILE: &str = "quiz_config.json";

/// File-backed repository writing pretty-printed JSON into a data directory.
#[derive(Debug, Clone)]
pub struct JsonRepository {
    dir: PathBuf,
}

impl JsonRepository {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn mastery_path(&self) -> PathBuf {
        self.dir.join(MASTERY_FILE)
    }

    #[must_use]
    pub fn exam_config_path(&self) -> PathBuf {
        self.dir.join(EXAM_CONFIG_FILE)
    }

    #[must_use]
    pub fn quiz_config_path(&self) -> PathBuf {
        self.dir.join(QUIZ_CONFIG_FILE)
    }
}

fn io_err(path: &Path, err: &io::Error) -> StorageError {
    StorageError::Io(format!("{}: {err}", path.display()))
}

/// Read and decode `path`; a missing file is `Ok(None)`.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(io_err(path, &err)),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|err| StorageError::Serialization(format!("{}: {err}", path.display())))
}

/// Replace `path` with the JSON encoding of `value`.
///
/// The document is written to a sibling temp file and renamed over the target, so readers
/// see either the previous or the new content, never a partial file.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let body = serde_json::to_vec_pretty(value)
        .map_err(|err| StorageError::Serialization(err.to_string()))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_err(parent, &err))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = fs::File::create(&tmp).map_err(|err| io_err(&tmp, &err))?;
    file.write_all(&body).map_err(|err| io_err(&tmp, &err))?;
    file.sync_all().map_err(|err| io_err(&tmp, &err))?;
    drop(file);

    fs::rename(&tmp, path).map_err(|err| io_err(path, &err))
}
