use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use services::PreferencesService;

pub const DATA_DIR_ENV: &str = "QUIZDRILL_DATA_DIR";
const APP_DIR_NAME: &str = "quizdrill";
const FALLBACK_DATA_DIR: &str = ".quizdrill";

/// Data directory from the flag, then `QUIZDRILL_DATA_DIR`, then the platform data dir.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    pick_data_dir(flag, env::var_os(DATA_DIR_ENV), dirs::data_dir())
}

fn pick_data_dir(
    flag: Option<PathBuf>,
    from_env: Option<OsString>,
    platform: Option<PathBuf>,
) -> PathBuf {
    flag.or_else(|| from_env.filter(|v| !v.is_empty()).map(PathBuf::from))
        .or_else(|| platform.map(|dir| dir.join(APP_DIR_NAME)))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DATA_DIR))
}

/// Document folder from `--dir` (remembered on success) or the last remembered one.
pub fn resolve_quiz_dir(flag: Option<PathBuf>, prefs: &PreferencesService) -> Result<PathBuf> {
    if let Some(dir) = flag {
        if !dir.is_dir() {
            bail!("{} is not a folder", dir.display());
        }
        let dir = dir
            .canonicalize()
            .with_context(|| format!("cannot resolve {}", dir.display()))?;
        prefs.remember_quiz_dir(&dir);
        return Ok(dir);
    }
    prefs
        .quiz_dir()
        .context("no document folder yet; pass --dir <folder>")
}

/// Documents named on the command line, or every document in `dir` when none are.
pub fn resolve_documents(
    dir: Option<&Path>,
    files: &[PathBuf],
    all_in_dir: impl FnOnce(&Path) -> Result<Vec<PathBuf>>,
) -> Result<Vec<PathBuf>> {
    if files.is_empty() {
        let dir = dir.context("no documents given and no folder to scan; pass --dir or files")?;
        return all_in_dir(dir);
    }
    Ok(files
        .iter()
        .map(|file| match dir {
            Some(dir) if file.is_relative() && !file.exists() => dir.join(file),
            _ => file.clone(),
        })
        .collect())
}
