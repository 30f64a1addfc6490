//! Paragraph sources: where quiz documents come from.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use quiz_core::Paragraph;
use thiserror::Error;

/// Failure to open or decode one source document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentReadError {
    #[error("document not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("unsupported document format: {}", .0.display())]
    Unsupported(PathBuf),

    #[error("document is not valid UTF-8: {}", .0.display())]
    Encoding(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DocumentReadError {
    fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::Missing(path.to_path_buf())
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Yields the ordered paragraphs of a document.
pub trait ParagraphSource: Send + Sync {
    /// Whether this source can read `path` (used when scanning a folder).
    fn supports(&self, path: &Path) -> bool;

    /// # Errors
    ///
    /// Returns `DocumentReadError` when the document is missing, unreadable or corrupt.
    fn read_paragraphs(&self, path: &Path) -> Result<Vec<Paragraph>, DocumentReadError>;
}

/// Reads UTF-8 `.txt` documents, one paragraph per line.
///
/// A line wrapped entirely in `**` is reported as emphasized, with the markers removed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextSource;

impl PlainTextSource {
    const EXTENSION: &'static str = "txt";
}

impl ParagraphSource for PlainTextSource {
    fn supports(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(Self::EXTENSION))
    }

    fn read_paragraphs(&self, path: &Path) -> Result<Vec<Paragraph>, DocumentReadError> {
        if !self.supports(path) {
            return Err(DocumentReadError::Unsupported(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(|err| DocumentReadError::from_io(path, err))?;
        let text =
            String::from_utf8(bytes).map_err(|_| DocumentReadError::Encoding(path.to_path_buf()))?;
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text);

        Ok(text.lines().map(paragraph_from_line).collect())
    }
}

fn paragraph_from_line(line: &str) -> Paragraph {
    let trimmed = line.trim();
    match trimmed
        .strip_prefix("**")
        .and_then(|rest| rest.strip_suffix("**"))
    {
        Some(inner) if !inner.trim().is_empty() => Paragraph::emphasized(inner.trim()),
        _ => Paragraph::new(line),
    }
}

/// Fixed documents keyed by path, for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    documents: Arc<HashMap<PathBuf, Vec<Paragraph>>>,
}

impl StaticSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_document<I, S>(mut self, path: impl Into<PathBuf>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Paragraph>,
    {
        let mut documents = (*self.documents).clone();
        documents.insert(path.into(), lines.into_iter().map(Into::into).collect());
        self.documents = Arc::new(documents);
        self
    }
}

impl ParagraphSource for StaticSource {
    fn supports(&self, path: &Path) -> bool {
        self.documents.contains_key(path)
    }

    fn read_paragraphs(&self, path: &Path) -> Result<Vec<Paragraph>, DocumentReadError> {
        self.documents
            .get(path)
            .cloned()
            .ok_or_else(|| DocumentReadError::Missing(path.to_path_buf()))
    }
}

/// Documents in `dir` readable by `source`, sorted by file name.
///
/// # Errors
///
/// Returns `DocumentReadError` if the folder does not exist or cannot be listed.
pub fn list_documents(
    dir: &Path,
    source: &dyn ParagraphSource,
) -> Result<Vec<PathBuf>, DocumentReadError> {
    let entries = fs::read_dir(dir).map_err(|err| DocumentReadError::from_io(dir, err))?;
    let mut documents = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| DocumentReadError::from_io(dir, err))?
            .path();
        if path.is_file() && source.supports(&path) {
            documents.push(path);
        }
    }
    documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(documents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_lines_as_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiz.txt");
        fs::write(&path, "\u{feff}1. Sky?\n**A. 对**\n\n答案：对\n").unwrap();

        let paragraphs = PlainTextSource.read_paragraphs(&path).unwrap();
        assert_eq!(paragraphs.len(), 4);
        assert_eq!(paragraphs[0].text, "1. Sky?");
        assert!(paragraphs[1].is_emphasized);
        assert_eq!(paragraphs[1].text, "A. 对");
        assert!(paragraphs[2].text.is_empty());
    }

    #[test]
    fn missing_and_foreign_files_fail() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone.txt");
        assert!(matches!(
            PlainTextSource.read_paragraphs(&missing).unwrap_err(),
            DocumentReadError::Missing(_)
        ));

        let docx = dir.path().join("quiz.docx");
        fs::write(&docx, b"PK").unwrap();
        assert!(matches!(
            PlainTextSource.read_paragraphs(&docx).unwrap_err(),
            DocumentReadError::Unsupported(_)
        ));
    }

    #[test]
    fn invalid_utf8_is_an_encoding_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.TXT");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        assert!(matches!(
            PlainTextSource.read_paragraphs(&path).unwrap_err(),
            DocumentReadError::Encoding(_)
        ));
    }

    #[test]
    fn lists_supported_documents_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join("a.txt"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();
        fs::create_dir(dir.path().join("sub.txt")).unwrap();

        let docs = list_documents(dir.path(), &PlainTextSource).unwrap();
        let names: Vec<_> = docs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn static_source_serves_registered_documents() {
        let source = StaticSource::new().with_document("one", ["1. Sky?", "答案：对"]);
        assert_eq!(source.read_paragraphs(Path::new("one")).unwrap().len(), 2);
        assert!(source.read_paragraphs(Path::new("two")).is_err());
    }
}
