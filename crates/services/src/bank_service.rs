use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use quiz_core::model::{QuestionBank, QuestionType, TypeCounts};
use quiz_core::parser::{ParseReport, parse};
use storage::source::{DocumentReadError, ParagraphSource, PlainTextSource, list_documents};

use crate::error::BankError;

/// A document that could not be read and was left out.
#[derive(Debug)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub error: DocumentReadError,
}

/// Aggregated bank plus what went wrong while building it.
#[derive(Debug, Default)]
pub struct BankLoad {
    pub bank: QuestionBank,
    pub failures: Vec<DocumentFailure>,
    /// Questions dropped across all documents for lacking an answer line.
    pub discarded_incomplete: usize,
    /// Questions dropped across all documents for failing validation.
    pub rejected: usize,
}

/// Per-document question counts, as shown when browsing a folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub path: PathBuf,
    pub counts: TypeCounts,
}

#[derive(Debug, Default)]
pub struct FolderSummary {
    pub documents: Vec<DocumentSummary>,
    pub failures: Vec<DocumentFailure>,
}

impl FolderSummary {
    /// Sum of every readable document's counts.
    #[must_use]
    pub fn totals(&self) -> TypeCounts {
        let mut totals = TypeCounts::default();
        for doc in &self.documents {
            for kind in QuestionType::ALL {
                totals.add(kind, doc.counts.get(kind));
            }
        }
        totals
    }
}

/// Reads documents through a `ParagraphSource` and parses them into a bank.
#[derive(Clone)]
pub struct BankLoader {
    source: Arc<dyn ParagraphSource>,
}

impl Default for BankLoader {
    fn default() -> Self {
        Self::new(Arc::new(PlainTextSource))
    }
}

impl BankLoader {
    #[must_use]
    pub fn new(source: Arc<dyn ParagraphSource>) -> Self {
        Self { source }
    }

    /// Read and parse a single document.
    ///
    /// # Errors
    ///
    /// Returns `DocumentReadError` if the source cannot read the document.
    pub fn parse_document(&self, path: &Path) -> Result<ParseReport, DocumentReadError> {
        let paragraphs = self.source.read_paragraphs(path)?;
        let report = parse(paragraphs);
        if report.discarded_incomplete > 0 {
            warn!(
                path = %path.display(),
                count = report.discarded_incomplete,
                "discarded questions without an answer line"
            );
        }
        for rejected in &report.rejected {
            warn!(
                path = %path.display(),
                question = %rejected.text,
                reason = %rejected.reason,
                "rejected malformed question"
            );
        }
        Ok(report)
    }

    /// Aggregate `paths` in order. Unreadable documents are skipped and reported.
    #[must_use]
    pub fn load(&self, paths: &[PathBuf]) -> BankLoad {
        let mut load = BankLoad::default();
        for path in paths {
            match self.parse_document(path) {
                Ok(report) => {
                    load.discarded_incomplete += report.discarded_incomplete;
                    load.rejected += report.rejected.len();
                    load.bank.extend(report.questions);
                }
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping unreadable document");
                    load.failures.push(DocumentFailure {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }
        info!(
            documents = paths.len(),
            failed = load.failures.len(),
            questions = load.bank.len(),
            "question bank loaded"
        );
        load
    }

    /// Supported documents in `dir`, sorted by file name.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Folder` if the folder cannot be listed.
    pub fn list_documents(&self, dir: &Path) -> Result<Vec<PathBuf>, BankError> {
        Ok(list_documents(dir, self.source.as_ref())?)
    }

    /// Type counts for every supported document in `dir`.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Folder` if the folder cannot be listed. Unreadable documents
    /// are reported in `FolderSummary::failures` instead.
    pub fn summarize_documents(&self, dir: &Path) -> Result<FolderSummary, BankError> {
        let mut summary = FolderSummary::default();
        for path in self.list_documents(dir)? {
            match self.parse_document(&path) {
                Ok(report) => summary.documents.push(DocumentSummary {
                    counts: TypeCounts::from_questions(&report.questions),
                    path,
                }),
                Err(error) => {
                    warn!(path = %path.display(), %error, "skipping unreadable document");
                    summary.failures.push(DocumentFailure { path, error });
                }
            }
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use storage::source::StaticSource;

    fn source() -> StaticSource {
        StaticSource::new()
            .with_document(
                "a",
                [
                    "1. Which are fruits?",
                    "A. Apple",
                    "B. Car",
                    "C. Banana",
                    "答案:AC",
                    "2. Dangling question",
                ],
            )
            .with_document("b", ["1. The sky is blue.", "答案：对"])
    }

    #[test]
    fn load_aggregates_in_order_and_reports_failures() {
        let loader = BankLoader::new(Arc::new(source()));
        let paths = vec![PathBuf::from("b"), PathBuf::from("missing"), PathBuf::from("a")];

        let load = loader.load(&paths);
        assert_eq!(load.bank.len(), 2);
        assert_eq!(load.bank.questions()[0].text(), "The sky is blue.");
        assert_eq!(load.failures.len(), 1);
        assert_eq!(load.failures[0].path, PathBuf::from("missing"));
        assert!(matches!(
            load.failures[0].error,
            DocumentReadError::Missing(_)
        ));
        assert_eq!(load.discarded_incomplete, 1);
    }

    #[test]
    fn summarizes_plain_text_folder() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("one.txt"),
            "1. Sky?\n答案：对\n2. Pick.\nA. x\nB. y\n答案：B\n",
        )
        .unwrap();
        fs::write(dir.path().join("two.txt"), [0xff, 0xfe]).unwrap();
        fs::write(dir.path().join("notes.md"), "1. ignored\n答案：对\n").unwrap();

        let loader = BankLoader::default();
        let summary = loader.summarize_documents(dir.path()).unwrap();

        assert_eq!(summary.documents.len(), 1);
        let counts = summary.documents[0].counts;
        assert_eq!(counts.true_false, 1);
        assert_eq!(counts.single_choice, 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.totals().total(), 2);
    }

    #[test]
    fn missing_folder_is_an_error() {
        let loader = BankLoader::default();
        let err = loader
            .list_documents(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(matches!(
            err,
            BankError::Folder(DocumentReadError::Missing(_))
        ));
    }
}
