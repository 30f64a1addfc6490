use std::collections::BTreeMap;
use std::path::PathBuf;

use quiz_core::model::{DEFAULT_THRESHOLD, MasteryBook, Question, QuestionType, TypeCounts};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::repository::StorageError;

fn default_threshold() -> u32 {
    DEFAULT_THRESHOLD
}

/// On-disk shape of the mistakes book:
/// `{"questions": {type: {fingerprint: {"question": ..., "correct_count": n}}}, "threshold": n}`.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct MasteryFile {
    #[serde(default)]
    questions: BTreeMap<QuestionType, BTreeMap<String, MasteryFileEntry>>,
    #[serde(default = "default_threshold")]
    threshold: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct MasteryFileEntry {
    // decoded per entry so one bad snapshot does not take the whole book down
    question: serde_json::Value,
    #[serde(default)]
    correct_count: u32,
}

impl MasteryFile {
    pub(crate) fn from_book(book: &MasteryBook) -> Result<Self, StorageError> {
        let mut questions: BTreeMap<QuestionType, BTreeMap<String, MasteryFileEntry>> =
            BTreeMap::new();
        for entry in book.entries() {
            let snapshot = serde_json::to_value(entry.question())
                .map_err(|err| StorageError::Serialization(err.to_string()))?;
            questions
                .entry(entry.question().kind())
                .or_default()
                .insert(
                    entry.fingerprint().as_str().to_owned(),
                    MasteryFileEntry {
                        question: snapshot,
                        correct_count: entry.consecutive_correct(),
                    },
                );
        }
        Ok(Self {
            questions,
            threshold: book.threshold(),
        })
    }

    pub(crate) fn into_book(self) -> Result<MasteryBook, StorageError> {
        let mut entries = Vec::new();
        for (kind, bucket) in self.questions {
            for (key, entry) in bucket {
                match serde_json::from_value::<Question>(entry.question) {
                    Ok(question) => entries.push((question, entry.correct_count)),
                    Err(err) => {
                        warn!(%kind, fingerprint = %key, error = %err, "skipping unreadable mistake entry");
                    }
                }
            }
        }
        MasteryBook::from_persisted(self.threshold, entries)
            .map_err(|err| StorageError::InvalidData(err.to_string()))
    }
}

/// `exam_config.json`: requested count per question type.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub(crate) struct ExamConfigFile(BTreeMap<QuestionType, usize>);

impl ExamConfigFile {
    pub(crate) fn from_counts(counts: &TypeCounts) -> Self {
        Self(
            QuestionType::ALL
                .into_iter()
                .map(|kind| (kind, counts.get(kind)))
                .collect(),
        )
    }

    pub(crate) fn into_counts(self) -> TypeCounts {
        let mut counts = TypeCounts::default();
        for (kind, amount) in self.0 {
            counts.add(kind, amount);
        }
        counts
    }
}

/// `quiz_config.json`: last browsed document folder.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct QuizConfigFile {
    pub(crate) quiz_dir: PathBuf,
}
