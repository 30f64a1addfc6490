use std::collections::BTreeMap;
use thiserror::Error;

use crate::model::bank::TypeCounts;
use crate::model::ids::Fingerprint;
use crate::model::question::{Question, QuestionType};

/// Consecutive correct answers needed to retire a mistake unless configured otherwise.
pub const DEFAULT_THRESHOLD: u32 = 2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MasteryError {
    #[error("retirement threshold must be at least 1, got {0}")]
    InvalidThreshold(u32),
}

/// A previously missed question and its current streak of correct answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasteryEntry {
    fingerprint: Fingerprint,
    question: Question,
    consecutive_correct: u32,
}

impl MasteryEntry {
    #[must_use]
    pub fn fingerprint(&self) -> &Fingerprint {
        &self.fingerprint
    }

    /// Snapshot taken when the question was last missed.
    #[must_use]
    pub fn question(&self) -> &Question {
        &self.question
    }

    #[must_use]
    pub fn consecutive_correct(&self) -> u32 {
        self.consecutive_correct
    }
}

/// What a single `record_outcome` call did to the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasteryChange {
    /// Correct answer for a question that is not in the book.
    Unchanged,
    /// First miss; a new entry was created.
    Added,
    /// Miss on an existing entry; its streak went back to zero.
    Reset { previous: u32 },
    /// Correct answer; the streak grew but is still below the threshold.
    Progressed { consecutive_correct: u32 },
    /// Correct answer that reached the threshold; the entry was removed.
    Retired,
}

impl MasteryChange {
    /// Whether the book changed and must be persisted.
    #[must_use]
    pub fn is_mutation(self) -> bool {
        !matches!(self, MasteryChange::Unchanged)
    }
}

/// Deduplicated store of missed questions, keyed by type then fingerprint.
///
/// An entry only lives while its streak is below the retirement threshold. Changing the
/// threshold applies to later outcomes; existing entries are neither retired nor restored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasteryBook {
    entries: BTreeMap<QuestionType, BTreeMap<Fingerprint, MasteryEntry>>,
    threshold: u32,
}

impl Default for MasteryBook {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl MasteryBook {
    /// # Errors
    ///
    /// Returns `MasteryError::InvalidThreshold` if `threshold` is zero.
    pub fn new(threshold: u32) -> Result<Self, MasteryError> {
        validate_threshold(threshold)?;
        Ok(Self {
            entries: BTreeMap::new(),
            threshold,
        })
    }

    /// Rehydrate a book from persisted `(snapshot, streak)` pairs.
    ///
    /// Entries are re-keyed by the snapshot's own type and fingerprint, so files written
    /// with another hashing scheme still deduplicate correctly. When two snapshots collapse
    /// onto the same key the later one wins.
    ///
    /// # Errors
    ///
    /// Returns `MasteryError::InvalidThreshold` if `threshold` is zero.
    pub fn from_persisted(
        threshold: u32,
        entries: impl IntoIterator<Item = (Question, u32)>,
    ) -> Result<Self, MasteryError> {
        let mut book = Self::new(threshold)?;
        for (question, consecutive_correct) in entries {
            let fingerprint = question.fingerprint();
            book.entries.entry(question.kind()).or_default().insert(
                fingerprint.clone(),
                MasteryEntry {
                    fingerprint,
                    question,
                    consecutive_correct,
                },
            );
        }
        Ok(book)
    }

    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// # Errors
    ///
    /// Returns `MasteryError::InvalidThreshold` if `threshold` is zero.
    pub fn set_threshold(&mut self, threshold: u32) -> Result<(), MasteryError> {
        validate_threshold(threshold)?;
        self.threshold = threshold;
        Ok(())
    }

    /// Apply one practice outcome.
    pub fn record_outcome(&mut self, question: &Question, is_correct: bool) -> MasteryChange {
        let fingerprint = question.fingerprint();
        let kind = question.kind();

        if is_correct {
            let Some(bucket) = self.entries.get_mut(&kind) else {
                return MasteryChange::Unchanged;
            };
            let Some(entry) = bucket.get_mut(&fingerprint) else {
                return MasteryChange::Unchanged;
            };
            entry.consecutive_correct = entry.consecutive_correct.saturating_add(1);
            if entry.consecutive_correct >= self.threshold {
                bucket.remove(&fingerprint);
                if bucket.is_empty() {
                    self.entries.remove(&kind);
                }
                return MasteryChange::Retired;
            }
            return MasteryChange::Progressed {
                consecutive_correct: entry.consecutive_correct,
            };
        }

        let previous = self
            .entries
            .entry(kind)
            .or_default()
            .insert(
                fingerprint.clone(),
                MasteryEntry {
                    fingerprint,
                    question: question.clone(),
                    consecutive_correct: 0,
                },
            )
            .map(|old| old.consecutive_correct);

        match previous {
            Some(previous) => MasteryChange::Reset { previous },
            None => MasteryChange::Added,
        }
    }

    #[must_use]
    pub fn get(&self, question: &Question) -> Option<&MasteryEntry> {
        self.entries
            .get(&question.kind())
            .and_then(|bucket| bucket.get(&question.fingerprint()))
    }

    #[must_use]
    pub fn contains(&self, question: &Question) -> bool {
        self.get(question).is_some()
    }

    /// All entries, grouped by type in `QuestionType::ALL` order.
    pub fn entries(&self) -> impl Iterator<Item = &MasteryEntry> {
        self.entries.values().flat_map(BTreeMap::values)
    }

    /// Copies of every stored snapshot, in deterministic order.
    #[must_use]
    pub fn questions(&self) -> Vec<Question> {
        self.entries().map(|entry| entry.question.clone()).collect()
    }

    #[must_use]
    pub fn counts_by_type(&self) -> TypeCounts {
        let mut counts = TypeCounts::default();
        for (kind, bucket) in &self.entries {
            counts.add(*kind, bucket.len());
        }
        counts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn validate_threshold(threshold: u32) -> Result<(), MasteryError> {
    if threshold == 0 {
        return Err(MasteryError::InvalidThreshold(threshold));
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
