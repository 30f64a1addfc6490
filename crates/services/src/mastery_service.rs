use std::sync::Arc;

use rand::{Rng, rng};
use tracing::{debug, warn};

use quiz_core::model::{MasteryBook, MasteryChange, Question, TypeCounts};
use storage::repository::MasteryRepository;

use crate::error::TrackerError;
use crate::sessions::plan::review_order_with_rng;

/// What a tracker mutation did and whether it reached the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerOutcome {
    pub change: MasteryChange,
    /// `false` when the rewrite failed; the in-memory change is kept regardless.
    pub persisted: bool,
}

/// Mistakes book plus the store it is mirrored to.
///
/// Every mutation is applied in memory first and then written back as a full rewrite. A
/// failed write is logged and reported through `TrackerOutcome::persisted`; the next
/// successful mutation rewrites the whole current state.
pub struct MasteryTracker {
    book: MasteryBook,
    repo: Arc<dyn MasteryRepository>,
}

impl MasteryTracker {
    #[must_use]
    pub fn new(book: MasteryBook, repo: Arc<dyn MasteryRepository>) -> Self {
        Self { book, repo }
    }

    /// Load the persisted book, starting empty if it is missing or unreadable.
    #[must_use]
    pub fn load(repo: Arc<dyn MasteryRepository>) -> Self {
        let book = match repo.load_book() {
            Ok(Some(book)) => {
                debug!(entries = book.len(), threshold = book.threshold(), "loaded mistakes book");
                book
            }
            Ok(None) => MasteryBook::default(),
            Err(err) => {
                warn!(error = %err, "mistakes book unreadable; starting empty");
                MasteryBook::default()
            }
        };
        Self::new(book, repo)
    }

    #[must_use]
    pub fn book(&self) -> &MasteryBook {
        &self.book
    }

    #[must_use]
    pub fn threshold(&self) -> u32 {
        self.book.threshold()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.book.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.book.is_empty()
    }

    #[must_use]
    pub fn counts_by_type(&self) -> TypeCounts {
        self.book.counts_by_type()
    }

    /// Apply a practice outcome and persist it when the book changed.
    pub fn record_outcome(&mut self, question: &Question, is_correct: bool) -> TrackerOutcome {
        let change = self.book.record_outcome(question, is_correct);
        let persisted = if change.is_mutation() {
            debug!(?change, kind = %question.kind(), "mistakes book updated");
            self.persist()
        } else {
            true
        };
        TrackerOutcome { change, persisted }
    }

    /// Change the retirement threshold for later outcomes and persist it.
    ///
    /// Returns whether the rewrite succeeded.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Mastery` if `threshold` is zero; nothing changes then.
    pub fn set_threshold(&mut self, threshold: u32) -> Result<bool, TrackerError> {
        self.book.set_threshold(threshold)?;
        Ok(self.persist())
    }

    /// One copy of every entry, in random order. The book is not touched.
    #[must_use]
    pub fn snapshot_for_review(&self) -> Vec<Question> {
        self.snapshot_for_review_with_rng(&mut rng())
    }

    pub fn snapshot_for_review_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Question> {
        review_order_with_rng(self.book.questions(), rng)
    }

    fn persist(&self) -> bool {
        match self.repo.save_book(&self.book) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, entries = self.book.len(), "failed to persist mistakes book");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{MasteryError, QuestionType};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::repository::InMemoryRepository;

    fn sky() -> Question {
        Question::new("The sky is blue.", Vec::new(), "T", QuestionType::TrueFalse).unwrap()
    }

    fn grass() -> Question {
        Question::new("Grass is red.", Vec::new(), "F", QuestionType::TrueFalse).unwrap()
    }

    fn tracker(repo: &InMemoryRepository) -> MasteryTracker {
        MasteryTracker::load(Arc::new(repo.clone()))
    }

    #[test]
    fn only_mutations_are_written() {
        let repo = InMemoryRepository::new();
        let mut t = tracker(&repo);

        let outcome = t.record_outcome(&sky(), true);
        assert_eq!(outcome.change, MasteryChange::Unchanged);
        assert_eq!(repo.save_count(), 0);

        let outcome = t.record_outcome(&sky(), false);
        assert_eq!(outcome.change, MasteryChange::Added);
        assert!(outcome.persisted);
        assert_eq!(repo.save_count(), 1);
        assert_eq!(repo.saved_book().unwrap().len(), 1);
    }

    #[test]
    fn write_failure_keeps_memory_and_retries_later() {
        let repo = InMemoryRepository::new();
        let mut t = tracker(&repo);
        repo.set_fail_writes(true);

        let outcome = t.record_outcome(&sky(), false);
        assert!(!outcome.persisted);
        assert_eq!(t.len(), 1);
        assert!(repo.saved_book().is_none());

        repo.set_fail_writes(false);
        assert!(t.record_outcome(&grass(), false).persisted);
        assert_eq!(repo.saved_book().unwrap().len(), 2);
    }

    #[test]
    fn load_restores_persisted_state() {
        let mut book = MasteryBook::new(3).unwrap();
        book.record_outcome(&sky(), false);
        let repo = InMemoryRepository::with_book(book);

        let t = tracker(&repo);
        assert_eq!(t.threshold(), 3);
        assert_eq!(t.counts_by_type().true_false, 1);
    }

    #[test]
    fn threshold_is_validated_and_persisted() {
        let repo = InMemoryRepository::new();
        let mut t = tracker(&repo);

        let err = t.set_threshold(0).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Mastery(MasteryError::InvalidThreshold(0))
        ));
        assert_eq!(repo.save_count(), 0);

        assert!(t.set_threshold(4).unwrap());
        assert_eq!(repo.saved_book().unwrap().threshold(), 4);
    }

    #[test]
    fn review_snapshot_copies_every_entry() {
        let repo = InMemoryRepository::new();
        let mut t = tracker(&repo);
        t.record_outcome(&sky(), false);
        t.record_outcome(&grass(), false);

        let mut rng = StdRng::seed_from_u64(5);
        let snapshot = t.snapshot_for_review_with_rng(&mut rng);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains(&sky()));
        assert!(snapshot.contains(&grass()));
        assert_eq!(t.len(), 2);
    }
}
