use rand::seq::SliceRandom;
use rand::{Rng, rng};

use quiz_core::model::{Question, QuestionBank, QuestionType, TypeCounts};

/// Selection result for a session build.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPlan {
    pub questions: Vec<Question>,
    /// Counts the caller asked for.
    pub requested: TypeCounts,
    /// Counts actually drawn after clamping to availability.
    pub selected: TypeCounts,
}

impl SessionPlan {
    /// Total number of questions in this plan.
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    /// Returns true when no questions were selected for this session.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Whether any requested count had to be lowered.
    #[must_use]
    pub fn was_clamped(&self) -> bool {
        self.requested != self.selected
    }
}

/// Picks the questions of a session from a loaded bank.
pub struct SessionBuilder<'a> {
    bank: &'a QuestionBank,
}

impl<'a> SessionBuilder<'a> {
    #[must_use]
    pub fn new(bank: &'a QuestionBank) -> Self {
        Self { bank }
    }

    /// Every bank question, in bank order.
    #[must_use]
    pub fn practice(&self) -> SessionPlan {
        let counts = self.bank.counts();
        SessionPlan {
            questions: self.bank.questions().to_vec(),
            requested: counts,
            selected: counts,
        }
    }

    /// Uniform sample without replacement per type, using the thread rng.
    #[must_use]
    pub fn exam(&self, requested: &TypeCounts) -> SessionPlan {
        self.exam_with_rng(requested, &mut rng())
    }

    /// Uniform sample without replacement per type.
    ///
    /// Each type contributes `min(requested, available)` questions; groups are laid out
    /// in `QuestionType::ALL` order (single, multiple, true/false).
    pub fn exam_with_rng<R: Rng + ?Sized>(
        &self,
        requested: &TypeCounts,
        rng: &mut R,
    ) -> SessionPlan {
        let mut questions = Vec::new();
        let mut selected = TypeCounts::default();

        for kind in QuestionType::ALL {
            let mut candidates = self.bank.by_type(kind);
            let take = requested.get(kind).min(candidates.len());
            if take == 0 {
                continue;
            }
            candidates.as_mut_slice().shuffle(rng);
            questions.extend(candidates.into_iter().take(take).cloned());
            selected.add(kind, take);
        }

        SessionPlan {
            questions,
            requested: *requested,
            selected,
        }
    }
}

/// Shuffle a mastery snapshot into review order, using the thread rng.
#[must_use]
pub fn review_order(questions: Vec<Question>) -> Vec<Question> {
    review_order_with_rng(questions, &mut rng())
}

pub fn review_order_with_rng<R: Rng + ?Sized>(
    mut questions: Vec<Question>,
    rng: &mut R,
) -> Vec<Question> {
    questions.as_mut_slice().shuffle(rng);
    questions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn multi(n: usize) -> Question {
        Question::new(
            format!("Multi {n}?"),
            vec!["A. x".into(), "B. y".into(), "C. z".into()],
            "AB",
            QuestionType::MultipleChoice,
        )
        .unwrap()
    }

    fn single(n: usize) -> Question {
        Question::new(
            format!("Single {n}?"),
            vec!["A. x".into(), "B. y".into()],
            "A",
            QuestionType::SingleChoice,
        )
        .unwrap()
    }

    fn truth(n: usize) -> Question {
        Question::new(format!("Truth {n}."), Vec::new(), "T", QuestionType::TrueFalse).unwrap()
    }

    fn bank() -> QuestionBank {
        QuestionBank::from_questions(vec![
            truth(0),
            multi(0),
            single(0),
            multi(1),
            single(1),
            multi(2),
        ])
    }

    fn counts(single_choice: usize, multiple_choice: usize, true_false: usize) -> TypeCounts {
        TypeCounts {
            single_choice,
            multiple_choice,
            true_false,
        }
    }

    #[test]
    fn practice_keeps_bank_order() {
        let bank = bank();
        let plan = SessionBuilder::new(&bank).practice();
        assert_eq!(plan.questions, bank.questions());
        assert_eq!(plan.selected.total(), 6);
    }

    #[test]
    fn exam_groups_by_type_in_fixed_order() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(7);
        let plan = SessionBuilder::new(&bank).exam_with_rng(&counts(2, 1, 1), &mut rng);

        let kinds: Vec<_> = plan.questions.iter().map(Question::kind).collect();
        assert_eq!(
            kinds,
            vec![
                QuestionType::SingleChoice,
                QuestionType::SingleChoice,
                QuestionType::MultipleChoice,
                QuestionType::TrueFalse,
            ]
        );
        assert!(!plan.was_clamped());
    }

    #[test]
    fn exam_counts_are_clamped_to_availability() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(1);
        let plan = SessionBuilder::new(&bank).exam_with_rng(&counts(5, 0, 9), &mut rng);
        assert_eq!(plan.selected, counts(2, 0, 1));
        assert_eq!(plan.total(), 3);
        assert!(plan.was_clamped());
    }

    #[test]
    fn exam_never_repeats_a_question() {
        let bank = bank();
        let mut rng = StdRng::seed_from_u64(3);
        let plan = SessionBuilder::new(&bank).exam_with_rng(&counts(0, 3, 0), &mut rng);
        let mut texts: Vec<_> = plan.questions.iter().map(Question::text).collect();
        texts.sort_unstable();
        texts.dedup();
        assert_eq!(texts.len(), 3);
    }

    #[test]
    fn zero_counts_yield_empty_plan() {
        let bank = bank();
        let plan = SessionBuilder::new(&bank).exam(&TypeCounts::default());
        assert!(plan.is_empty());
    }

    #[test]
    fn single_multiple_choice_draw_is_uniform() {
        let bank = bank();
        let builder = SessionBuilder::new(&bank);
        let mut rng = StdRng::seed_from_u64(42);
        let mut hits = [0usize; 3];

        for _ in 0..3_000 {
            let plan = builder.exam_with_rng(&counts(0, 1, 0), &mut rng);
            assert_eq!(plan.total(), 1);
            let idx = (0..3)
                .position(|n| plan.questions[0] == multi(n))
                .unwrap();
            hits[idx] += 1;
        }

        for count in hits {
            assert!((800..=1_200).contains(&count), "skewed draw: {hits:?}");
        }
    }

    #[test]
    fn review_order_is_a_permutation() {
        let questions = vec![truth(0), truth(1), truth(2), truth(3)];
        let mut rng = StdRng::seed_from_u64(9);
        let mut shuffled = review_order_with_rng(questions.clone(), &mut rng);
        shuffled.sort_by(|a, b| a.text().cmp(b.text()));
        assert_eq!(shuffled, questions);
    }
}
