use crate::model::question::{Question, QuestionType};

/// Number of questions per type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeCounts {
    pub single_choice: usize,
    pub multiple_choice: usize,
    pub true_false: usize,
}

impl TypeCounts {
    #[must_use]
    pub fn from_questions<'a>(questions: impl IntoIterator<Item = &'a Question>) -> Self {
        let mut counts = Self::default();
        for question in questions {
            counts.add(question.kind(), 1);
        }
        counts
    }

    #[must_use]
    pub fn get(&self, kind: QuestionType) -> usize {
        match kind {
            QuestionType::SingleChoice => self.single_choice,
            QuestionType::MultipleChoice => self.multiple_choice,
            QuestionType::TrueFalse => self.true_false,
        }
    }

    pub fn add(&mut self, kind: QuestionType, amount: usize) {
        let slot = match kind {
            QuestionType::SingleChoice => &mut self.single_choice,
            QuestionType::MultipleChoice => &mut self.multiple_choice,
            QuestionType::TrueFalse => &mut self.true_false,
        };
        *slot = slot.saturating_add(amount);
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.single_choice + self.multiple_choice + self.true_false
    }
}

/// Questions aggregated from one or more parsed documents, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_questions(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Append the questions of another document, keeping their order.
    pub fn extend(&mut self, questions: impl IntoIterator<Item = Question>) {
        self.questions.extend(questions);
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn into_questions(self) -> Vec<Question> {
        self.questions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Questions of one type, in bank order.
    #[must_use]
    pub fn by_type(&self, kind: QuestionType) -> Vec<&Question> {
        self.questions.iter().filter(|q| q.kind() == kind).collect()
    }

    #[must_use]
    pub fn counts(&self) -> TypeCounts {
        TypeCounts::from_questions(&self.questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tf(text: &str) -> Question {
        Question::new(text, Vec::new(), "T", QuestionType::TrueFalse).unwrap()
    }

    fn single(text: &str) -> Question {
        Question::new(
            text,
            vec!["A. x".into(), "B. y".into()],
            "A",
            QuestionType::SingleChoice,
        )
        .unwrap()
    }

    #[test]
    fn counts_by_type() {
        let mut bank = QuestionBank::new();
        bank.extend([tf("one"), single("two")]);
        bank.extend([tf("three")]);

        let counts = bank.counts();
        assert_eq!(counts.true_false, 2);
        assert_eq!(counts.single_choice, 1);
        assert_eq!(counts.multiple_choice, 0);
        assert_eq!(counts.total(), 3);
        assert_eq!(counts.get(QuestionType::TrueFalse), 2);
    }

    #[test]
    fn by_type_keeps_order() {
        let bank = QuestionBank::from_questions(vec![tf("one"), single("two"), tf("three")]);
        let texts: Vec<_> = bank
            .by_type(QuestionType::TrueFalse)
            .into_iter()
            .map(Question::text)
            .collect();
        assert_eq!(texts, vec!["one", "three"]);
    }
}
