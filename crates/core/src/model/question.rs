use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

use crate::model::ids::Fingerprint;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Invariant violations detected while building a `Question`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text is empty")]
    EmptyText,

    #[error("answer is empty")]
    EmptyAnswer,

    #[error("option {index} has no letter label")]
    UnlabeledOption { index: usize },

    #[error("true/false question must have zero or two options, got {0}")]
    BooleanOptionCount(usize),

    #[error("true/false options must end with a true/false word")]
    BooleanOptionsUnlabeled,

    #[error("true/false answer must be T, F, a true/false word or option letter, got {0:?}")]
    InvalidBooleanAnswer(String),

    #[error("answer letter {letter} has no matching option")]
    UnknownOption { letter: char },

    #[error("single choice answer must be exactly one letter, got {0:?}")]
    NotSingleLetter(String),

    #[error("multiple choice answer needs at least two distinct letters, got {0:?}")]
    TooFewAnswers(String),
}

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

/// The three kinds of question a quiz document can contain.
///
/// Serialized with the labels used inside the documents themselves, so store files stay
/// readable by older versions of the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "单选题", alias = "single_choice")]
    SingleChoice,
    #[serde(rename = "多选题", alias = "multiple_choice")]
    MultipleChoice,
    #[serde(rename = "判断题", alias = "true_false")]
    TrueFalse,
}

impl QuestionType {
    /// Fixed order used for exam sampling and count displays.
    pub const ALL: [QuestionType; 3] = [
        QuestionType::SingleChoice,
        QuestionType::MultipleChoice,
        QuestionType::TrueFalse,
    ];

    /// Label used in quiz documents and persisted files.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "单选题",
            QuestionType::MultipleChoice => "多选题",
            QuestionType::TrueFalse => "判断题",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuestionType::SingleChoice => "single choice",
            QuestionType::MultipleChoice => "multiple choice",
            QuestionType::TrueFalse => "true/false",
        };
        f.write_str(name)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A validated quiz question.
///
/// Options keep their leading letter label (`"A. Apple"`). The answer is canonical: one
/// letter for single choice, sorted distinct letters for multiple choice, `T` or `F` for
/// true/false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "QuestionRecord", into = "QuestionRecord")]
pub struct Question {
    text: String,
    options: Vec<String>,
    answer: String,
    kind: QuestionType,
}

/// Serialized shape of a question snapshot.
#[derive(Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(rename = "question")]
    text: String,
    #[serde(default)]
    options: Vec<String>,
    answer: String,
    #[serde(rename = "type")]
    kind: QuestionType,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        Question::new(record.text, record.options, &record.answer, record.kind)
    }
}

impl From<Question> for QuestionRecord {
    fn from(question: Question) -> Self {
        Self {
            text: question.text,
            options: question.options,
            answer: question.answer,
            kind: question.kind,
        }
    }
}

impl Question {
    /// Build a question, canonicalizing the answer and checking the invariants for `kind`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` when the text or answer is empty, an option has no letter
    /// label, or the answer does not fit the question type and its options.
    pub fn new(
        text: impl Into<String>,
        options: Vec<String>,
        answer: &str,
        kind: QuestionType,
    ) -> Result<Self, QuestionError> {
        let text = text.into().trim().to_owned();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }

        let options: Vec<String> = options.into_iter().map(|o| o.trim().to_owned()).collect();
        if let Some(index) = options.iter().position(|o| option_label(o).is_none()) {
            return Err(QuestionError::UnlabeledOption { index });
        }

        let raw = answer.trim();
        if raw.is_empty() {
            return Err(QuestionError::EmptyAnswer);
        }

        let answer = match kind {
            QuestionType::TrueFalse => {
                if !(options.is_empty() || options.len() == 2) {
                    return Err(QuestionError::BooleanOptionCount(options.len()));
                }
                if options.iter().any(|o| ends_with_boolean_word(o).is_none()) {
                    return Err(QuestionError::BooleanOptionsUnlabeled);
                }
                match boolean_value(&options, raw) {
                    Some(true) => "T".to_owned(),
                    Some(false) => "F".to_owned(),
                    None => return Err(QuestionError::InvalidBooleanAnswer(raw.to_owned())),
                }
            }
            QuestionType::SingleChoice | QuestionType::MultipleChoice => {
                let letters = canonical_letters(raw);
                if letters.is_empty() {
                    return Err(QuestionError::EmptyAnswer);
                }
                if let Some(letter) = letters
                    .chars()
                    .find(|l| !options.iter().any(|o| option_label(o) == Some(*l)))
                {
                    return Err(QuestionError::UnknownOption { letter });
                }
                let count = letters.chars().count();
                if kind == QuestionType::SingleChoice && count != 1 {
                    return Err(QuestionError::NotSingleLetter(letters));
                }
                if kind == QuestionType::MultipleChoice && count < 2 {
                    return Err(QuestionError::TooFewAnswers(letters));
                }
                letters
            }
        };

        Ok(Self {
            text,
            options,
            answer,
            kind,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Canonical answer token.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn kind(&self) -> QuestionType {
        self.kind
    }

    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(&self.text, &self.options)
    }

    /// Returns the option carrying `letter` as its label.
    #[must_use]
    pub fn option_for(&self, letter: char) -> Option<&str> {
        let letter = letter.to_ascii_uppercase();
        self.options
            .iter()
            .find(|o| option_label(o) == Some(letter))
            .map(String::as_str)
    }

    /// Canonicalize an operator response into the same form as `answer()`.
    ///
    /// Letters are upper-cased, sorted and deduplicated; true/false questions accept
    /// `T`/`F`, the true/false words, and the letter of a true/false option. Returns `None` when nothing was selected.
    #[must_use]
    pub fn normalize_response(&self, raw: &str) -> Option<String> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match self.kind {
            QuestionType::TrueFalse => match boolean_value(&self.options, raw) {
                Some(true) => Some("T".to_owned()),
                Some(false) => Some("F".to_owned()),
                None => Some(raw.to_uppercase()),
            },
            QuestionType::SingleChoice | QuestionType::MultipleChoice => {
                let letters = canonical_letters(raw);
                (!letters.is_empty()).then_some(letters)
            }
        }
    }

    /// Case-insensitive comparison of a canonical response against the answer.
    #[must_use]
    pub fn is_correct_response(&self, response: &str) -> bool {
        response.eq_ignore_ascii_case(&self.answer)
    }

    /// Human-readable lines for a canonical response, one option per line.
    #[must_use]
    pub fn describe_response(&self, response: &str) -> String {
        if self.kind == QuestionType::TrueFalse {
            return match response {
                "T" => "True".to_owned(),
                "F" => "False".to_owned(),
                other => other.to_owned(),
            };
        }
        response
            .chars()
            .map(|letter| match self.option_for(letter) {
                Some(option) => format!("{letter}. {}", option_body(option)),
                None => letter.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

//
// ─── HELPERS ───────────────────────────────────────────────────────────────────
//

/// Leading uppercase letter label of an option line.
#[must_use]
pub fn option_label(option: &str) -> Option<char> {
    option
        .trim_start()
        .chars()
        .next()
        .filter(char::is_ascii_uppercase)
}

/// Option text without its letter label and separator.
#[must_use]
pub fn option_body(option: &str) -> &str {
    let trimmed = option.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(c) if c.is_ascii_uppercase() => chars
            .as_str()
            .trim_start_matches(['.', '、', '．', ':', '：', ' ', '\t'])
            .trim(),
        _ => trimmed,
    }
}

/// Sorted, deduplicated, upper-cased ASCII letters contained in `raw`.
#[must_use]
pub fn canonical_letters(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Maps the words for "correct" / "incorrect" to a boolean.
///
/// Bare `T` / `F` are deliberately not words: `F` is also an option letter.
#[must_use]
pub fn boolean_word(raw: &str) -> Option<bool> {
    match raw.trim().to_uppercase().as_str() {
        "对" | "正确" | "TRUE" | "√" => Some(true),
        "错" | "错误" | "FALSE" | "×" => Some(false),
        _ => None,
    }
}

const BOOLEAN_SUFFIXES: [(&str, bool); 8] = [
    ("错误", false),
    ("正确", true),
    ("FALSE", false),
    ("TRUE", true),
    ("对", true),
    ("错", false),
    ("√", true),
    ("×", false),
];

/// Boolean value of the true/false word an option line ends with, if any.
#[must_use]
pub fn ends_with_boolean_word(option: &str) -> Option<bool> {
    let upper = option.trim().to_uppercase();
    BOOLEAN_SUFFIXES
        .iter()
        .find(|(word, _)| upper.ends_with(word))
        .map(|(_, value)| *value)
}

/// Value of a true/false answer token.
///
/// Accepts `T` / `F`, a true/false word, or the letter of an option in `options` that ends
/// with a true/false word.
#[must_use]
pub fn boolean_value(options: &[String], raw: &str) -> Option<bool> {
    let upper = raw.trim().to_uppercase();
    match upper.as_str() {
        "T" => return Some(true),
        "F" => return Some(false),
        _ => {}
    }
    let mut chars = upper.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        let by_letter = options
            .iter()
            .find(|o| option_label(o) == Some(letter))
            .and_then(|o| ends_with_boolean_word(o));
        if by_letter.is_some() {
            return by_letter;
        }
    }
    boolean_word(&upper)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn multiple_choice_answer_is_canonicalized() {
        let q = Question::new(
            "Which are fruits?",
            opts(&["A. Apple", "B. Car", "C. Banana"]),
            "c, a",
            QuestionType::MultipleChoice,
        )
        .unwrap();
        assert_eq!(q.answer(), "AC");
    }

    #[test]
    fn rejects_answer_letter_without_option() {
        let err = Question::new(
            "Pick one",
            opts(&["A. x", "B. y"]),
            "D",
            QuestionType::SingleChoice,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::UnknownOption { letter: 'D' });
    }

    #[test]
    fn multiple_choice_needs_two_letters() {
        let err = Question::new(
            "Pick many",
            opts(&["A. x", "B. y"]),
            "A",
            QuestionType::MultipleChoice,
        )
        .unwrap_err();
        assert!(matches!(err, QuestionError::TooFewAnswers(_)));
    }

    #[test]
    fn true_false_accepts_two_boolean_options() {
        let q = Question::new(
            "Water is wet.",
            opts(&["A. 对", "B. 错"]),
            "t",
            QuestionType::TrueFalse,
        )
        .unwrap();
        assert_eq!(q.answer(), "T");

        let err = Question::new(
            "Water is wet.",
            opts(&["A. yes", "B. no"]),
            "T",
            QuestionType::TrueFalse,
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::BooleanOptionsUnlabeled);
    }

    #[test]
    fn normalizes_responses_per_type() {
        let mc = Question::new(
            "Which are fruits?",
            opts(&["A. Apple", "B. Car", "C. Banana"]),
            "AC",
            QuestionType::MultipleChoice,
        )
        .unwrap();
        assert_eq!(mc.normalize_response("c,a").as_deref(), Some("AC"));
        assert_eq!(mc.normalize_response("  "), None);

        let tf = Question::new("Sky is blue.", Vec::new(), "T", QuestionType::TrueFalse).unwrap();
        assert_eq!(tf.normalize_response("对").as_deref(), Some("T"));
        assert_eq!(tf.normalize_response("false").as_deref(), Some("F"));
    }

    #[test]
    fn boolean_answer_accepts_words_and_option_letters() {
        let word = Question::new("Sky is blue.", Vec::new(), "对", QuestionType::TrueFalse).unwrap();
        assert_eq!(word.answer(), "T");

        let lettered = Question::new(
            "Fire is cold.",
            opts(&["A. 对", "B. 错"]),
            "B",
            QuestionType::TrueFalse,
        )
        .unwrap();
        assert_eq!(lettered.answer(), "F");
        assert_eq!(lettered.normalize_response("b").as_deref(), Some("F"));
        assert_eq!(lettered.normalize_response("A").as_deref(), Some("T"));
        assert!(lettered.is_correct_response("F"));

        let err = Question::new("Sky is blue.", Vec::new(), "maybe", QuestionType::TrueFalse)
            .unwrap_err();
        assert!(matches!(err, QuestionError::InvalidBooleanAnswer(_)));
    }

    #[test]
    fn describes_selected_options() {
        let q = Question::new(
            "Which are fruits?",
            opts(&["A. Apple", "B. Car", "C、Banana"]),
            "AC",
            QuestionType::MultipleChoice,
        )
        .unwrap();
        assert_eq!(q.describe_response("AC"), "A. Apple\nC. Banana");
    }

    #[test]
    fn fingerprint_ignores_option_order_and_labels() {
        let a = Question::new(
            "Pick the car",
            opts(&["A. Apple", "B. Car"]),
            "B",
            QuestionType::SingleChoice,
        )
        .unwrap();
        let b = Question::new(
            "Pick the car",
            opts(&["A. Car", "B. Apple"]),
            "A",
            QuestionType::SingleChoice,
        )
        .unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn snapshot_uses_document_labels() {
        let q = Question::new("Sky is blue.", Vec::new(), "T", QuestionType::TrueFalse).unwrap();
        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["question"], "Sky is blue.");
        assert_eq!(json["type"], "判断题");

        let back: Question = serde_json::from_value(json).unwrap();
        assert_eq!(back, q);
    }

    #[test]
    fn invalid_snapshot_is_rejected_on_read() {
        let json = serde_json::json!({
            "question": "Pick",
            "options": ["A. x"],
            "answer": "Z",
            "type": "single_choice"
        });
        assert!(serde_json::from_value::<Question>(json).is_err());
    }
}
