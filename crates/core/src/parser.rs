//! Single-pass parser turning document paragraphs into `Question` records.
//!
//! A document looks like:
//!
//! ```text
//! 1. Which are fruits?
//! A. Apple
//! B. Car
//! C. Banana
//! 答案：AC
//! ```
//!
//! A numbered line opens a question, lettered lines (`A`–`H`) add options, and an answer
//! line closes it. Questions that never see an answer line are dropped and counted.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::model::{
    Question, QuestionError, QuestionType, boolean_word, ends_with_boolean_word,
};

static QUESTION_START: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[0-9]+|[一二三四五六七八九十百零]+)[.、]\s*").expect("valid question pattern")
});

static OPTION_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-H][.、．\s]").expect("valid option pattern"));

const ANSWER_LABELS: [&str; 8] = [
    "答案:",
    "答案：",
    "answer:",
    "answer：",
    "正确答案:",
    "正确答案：",
    "correct answer:",
    "correct answer：",
];

const MULTIPLE_CHOICE_MARKERS: [&str; 4] = ["多选题", "(多选)", "（多选）", "(multiple choice)"];

const TERMINAL_PUNCTUATION: [char; 8] = ['?', '？', '.', '。', '!', '！', ')', '）'];

/// One paragraph as produced by a paragraph source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub text: String,
    pub is_emphasized: bool,
}

impl Paragraph {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_emphasized: false,
        }
    }

    #[must_use]
    pub fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_emphasized: true,
        }
    }
}

impl From<&str> for Paragraph {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Paragraph {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// A question that reached its answer line but failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedQuestion {
    pub text: String,
    pub reason: QuestionError,
}

/// Outcome of parsing one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub questions: Vec<Question>,
    /// Questions dropped because no answer line followed them.
    pub discarded_incomplete: usize,
    pub rejected: Vec<RejectedQuestion>,
    /// Non-blank lines that were neither question, option nor answer lines.
    pub ignored_lines: usize,
}

#[derive(Debug)]
struct PendingQuestion {
    text: String,
    options: Vec<String>,
}

/// Incremental parser state. Feed paragraphs in order, then call `finish`.
#[derive(Debug, Default)]
pub struct DocumentParser {
    pending: Option<PendingQuestion>,
    report: ParseReport,
}

impl DocumentParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, paragraph: &Paragraph) {
        let text = paragraph.text.trim();
        if text.is_empty() {
            return;
        }

        if let Some(token) = answer_token(text) {
            self.close(&token);
            return;
        }

        if let Some(found) = QUESTION_START.find(text) {
            self.discard_pending();
            self.pending = Some(PendingQuestion {
                text: normalize_question_text(&text[found.end()..]),
                options: Vec::new(),
            });
            return;
        }

        if OPTION_LINE.is_match(text) {
            if let Some(pending) = self.pending.as_mut() {
                pending.options.push(text.to_owned());
                return;
            }
        }

        self.report.ignored_lines += 1;
    }

    /// Drop any unanswered trailing question and return the report.
    #[must_use]
    pub fn finish(mut self) -> ParseReport {
        self.discard_pending();
        self.report
    }

    fn discard_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(question = %pending.text, "discarding question without answer line");
            self.report.discarded_incomplete += 1;
        }
    }

    fn close(&mut self, token: &str) {
        let Some(pending) = self.pending.take() else {
            debug!(answer = token, "answer line without an open question");
            self.report.ignored_lines += 1;
            return;
        };

        let kind = infer_type(&pending.text, &pending.options, token);
        match Question::new(pending.text.clone(), pending.options, token, kind) {
            Ok(question) => self.report.questions.push(question),
            Err(reason) => {
                debug!(question = %pending.text, %reason, "rejecting malformed question");
                self.report.rejected.push(RejectedQuestion {
                    text: pending.text,
                    reason,
                });
            }
        }
    }
}

/// Parse a full paragraph sequence.
pub fn parse<I>(paragraphs: I) -> ParseReport
where
    I: IntoIterator,
    I::Item: Into<Paragraph>,
{
    let mut parser = DocumentParser::new();
    for paragraph in paragraphs {
        parser.feed(&paragraph.into());
    }
    parser.finish()
}

/// Parse and keep only the finished questions.
pub fn parse_questions<I>(paragraphs: I) -> Vec<Question>
where
    I: IntoIterator,
    I::Item: Into<Paragraph>,
{
    parse(paragraphs).questions
}

/// Normalized answer token if `text` is an answer line.
fn answer_token(text: &str) -> Option<String> {
    let lower = text.to_lowercase();
    if !ANSWER_LABELS.iter().any(|label| lower.starts_with(label)) {
        return None;
    }

    let raw = text.rsplit([':', '：']).next().unwrap_or_default();
    let token = raw.trim().replace('，', ",").to_uppercase();
    let token = match boolean_word(&token) {
        Some(true) => "T".to_owned(),
        Some(false) => "F".to_owned(),
        None => token,
    };
    Some(token)
}

fn infer_type(text: &str, options: &[String], token: &str) -> QuestionType {
    if options.is_empty() {
        return QuestionType::TrueFalse;
    }
    if options.len() == 2 && options.iter().all(|o| ends_with_boolean_word(o).is_some()) {
        return QuestionType::TrueFalse;
    }

    let lower = text.to_lowercase();
    if MULTIPLE_CHOICE_MARKERS.iter().any(|m| lower.contains(m)) {
        return QuestionType::MultipleChoice;
    }

    let has_separator = token.contains([',', '、', ';', '；', ' ']);
    if has_separator || token.chars().count() > 1 {
        return QuestionType::MultipleChoice;
    }

    QuestionType::SingleChoice
}

fn normalize_question_text(stem: &str) -> String {
    let trimmed = stem.trim();
    if trimmed.is_empty() || trimmed.ends_with(TERMINAL_PUNCTUATION) {
        trimmed.to_owned()
    } else {
        format!("{trimmed}.")
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
