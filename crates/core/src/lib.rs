#![forbid(unsafe_code)]

pub mod model;
pub mod parser;
pub mod time;

pub use model::{
    Fingerprint, MasteryBook, MasteryChange, MasteryEntry, MasteryError, Question, QuestionBank,
    QuestionError, QuestionType, TypeCounts,
};
pub use parser::{DocumentParser, Paragraph, ParseReport, parse, parse_questions};
pub use time::Clock;
