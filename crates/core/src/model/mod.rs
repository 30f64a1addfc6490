mod bank;
mod ids;
mod mastery;
mod question;

pub use bank::{QuestionBank, TypeCounts};
pub use ids::Fingerprint;
pub use mastery::{DEFAULT_THRESHOLD, MasteryBook, MasteryChange, MasteryEntry, MasteryError};
pub use question::{
    Question, QuestionError, QuestionType, boolean_value, boolean_word, canonical_letters,
    ends_with_boolean_word, option_body, option_label,
};
