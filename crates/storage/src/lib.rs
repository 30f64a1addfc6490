#![forbid(unsafe_code)]

pub mod json;
pub mod repository;
pub mod source;

pub use json::JsonRepository;
pub use repository::{
    InMemoryRepository, MasteryRepository, PreferencesRepository, Storage, StorageError,
};
pub use source::{DocumentReadError, ParagraphSource, PlainTextSource, StaticSource, list_documents};
