use quiz_core::model::MasteryBook;

use super::mapping::MasteryFile;
use super::{JsonRepository, read_json, write_json};
use crate::repository::{MasteryRepository, StorageError};

impl MasteryRepository for JsonRepository {
    fn load_book(&self) -> Result<Option<MasteryBook>, StorageError> {
        read_json::<MasteryFile>(&self.mastery_path())?
            .map(MasteryFile::into_book)
            .transpose()
    }

    fn save_book(&self, book: &MasteryBook) -> Result<(), StorageError> {
        write_json(&self.mastery_path(), &MasteryFile::from_book(book)?)
    }
}
