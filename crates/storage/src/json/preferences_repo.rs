use std::path::{Path, PathBuf};

use quiz_core::model::TypeCounts;

use super::mapping::{ExamConfigFile, QuizConfigFile};
use super::{JsonRepository, read_json, write_json};
use crate::repository::{PreferencesRepository, StorageError};

impl PreferencesRepository for JsonRepository {
    fn load_exam_counts(&self) -> Result<Option<TypeCounts>, StorageError> {
        Ok(read_json::<ExamConfigFile>(&self.exam_config_path())?.map(ExamConfigFile::into_counts))
    }

    fn save_exam_counts(&self, counts: &TypeCounts) -> Result<(), StorageError> {
        write_json(&self.exam_config_path(), &ExamConfigFile::from_counts(counts))
    }

    fn load_quiz_dir(&self) -> Result<Option<PathBuf>, StorageError> {
        Ok(read_json::<QuizConfigFile>(&self.quiz_config_path())?.map(|file| file.quiz_dir))
    }

    fn save_quiz_dir(&self, dir: &Path) -> Result<(), StorageError> {
        write_json(
            &self.quiz_config_path(),
            &QuizConfigFile {
                quiz_dir: dir.to_path_buf(),
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_counts_use_type_labels() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonRepository::new(dir.path());
        let counts = TypeCounts {
            single_choice: 5,
            multiple_choice: 2,
            true_false: 0,
        };
        repo.save_exam_counts(&counts).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(repo.exam_config_path()).unwrap()).unwrap();
        assert_eq!(raw["单选题"], 5);
        assert_eq!(raw["判断题"], 0);
        assert_eq!(repo.load_exam_counts().unwrap(), Some(counts));
    }

    #[test]
    fn quiz_dir_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonRepository::new(dir.path().join("nested"));
        assert_eq!(repo.load_quiz_dir().unwrap(), None);

        repo.save_quiz_dir(Path::new("/tmp/quizzes")).unwrap();
        assert_eq!(
            repo.load_quiz_dir().unwrap(),
            Some(PathBuf::from("/tmp/quizzes"))
        );
    }
}
