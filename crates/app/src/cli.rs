use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quiz_core::model::TypeCounts;

#[derive(Parser, Debug)]
#[command(
    name = "quizdrill",
    version,
    about = "Practice, exam and mistake review over plain-text question banks"
)]
pub struct Cli {
    /// Folder with quiz documents; remembered for later runs.
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Where the mistakes book and preferences live; overrides QUIZDRILL_DATA_DIR.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log filter such as `debug` or `services=info`; overrides QUIZDRILL_LOG.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Lists documents in the folder with their question counts.
    List,
    /// Works through every question of the selected documents.
    Practice {
        /// Documents to load (names inside the folder or paths); all when omitted.
        files: Vec<PathBuf>,
    },
    /// Timed exam sampled per question type.
    Exam(ExamArgs),
    /// Drills the questions in the mistakes book.
    Review {
        /// Consecutive correct answers needed to retire a mistake.
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        threshold: Option<u32>,
    },
    /// Shows what the mistakes book currently holds.
    Mistakes,
}

#[derive(Args, Debug)]
pub struct ExamArgs {
    /// Documents to load (names inside the folder or paths); all when omitted.
    pub files: Vec<PathBuf>,

    /// Single-choice questions to draw.
    #[arg(long)]
    pub single: Option<usize>,

    /// Multiple-choice questions to draw.
    #[arg(long)]
    pub multiple: Option<usize>,

    /// True/false questions to draw.
    #[arg(long)]
    pub true_false: Option<usize>,
}

impl ExamArgs {
    /// Requested counts, filling omitted flags from `saved`.
    #[must_use]
    pub fn counts(&self, saved: TypeCounts) -> TypeCounts {
        TypeCounts {
            single_choice: self.single.unwrap_or(saved.single_choice),
            multiple_choice: self.multiple.unwrap_or(saved.multiple_choice),
            true_false: self.true_false.unwrap_or(saved.true_false),
        }
    }
}
