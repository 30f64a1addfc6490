use chrono::Duration;
use quiz_core::time::format_hms;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub correct: usize,
    /// Zero-based index of the question on screen.
    pub current: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.answered)
    }
}

/// Closing numbers of a practice run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PracticeSummary {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    /// Rounded share of correct answers among answered questions.
    pub accuracy_percent: u32,
}

/// Outcome of `QuizSession::finish_exam`.
///
/// `score_percent` is measured against every question in the exam, so unanswered
/// questions count as wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamResult {
    pub total: usize,
    pub correct: usize,
    pub score_percent: u32,
    pub elapsed: Duration,
}

impl ExamResult {
    /// Elapsed time as `HH:MM:SS`.
    #[must_use]
    pub fn elapsed_hms(&self) -> String {
        format_hms(self.elapsed)
    }
}

/// `round(100 * part / whole)`, half rounding up; zero when `whole` is zero.
pub(crate) fn rounded_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let percent = (part.saturating_mul(200) + whole) / whole.saturating_mul(2);
    u32::try_from(percent).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(rounded_percent(0, 0), 0);
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(1, 8), 13);
        assert_eq!(rounded_percent(4, 4), 100);
    }

    #[test]
    fn exam_elapsed_is_formatted() {
        let result = ExamResult {
            total: 2,
            correct: 1,
            score_percent: 50,
            elapsed: Duration::seconds(3_725),
        };
        assert_eq!(result.elapsed_hms(), "01:02:05");
    }
}
