use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use quiz_core::model::{Question, QuestionType};
use quiz_core::time::format_hms;
use services::{
    ExamResult, ExamTimer, MasteryTracker, QuizSession, SessionError, SessionLoopService,
    SessionMode, SessionState,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// Pause before a correct answer moves on by itself.
pub const AUTO_ADVANCE: Duration = Duration::from_secs(1);

//
// ─── INPUT ─────────────────────────────────────────────────────────────────────
//

/// One line typed during a session. Commands start with `:` so they never collide with
/// option letters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Answer(String),
    Next,
    Previous,
    /// Zero-based target of `:g <k>`.
    Goto(usize),
    List,
    Finish,
    Quit,
    Help,
    Empty,
    Invalid(String),
}

impl Input {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix(':') else {
            return Self::Answer(line.to_owned());
        };
        let mut words = command.split_whitespace();
        match (words.next(), words.next(), words.next()) {
            (Some("n"), None, None) => Self::Next,
            (Some("p"), None, None) => Self::Previous,
            (Some("l"), None, None) => Self::List,
            (Some("f"), None, None) => Self::Finish,
            (Some("q"), None, None) => Self::Quit,
            (Some("h" | "?"), None, None) => Self::Help,
            (Some("g"), Some(k), None) => match k.parse::<usize>() {
                Ok(k) if k >= 1 => Self::Goto(k - 1),
                _ => Self::Invalid(line.to_owned()),
            },
            _ => Self::Invalid(line.to_owned()),
        }
    }
}

const HELP: &str = "\
answer with option letters (A, AC, a,c) or T/F (对/错)
  :n  next question      :p  previous question
  :g <k>  go to question k   :l  list answered questions
  :f  finish exam        :q  leave session";

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

/// Drives one session over a line-based input and a writer.
pub struct Terminal<R, W> {
    lines: Lines<R>,
    out: W,
    auto_advance: Duration,
}

impl<R, W> Terminal<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(input: R, out: W) -> Self {
        Self {
            lines: input.lines(),
            out,
            auto_advance: AUTO_ADVANCE,
        }
    }

    #[must_use]
    pub fn with_auto_advance(mut self, delay: Duration) -> Self {
        self.auto_advance = delay;
        self
    }

    /// Run `session` until it completes or the operator leaves.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub async fn run(
        &mut self,
        service: &SessionLoopService,
        tracker: &mut MasteryTracker,
        mut session: QuizSession,
        timer: Option<ExamTimer>,
    ) -> Result<()> {
        writeln!(
            self.out,
            "{} session: {} questions (:h for help)",
            session.mode(),
            session.total()
        )?;

        loop {
            if session.is_complete() {
                self.print_completion(service, &mut session)?;
                break;
            }
            self.print_question(&session, timer.as_ref())?;
            write!(self.out, "> ")?;
            self.out.flush()?;

            let Some(line) = self.lines.next_line().await? else {
                writeln!(self.out)?;
                break;
            };

            match Input::parse(&line) {
                Input::Empty => {}
                Input::Help => writeln!(self.out, "{HELP}")?,
                Input::Invalid(raw) => writeln!(self.out, "unknown command {raw}; :h for help")?,
                Input::Quit => {
                    writeln!(self.out, "leaving session")?;
                    break;
                }
                Input::Answer(text) => self.answer(service, tracker, &mut session, &text).await?,
                Input::Next => self.next(service, &mut session)?,
                Input::Previous => {
                    let index = session.current_index();
                    if index == 0 {
                        writeln!(self.out, "already at the first question")?;
                    } else {
                        self.report(session.jump_to(index - 1))?;
                    }
                }
                Input::Goto(index) => self.report(session.jump_to(index))?,
                Input::List => self.print_status(&session)?,
                Input::Finish => match service.finish_exam(&mut session) {
                    Ok(result) => {
                        self.print_exam_result(&result)?;
                        break;
                    }
                    Err(err) => writeln!(self.out, "{err}")?,
                },
            }
        }

        if let Some(timer) = timer {
            timer.stop();
        }
        Ok(())
    }

    async fn answer(
        &mut self,
        service: &SessionLoopService,
        tracker: &mut MasteryTracker,
        session: &mut QuizSession,
        text: &str,
    ) -> Result<()> {
        let answer = match service.submit(session, tracker, text) {
            Ok(answer) => answer,
            Err(err) => {
                writeln!(self.out, "{err}")?;
                return Ok(());
            }
        };
        writeln!(self.out, "{}", answer.outcome.feedback)?;
        if answer.mastery.is_some_and(|mastery| !mastery.persisted) {
            writeln!(
                self.out,
                "warning: could not save the mistakes book; changes are kept for this run"
            )?;
        }

        if answer.outcome.is_correct {
            self.out.flush()?;
            tokio::time::sleep(self.auto_advance).await;
            if session.mode() == SessionMode::Exam && answer.outcome.is_last {
                writeln!(self.out, "last question answered; :f to finish")?;
            } else {
                service.advance(session)?;
            }
        } else {
            writeln!(self.out, "(:n to continue)")?;
        }
        Ok(())
    }

    fn next(&mut self, service: &SessionLoopService, session: &mut QuizSession) -> Result<()> {
        match session.state() {
            SessionState::Answered { .. } => {
                if session.mode() == SessionMode::Exam
                    && session.current_index() + 1 == session.total()
                {
                    writeln!(self.out, "this is the last question; :f to finish")?;
                } else {
                    service.advance(session)?;
                }
            }
            SessionState::AwaitingAnswer { index } if index + 1 < session.total() => {
                self.report(session.jump_to(index + 1))?;
            }
            SessionState::AwaitingAnswer { .. } => {
                writeln!(self.out, "this is the last question; answer it first")?;
            }
            SessionState::Complete => {}
        }
        Ok(())
    }

    fn report(&mut self, outcome: Result<SessionState, SessionError>) -> Result<()> {
        if let Err(err) = outcome {
            writeln!(self.out, "{err}")?;
        }
        Ok(())
    }

    fn print_question(&mut self, session: &QuizSession, timer: Option<&ExamTimer>) -> Result<()> {
        let Some(question) = session.current_question() else {
            return Ok(());
        };
        let index = session.current_index();
        write!(
            self.out,
            "\n[{}/{}] {}",
            index + 1,
            session.total(),
            question.kind().label()
        )?;
        if let Some(timer) = timer {
            let elapsed = chrono::Duration::from_std(timer.elapsed())
                .unwrap_or_else(|_| chrono::Duration::zero());
            write!(self.out, "  ⏱ {}", format_hms(elapsed))?;
        }
        writeln!(self.out)?;
        write_question(&mut self.out, question)?;

        if let Some(record) = session.record(index) {
            writeln!(self.out, "{}", record.feedback)?;
        }
        Ok(())
    }

    fn print_status(&mut self, session: &QuizSession) -> Result<()> {
        let cells: Vec<String> = session
            .question_status()
            .into_iter()
            .enumerate()
            .map(|(index, status)| {
                let mark = match status {
                    Some(true) => "✓",
                    Some(false) => "✗",
                    None => "·",
                };
                if index == session.current_index() {
                    format!("[{}{mark}]", index + 1)
                } else {
                    format!("{}{mark}", index + 1)
                }
            })
            .collect();
        writeln!(self.out, "{}", cells.join(" "))?;
        Ok(())
    }

    fn print_completion(
        &mut self,
        service: &SessionLoopService,
        session: &mut QuizSession,
    ) -> Result<()> {
        match session.mode() {
            SessionMode::Practice => {
                let summary = session.practice_summary();
                writeln!(
                    self.out,
                    "practice complete: {}/{} correct, {} wrong, accuracy {}%",
                    summary.correct,
                    summary.total,
                    summary.incorrect,
                    summary.accuracy_percent
                )?;
            }
            SessionMode::Exam => {
                let result = match session.exam_result() {
                    Some(result) => *result,
                    None => service.finish_exam(session)?,
                };
                self.print_exam_result(&result)?;
            }
            SessionMode::Review => {
                let progress = session.progress();
                writeln!(
                    self.out,
                    "review complete: {}/{} correct",
                    progress.correct, progress.total
                )?;
            }
        }
        Ok(())
    }

    fn print_exam_result(&mut self, result: &ExamResult) -> Result<()> {
        writeln!(
            self.out,
            "exam finished: {}/{} correct, score {}%, time {}",
            result.correct,
            result.total,
            result.score_percent,
            result.elapsed_hms()
        )?;
        Ok(())
    }
}

/// Question text followed by its options, or the true/false hint.
pub fn write_question(out: &mut impl Write, question: &Question) -> std::io::Result<()> {
    writeln!(out, "{}", question.text())?;
    if question.kind() == QuestionType::TrueFalse && question.options().is_empty() {
        writeln!(out, "  T. True\n  F. False")?;
    } else {
        for option in question.options() {
            writeln!(out, "  {option}")?;
        }
    }
    Ok(())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
