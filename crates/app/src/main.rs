mod cli;
mod config;
mod logging;
mod terminal;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use quiz_core::model::{QuestionBank, QuestionType};
use services::{AppServices, BankLoad, Clock, ExamTimer, QuizSession, SessionError};
use tokio::io::{BufReader, stdin};
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::terminal::Terminal;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // At this layer (binary glue), printing once is fine.
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(cli.log_level.as_deref());

    let data_dir = config::resolve_data_dir(cli.data_dir.clone());
    debug!(data_dir = %data_dir.display(), "opening data directory");
    let mut app = AppServices::open(&data_dir, Clock::default())?;

    match cli.command {
        Commands::List => list(&app, cli.dir),
        Commands::Mistakes => {
            print_mistakes(&app);
            Ok(())
        }
        Commands::Practice { files } => {
            let load = load_bank(&app, cli.dir, &files)?;
            let session = app.session_loop().start_practice(&load.bank)?;
            drive(&mut app, session, None).await
        }
        Commands::Exam(args) => {
            let load = load_bank(&app, cli.dir, &args.files)?;
            let requested = args.counts(app.preferences().exam_counts());
            let session = match app.session_loop().start_exam(&load.bank, &requested) {
                Err(SessionError::Empty) => {
                    println!("no questions selected; available: {}", describe_counts(&load.bank));
                    return Ok(());
                }
                other => other?,
            };
            drive(&mut app, session, Some(ExamTimer::start())).await
        }
        Commands::Review { threshold } => {
            let service = app.session_loop().clone();
            let session = match service.start_review(app.tracker_mut(), threshold) {
                Err(SessionError::Empty) => {
                    println!("the mistakes book is empty; nothing to review");
                    return Ok(());
                }
                other => other?,
            };
            drive(&mut app, session, None).await
        }
    }
}

async fn drive(app: &mut AppServices, session: QuizSession, timer: Option<ExamTimer>) -> Result<()> {
    let service = app.session_loop().clone();
    let mut terminal = Terminal::new(BufReader::new(stdin()), io::stdout());
    terminal
        .run(&service, app.tracker_mut(), session, timer)
        .await
}

fn load_bank(
    app: &AppServices,
    dir: Option<PathBuf>,
    files: &[PathBuf],
) -> Result<BankLoad> {
    let explicit = dir.is_some();
    let dir = match config::resolve_quiz_dir(dir, app.preferences()) {
        Ok(dir) => Some(dir),
        Err(err) if explicit || files.is_empty() => return Err(err),
        Err(_) => None,
    };
    let paths = config::resolve_documents(dir.as_deref(), files, |dir| {
        Ok(app.bank_loader().list_documents(dir)?)
    })?;

    let load = app.bank_loader().load(&paths);
    for failure in &load.failures {
        eprintln!("warning: skipped {}: {}", failure.path.display(), failure.error);
    }
    if load.discarded_incomplete + load.rejected > 0 {
        eprintln!(
            "warning: dropped {} incomplete and {} malformed questions",
            load.discarded_incomplete, load.rejected
        );
    }
    Ok(load)
}

fn list(app: &AppServices, dir: Option<PathBuf>) -> Result<()> {
    let dir = config::resolve_quiz_dir(dir, app.preferences())?;
    let summary = app
        .bank_loader()
        .summarize_documents(&dir)
        .with_context(|| format!("cannot list {}", dir.display()))?;

    let mut out = io::stdout().lock();
    writeln!(out, "{}", dir.display())?;
    for doc in &summary.documents {
        let name = doc
            .path
            .file_name()
            .map_or_else(|| doc.path.display().to_string(), |n| n.to_string_lossy().into_owned());
        writeln!(
            out,
            "  {name}: {} single, {} multiple, {} true/false",
            doc.counts.single_choice, doc.counts.multiple_choice, doc.counts.true_false
        )?;
    }
    for failure in &summary.failures {
        writeln!(out, "  {} (unreadable: {})", failure.path.display(), failure.error)?;
    }
    let totals = summary.totals();
    writeln!(out, "total: {} questions", totals.total())?;
    Ok(())
}

fn print_mistakes(app: &AppServices) {
    let tracker = app.tracker();
    println!(
        "{} mistakes, retired after {} correct answers in a row",
        tracker.len(),
        tracker.threshold()
    );
    let counts = tracker.counts_by_type();
    for kind in QuestionType::ALL {
        println!("  {}: {}", kind.label(), counts.get(kind));
    }
}

fn describe_counts(bank: &QuestionBank) -> String {
    let counts = bank.counts();
    format!(
        "{} single, {} multiple, {} true/false",
        counts.single_choice, counts.multiple_choice, counts.true_false
    )
}
