use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use quiz_core::model::{MasteryChange, QuestionType, TypeCounts};
use quiz_core::time::fixed_now;
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{AppServices, BankLoader, Clock, SessionLoopService, SessionState};
use storage::repository::{InMemoryRepository, Storage};
use storage::source::StaticSource;

const FRUITS: [&str; 5] = [
    "1. Which are fruits?",
    "A. Apple",
    "B. Car",
    "C. Banana",
    "答案:AC",
];

fn in_memory_services(repo: &InMemoryRepository, clock: Clock) -> AppServices {
    let storage = Storage {
        mastery: Arc::new(repo.clone()),
        preferences: Arc::new(repo.clone()),
    };
    let source = StaticSource::new()
        .with_document("fruits", FRUITS)
        .with_document(
            "mixed",
            [
                "1. Pick one.",
                "A. x",
                "B. y",
                "答案：B",
                "2. 以下哪些是颜色（多选）",
                "A. 红",
                "B. 蓝",
                "C. 桌子",
                "答案：A，B",
                "3. Which are animals?",
                "A. Cat",
                "B. Rock",
                "C. Dog",
                "答案:AC",
                "4. The sky is blue.",
                "答案：对",
            ],
        );
    AppServices::with_storage(storage, Arc::new(source), clock)
}

#[test]
fn practice_miss_then_two_hits_retires_the_mistake() {
    let repo = InMemoryRepository::new();
    let mut app = in_memory_services(&repo, Clock::fixed(fixed_now()));
    let load = app.bank_loader().load(&[PathBuf::from("fruits")]);
    assert_eq!(load.bank.len(), 1);
    let question = load.bank.questions()[0].clone();
    let service = app.session_loop().clone();

    let mut first = service.start_practice(&load.bank).unwrap();
    let answer = service.submit(&mut first, app.tracker_mut(), "AB").unwrap();
    assert!(!answer.outcome.is_correct);
    assert_eq!(answer.mastery.unwrap().change, MasteryChange::Added);
    assert_eq!(service.advance(&mut first).unwrap(), SessionState::Complete);

    let mut second = service.start_practice(&load.bank).unwrap();
    service.submit(&mut second, app.tracker_mut(), "ca").unwrap();
    let entry = app.tracker().book().get(&question).unwrap();
    assert_eq!(entry.consecutive_correct(), 1);

    let mut third = service.start_practice(&load.bank).unwrap();
    let answer = service.submit(&mut third, app.tracker_mut(), "A,C").unwrap();
    assert_eq!(answer.mastery.unwrap().change, MasteryChange::Retired);
    assert!(app.tracker().is_empty());
    assert!(repo.saved_book().unwrap().is_empty());
}

#[test]
fn exam_draws_requested_type_from_mixed_bank() {
    let repo = InMemoryRepository::new();
    let app = in_memory_services(&repo, Clock::fixed(fixed_now()));
    let load = app.bank_loader().load(&[PathBuf::from("mixed")]);
    assert_eq!(load.bank.counts().multiple_choice, 2);

    let requested = TypeCounts {
        multiple_choice: 1,
        ..TypeCounts::default()
    };
    let mut rng = StdRng::seed_from_u64(11);
    let session = app
        .session_loop()
        .start_exam_with_rng(&load.bank, &requested, &mut rng)
        .unwrap();

    assert_eq!(session.total(), 1);
    assert_eq!(session.questions()[0].kind(), QuestionType::MultipleChoice);
    assert!(load.bank.questions().contains(&session.questions()[0]));
}

#[test]
fn exam_finish_scores_against_all_questions() {
    let repo = InMemoryRepository::new();
    let mut clock = Clock::fixed(fixed_now());
    let mut app = in_memory_services(&repo, clock);
    let load = app.bank_loader().load(&[PathBuf::from("mixed")]);
    let requested = TypeCounts {
        single_choice: 1,
        multiple_choice: 2,
        true_false: 1,
    };

    let mut session = app
        .session_loop()
        .start_exam(&load.bank, &requested)
        .unwrap();
    assert_eq!(session.total(), 4);

    let service = app.session_loop().clone();
    service.submit(&mut session, app.tracker_mut(), "B").unwrap();
    session.jump_to(3).unwrap();
    service.submit(&mut session, app.tracker_mut(), "对").unwrap();
    assert!(app.tracker().is_empty());

    clock.advance(Duration::seconds(95));
    let service = SessionLoopService::new(clock, app.preferences().clone());
    let result = service.finish_exam(&mut session).unwrap();
    assert_eq!(result.correct, 2);
    assert_eq!(result.score_percent, 50);
    assert_eq!(result.elapsed_hms(), "00:01:35");
    assert!(session.is_complete());
}

#[test]
fn unwritable_store_keeps_mistakes_in_memory() {
    let repo = InMemoryRepository::new();
    repo.set_fail_writes(true);
    let mut app = in_memory_services(&repo, Clock::fixed(fixed_now()));
    let load = app.bank_loader().load(&[PathBuf::from("fruits")]);
    let service = app.session_loop().clone();

    let mut session = service.start_practice(&load.bank).unwrap();
    let answer = service.submit(&mut session, app.tracker_mut(), "B").unwrap();
    let mastery = answer.mastery.unwrap();
    assert_eq!(mastery.change, MasteryChange::Added);
    assert!(!mastery.persisted);
    assert_eq!(app.tracker().len(), 1);

    let review = service.start_review(app.tracker_mut(), None).unwrap();
    assert_eq!(review.total(), 1);
}

#[test]
fn mistakes_survive_restart_on_disk() {
    let data = tempfile::tempdir().unwrap();
    let docs = tempfile::tempdir().unwrap();
    let doc = docs.path().join("fruits.txt");
    fs::write(&doc, FRUITS.join("\n")).unwrap();

    {
        let mut app = AppServices::open(data.path(), Clock::fixed(fixed_now())).unwrap();
        let load = app.bank_loader().load(std::slice::from_ref(&doc));
        let service = app.session_loop().clone();
        let mut session = service.start_practice(&load.bank).unwrap();
        service.submit(&mut session, app.tracker_mut(), "C").unwrap();
    }

    let mut app = AppServices::open(data.path(), Clock::fixed(fixed_now())).unwrap();
    assert_eq!(app.tracker().counts_by_type().multiple_choice, 1);

    // reordered options in a second document hit the same entry
    let reordered = docs.path().join("reordered.txt");
    fs::write(
        &reordered,
        "1. Which are fruits?\nA. Banana\nB. Apple\nC. Car\n答案：AB\n",
    )
    .unwrap();
    let load = BankLoader::default().load(&[reordered]);
    let service = app.session_loop().clone();
    let mut session = service.start_practice(&load.bank).unwrap();
    let answer = service.submit(&mut session, app.tracker_mut(), "AB").unwrap();
    assert_eq!(
        answer.mastery.unwrap().change,
        MasteryChange::Progressed {
            consecutive_correct: 1
        }
    );
}
