use std::sync::Arc;

use backend::{InMemoryBackend, Role, StudyApi};
use learnpath_core::model::QuestionBank;
use learnpath_core::time::{fixed_clock, fixed_now};
use services::{ProgressService, QuizService, QuizSession, QuizTick};

fn flat_questions() -> Vec<learnpath_core::model::Question> {
    QuestionBank::placement()
        .subjects()
        .iter()
        .flat_map(|s| s.questions().iter().cloned())
        .collect()
}

/// A timed quiz run: answer under the clock with a pause in the middle,
/// submit, and persist the attempt.
#[tokio::test]
async fn timed_quiz_end_to_end() {
    let fake = InMemoryBackend::new().with_clock(fixed_clock());
    let student = fake.add_user("sam@school.edu", "hunter22", "Sam Rivera", Role::Student);
    let math = fake.add_subject("Mathematics", Some("core"));

    let quizzes = QuizService::new(fixed_clock(), Arc::new(fake.clone()));
    let mut quiz = QuizSession::new("Linear Equations Assessment", flat_questions(), 1800).unwrap();

    // First half: two right answers, with some clock running.
    for _ in 0..2 {
        let correct = quiz.current_question().correct_option().clone();
        quiz.answer_current(correct).unwrap();
        quiz.tick();
        quiz.next();
    }

    // Pause for a break; the clock must hold still.
    quiz.pause();
    for _ in 0..60 {
        assert_eq!(quiz.tick(), QuizTick::Idle);
    }
    assert_eq!(quiz.remaining_seconds(), 1798);
    quiz.resume();

    // Flag one to revisit, then submit with the rest unanswered.
    quiz.toggle_flag();
    quiz.tick();
    let results = quiz.submit().unwrap();
    assert_eq!(results.correct_answers, 2);
    assert_eq!(results.total_questions, 6);
    assert_eq!(results.score_percent, 33);
    assert_eq!(results.time_spent_seconds, 3);

    let row = quizzes.save_attempt(student, math, &quiz).await.unwrap();
    assert_eq!(row.subject_name(), "Mathematics");
    assert_eq!(row.completed_at, Some(fixed_now()));
    assert_eq!(row.time_spent_seconds, Some(3));

    let progress = ProgressService::new(Arc::new(fake))
        .subject_progress(student)
        .await
        .unwrap();
    assert_eq!(progress.len(), 1);
    assert!((progress[0].average_score - 33.0).abs() < 1e-9);
}

/// Running out of time submits once, and the auto-submitted attempt can be
/// saved like a manual one.
#[tokio::test]
async fn expired_quiz_saves_after_auto_submit() {
    let fake = InMemoryBackend::new().with_clock(fixed_clock());
    let student = fake.add_user("sam@school.edu", "hunter22", "Sam Rivera", Role::Student);
    let math = fake.add_subject("Mathematics", None);

    let quizzes = QuizService::new(fixed_clock(), Arc::new(fake));
    let mut quiz = QuizSession::new("Sprint", flat_questions(), 2).unwrap();

    let correct = quiz.current_question().correct_option().clone();
    quiz.answer_current(correct).unwrap();

    assert_eq!(quiz.tick(), QuizTick::Running { remaining: 1 });
    assert_eq!(quiz.tick(), QuizTick::AutoSubmitted);
    assert_eq!(quiz.tick(), QuizTick::Idle);

    let row = quizzes.save_attempt(student, math, &quiz).await.unwrap();
    assert_eq!(row.correct_answers, Some(1));
    assert_eq!(row.time_spent_seconds, Some(2));
}

/// Retaking clears the submitted state so a fresh run can be saved again.
#[tokio::test]
async fn retake_allows_a_second_attempt() {
    let fake = InMemoryBackend::new().with_clock(fixed_clock());
    let student = fake.add_user("sam@school.edu", "hunter22", "Sam Rivera", Role::Student);
    let math = fake.add_subject("Mathematics", None);

    let quizzes = QuizService::new(fixed_clock(), Arc::new(fake.clone()));
    let mut quiz = QuizSession::new("Retakeable", flat_questions(), 600).unwrap();

    quiz.submit().unwrap();
    quizzes.save_attempt(student, math, &quiz).await.unwrap();

    quiz.retake();
    assert!(quizzes.save_attempt(student, math, &quiz).await.is_err());

    let correct = quiz.current_question().correct_option().clone();
    quiz.answer_current(correct).unwrap();
    quiz.submit().unwrap();
    quizzes.save_attempt(student, math, &quiz).await.unwrap();

    assert_eq!(fake.list_quiz_attempts(Some(student)).await.unwrap().len(), 2);
}
