use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use backend::{NewQuizAttempt, QuizAttemptRow, StudyApi};
use learnpath_core::model::{OptionId, PerformanceLevel, Question, QuestionId};
use learnpath_core::{Clock, Countdown, Tick};

use crate::error::QuizError;

//
// ─── RESULTS ───────────────────────────────────────────────────────────────────
//

/// Outcome of a submitted quiz.
///
/// Unlike the assessment summary, the quiz score keeps unanswered questions
/// in the denominator: leaving half the quiz blank halves the score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResults {
    pub score_percent: u8,
    pub correct_answers: u32,
    pub total_questions: u32,
    pub time_spent_seconds: u32,
    pub performance_level: PerformanceLevel,
}

/// What a quiz tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizTick {
    /// Still running; `remaining` seconds on the clock.
    Running { remaining: u32 },
    /// The time limit just ran out and the quiz submitted itself. Emitted
    /// exactly once.
    AutoSubmitted,
    /// Paused or already submitted; nothing changed.
    Idle,
}

//
// ─── QUIZ SESSION ──────────────────────────────────────────────────────────────
//

/// A timed quiz over a flat question list.
///
/// Navigation is free in both directions and questions can be re-answered
/// until submission; one terminal submit (manual or by timer expiry) locks
/// the session. Question numbers are 1-based, matching what the student
/// sees.
#[derive(Debug)]
pub struct QuizSession {
    title: String,
    questions: Vec<Question>,
    current: usize,
    answers: HashMap<QuestionId, OptionId>,
    flagged: HashSet<QuestionId>,
    countdown: Countdown,
    time_limit_seconds: u32,
    submitted: bool,
}

impl QuizSession {
    /// Start a quiz with a whole-second time limit.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Empty` for an empty question list.
    pub fn new(
        title: impl Into<String>,
        questions: Vec<Question>,
        time_limit_seconds: u32,
    ) -> Result<Self, QuizError> {
        if questions.is_empty() {
            return Err(QuizError::Empty);
        }
        Ok(Self {
            title: title.into(),
            questions,
            current: 0,
            answers: HashMap::new(),
            flagged: HashSet::new(),
            countdown: Countdown::new(time_limit_seconds),
            time_limit_seconds,
            submitted: false,
        })
    }

    // ─── Views ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    /// 1-based number of the current question.
    #[must_use]
    pub fn question_number(&self) -> usize {
        self.current + 1
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    #[must_use]
    pub fn answer_for(&self, question_id: QuestionId) -> Option<&OptionId> {
        self.answers.get(&question_id)
    }

    #[must_use]
    pub fn is_flagged(&self, question_id: QuestionId) -> bool {
        self.flagged.contains(&question_id)
    }

    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.countdown.is_paused()
    }

    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining()
    }

    #[must_use]
    pub fn time_spent_seconds(&self) -> u32 {
        self.countdown.elapsed()
    }

    // ─── Interaction ───────────────────────────────────────────────────────

    /// Answer the current question; re-answering overwrites.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadySubmitted` after submission and
    /// `QuizError::UnknownOption` for a key the question does not have.
    pub fn answer_current(&mut self, option: OptionId) -> Result<(), QuizError> {
        if self.submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        let question = self.current_question();
        if !question.has_option(&option) {
            return Err(QuizError::UnknownOption(option));
        }
        self.answers.insert(question.id(), option);
        Ok(())
    }

    /// Toggle the review flag on the current question; returns the new
    /// state.
    pub fn toggle_flag(&mut self) -> bool {
        let id = self.current_question().id();
        if self.flagged.remove(&id) {
            false
        } else {
            self.flagged.insert(id);
            true
        }
    }

    /// Move forward one question. No-op on the last question.
    pub fn next(&mut self) {
        if !self.submitted && self.current + 1 < self.questions.len() {
            self.current += 1;
        }
    }

    /// Move back one question. No-op on the first question.
    pub fn previous(&mut self) {
        if !self.submitted && self.current > 0 {
            self.current -= 1;
        }
    }

    /// Jump straight to a 1-based question number (sidebar navigation).
    ///
    /// # Errors
    ///
    /// Returns `QuizError::OutOfRange` for a number outside the quiz.
    pub fn jump_to(&mut self, number: usize) -> Result<(), QuizError> {
        if self.submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        if number == 0 || number > self.questions.len() {
            return Err(QuizError::OutOfRange(number));
        }
        self.current = number - 1;
        Ok(())
    }

    /// Freeze the clock while the pause modal is up.
    pub fn pause(&mut self) {
        self.countdown.pause();
    }

    pub fn resume(&mut self) {
        self.countdown.resume();
    }

    /// Advance the clock one second.
    ///
    /// Expiry submits the quiz automatically, exactly once; afterwards the
    /// tick is idle.
    pub fn tick(&mut self) -> QuizTick {
        if self.submitted {
            return QuizTick::Idle;
        }
        match self.countdown.tick() {
            Tick::Ticked { remaining } => QuizTick::Running { remaining },
            Tick::Expired => {
                self.submitted = true;
                QuizTick::AutoSubmitted
            }
            Tick::Idle => QuizTick::Idle,
        }
    }

    /// Submit the quiz and compute results.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::AlreadySubmitted` on a second submit, including
    /// after a timer auto-submit.
    pub fn submit(&mut self) -> Result<QuizResults, QuizError> {
        if self.submitted {
            return Err(QuizError::AlreadySubmitted);
        }
        self.submitted = true;
        self.countdown.pause();
        Ok(self.compute_results())
    }

    /// Results of a submitted session.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotSubmitted` while the quiz is still running.
    pub fn results(&self) -> Result<QuizResults, QuizError> {
        if !self.submitted {
            return Err(QuizError::NotSubmitted);
        }
        Ok(self.compute_results())
    }

    /// Start the quiz over: answers, flags and clock all reset.
    pub fn retake(&mut self) {
        self.current = 0;
        self.answers.clear();
        self.flagged.clear();
        self.countdown = Countdown::new(self.time_limit_seconds);
        self.submitted = false;
    }

    fn compute_results(&self) -> QuizResults {
        let correct = self
            .questions
            .iter()
            .filter(|q| {
                self.answers
                    .get(&q.id())
                    .is_some_and(|picked| q.is_correct(picked))
            })
            .count();
        let total = self.questions.len();
        let score_percent = percent_of(correct, total);

        QuizResults {
            score_percent,
            correct_answers: u32::try_from(correct).unwrap_or(u32::MAX),
            total_questions: u32::try_from(total).unwrap_or(u32::MAX),
            time_spent_seconds: self.countdown.elapsed(),
            performance_level: PerformanceLevel::from_percent(score_percent),
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent_of(numerator: usize, denominator: usize) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let pct = (numerator as f64 / denominator as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

//
// ─── QUIZ SERVICE ──────────────────────────────────────────────────────────────
//

/// Persists submitted quizzes as attempt rows.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    study: Arc<dyn StudyApi>,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, study: Arc<dyn StudyApi>) -> Self {
        Self { clock, study }
    }

    /// Record a submitted session against a backend subject.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotSubmitted` for a session still in flight, and
    /// backend errors from the write.
    pub async fn save_attempt(
        &self,
        student_id: Uuid,
        subject_id: Uuid,
        session: &QuizSession,
    ) -> Result<QuizAttemptRow, QuizError> {
        let results = session.results()?;
        let attempt = NewQuizAttempt {
            student_id,
            subject_id,
            score: f64::from(results.score_percent),
            correct_answers: results.correct_answers,
            total_questions: results.total_questions,
            time_spent_seconds: Some(results.time_spent_seconds),
            completed_at: self.clock.now(),
        };
        let row = self.study.create_quiz_attempt(attempt).await?;
        tracing::debug!("saved quiz attempt {} for {student_id}", row.id);
        Ok(row)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use learnpath_core::model::QuestionBank;

    fn questions() -> Vec<Question> {
        QuestionBank::placement()
            .subjects()
            .iter()
            .flat_map(|s| s.questions().iter().cloned())
            .collect()
    }

    fn session() -> QuizSession {
        QuizSession::new("Linear Equations Assessment", questions(), 1800).unwrap()
    }

    #[test]
    fn empty_question_list_is_an_error() {
        let err = QuizSession::new("Empty", Vec::new(), 60).unwrap_err();
        assert!(matches!(err, QuizError::Empty));
    }

    #[test]
    fn navigation_clamps_at_both_ends() {
        let mut quiz = session();
        quiz.previous();
        assert_eq!(quiz.question_number(), 1);

        for _ in 0..20 {
            quiz.next();
        }
        assert_eq!(quiz.question_number(), quiz.total_questions());

        quiz.jump_to(3).unwrap();
        assert_eq!(quiz.question_number(), 3);
        assert!(matches!(quiz.jump_to(99).unwrap_err(), QuizError::OutOfRange(99)));
        assert!(matches!(quiz.jump_to(0).unwrap_err(), QuizError::OutOfRange(0)));
    }

    #[test]
    fn answers_overwrite_and_flags_toggle() {
        let mut quiz = session();
        let id = quiz.current_question().id();

        quiz.answer_current(OptionId::new("a")).unwrap();
        quiz.answer_current(OptionId::new("b")).unwrap();
        assert_eq!(quiz.answer_for(id), Some(&OptionId::new("b")));
        assert_eq!(quiz.answered_count(), 1);

        assert!(quiz.toggle_flag());
        assert!(quiz.is_flagged(id));
        assert!(!quiz.toggle_flag());
        assert!(!quiz.is_flagged(id));

        let err = quiz.answer_current(OptionId::new("z")).unwrap_err();
        assert!(matches!(err, QuizError::UnknownOption(_)));
    }

    #[test]
    fn pause_freezes_the_clock_exactly() {
        let mut quiz = session();
        for _ in 0..5 {
            quiz.tick();
        }
        assert_eq!(quiz.remaining_seconds(), 1795);

        quiz.pause();
        for _ in 0..30 {
            assert_eq!(quiz.tick(), QuizTick::Idle);
        }
        assert_eq!(quiz.remaining_seconds(), 1795);

        quiz.resume();
        assert_eq!(quiz.tick(), QuizTick::Running { remaining: 1794 });
        assert_eq!(quiz.time_spent_seconds(), 6);
    }

    #[test]
    fn expiry_auto_submits_exactly_once() {
        let mut quiz = QuizSession::new("Short", questions(), 3).unwrap();
        assert_eq!(quiz.tick(), QuizTick::Running { remaining: 2 });
        assert_eq!(quiz.tick(), QuizTick::Running { remaining: 1 });
        assert_eq!(quiz.tick(), QuizTick::AutoSubmitted);
        assert!(quiz.is_submitted());

        assert_eq!(quiz.tick(), QuizTick::Idle);
        assert!(matches!(
            quiz.submit().unwrap_err(),
            QuizError::AlreadySubmitted
        ));
        assert!(quiz.results().is_ok());
    }

    #[test]
    fn score_counts_unanswered_questions_in_the_denominator() {
        let mut quiz = session();
        // Answer the first three questions correctly, leave the rest blank.
        for _ in 0..3 {
            let correct = quiz.current_question().correct_option().clone();
            quiz.answer_current(correct).unwrap();
            quiz.next();
        }

        let results = quiz.submit().unwrap();
        assert_eq!(results.correct_answers, 3);
        assert_eq!(results.total_questions, 6);
        assert_eq!(results.score_percent, 50);
        assert_eq!(
            results.performance_level,
            PerformanceLevel::NeedsImprovement
        );
    }

    #[test]
    fn retake_resets_everything() {
        let mut quiz = session();
        quiz.answer_current(OptionId::new("a")).unwrap();
        quiz.toggle_flag();
        quiz.tick();
        quiz.submit().unwrap();

        quiz.retake();
        assert!(!quiz.is_submitted());
        assert_eq!(quiz.answered_count(), 0);
        assert_eq!(quiz.question_number(), 1);
        assert_eq!(quiz.remaining_seconds(), 1800);
        assert_eq!(quiz.time_spent_seconds(), 0);
        assert!(!quiz.is_flagged(quiz.current_question().id()));
    }

    #[test]
    fn results_before_submit_is_an_error() {
        let quiz = session();
        assert!(matches!(
            quiz.results().unwrap_err(),
            QuizError::NotSubmitted
        ));
    }
}
