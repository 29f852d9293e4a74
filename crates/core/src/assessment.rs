use std::fmt;

use crate::model::{
    AnswerRecord, AssessmentSummary, OptionId, Question, QuestionBank, QuestionId, Subject,
};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where the flow currently is.
///
/// Feedback is a sub-state of `Question`, tracked separately so going back
/// can hide it without moving the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Welcome,
    SubjectTransition,
    Question,
    Processing,
    Complete,
}

/// 1-based position within the whole assessment, for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessmentProgress {
    pub step: usize,
    pub total_steps: usize,
}

//
// ─── ASSESSMENT ────────────────────────────────────────────────────────────────
//

/// Drives a student through a fixed sequence of subjects and questions,
/// recording one outcome per question.
///
/// All operations are synchronous and local; calling one from the wrong
/// phase is a no-op rather than an error, since the data is static and the
/// only way to get there is a caller bug.
pub struct Assessment {
    bank: QuestionBank,
    subject_idx: usize,
    question_idx: usize,
    phase: Phase,
    selection: Option<OptionId>,
    feedback_shown: bool,
    records: Vec<AnswerRecord>,
}

impl Assessment {
    /// Start a fresh attempt over the given bank.
    ///
    /// Banks are validated at construction, so starting an attempt cannot
    /// fail.
    #[must_use]
    pub fn new(bank: QuestionBank) -> Self {
        Self {
            bank,
            subject_idx: 0,
            question_idx: 0,
            phase: Phase::Welcome,
            selection: None,
            feedback_shown: false,
            records: Vec::new(),
        }
    }

    /// Attempt over the built-in placement bank.
    #[must_use]
    pub fn placement() -> Self {
        Self::new(QuestionBank::placement())
    }

    // ─── Views ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn feedback_shown(&self) -> bool {
        self.feedback_shown
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn current_subject(&self) -> Option<&Subject> {
        self.bank.subject(self.subject_idx)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.bank.question(self.subject_idx, self.question_idx)
    }

    /// The tentative selection for the current question, if any.
    #[must_use]
    pub fn selection(&self) -> Option<&OptionId> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn records(&self) -> &[AnswerRecord] {
        &self.records
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Whether `go_back` would do anything.
    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.phase == Phase::Question
            && (self.feedback_shown || self.question_idx > 0 || self.subject_idx > 0)
    }

    /// True on the last question of the last subject.
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        let Some(subject) = self.current_subject() else {
            return false;
        };
        self.subject_idx == self.bank.subject_count() - 1
            && self.question_idx == subject.question_count() - 1
    }

    /// 1-based step number over the whole bank, for the progress header.
    #[must_use]
    pub fn progress(&self) -> AssessmentProgress {
        let before: usize = self
            .bank
            .subjects()
            .iter()
            .take(self.subject_idx)
            .map(Subject::question_count)
            .sum();
        AssessmentProgress {
            step: before + self.question_idx + 1,
            total_steps: self.bank.total_questions(),
        }
    }

    /// Summary of the attempt so far.
    #[must_use]
    pub fn summary(&self) -> AssessmentSummary {
        AssessmentSummary::from_records(self.bank.total_questions(), &self.records)
    }

    // ─── Transitions ───────────────────────────────────────────────────────

    /// Leave the welcome screen for the first subject's transition card.
    pub fn start(&mut self) {
        if self.phase != Phase::Welcome {
            return;
        }
        self.phase = Phase::SubjectTransition;
        self.subject_idx = 0;
    }

    /// Enter the current subject's first question.
    pub fn begin_subject(&mut self) {
        if self.phase != Phase::SubjectTransition {
            return;
        }
        self.phase = Phase::Question;
        self.question_idx = 0;
        self.selection = None;
        self.feedback_shown = false;
    }

    /// Tentatively select an option for the current question.
    ///
    /// Valid only before feedback is shown; overwrites any prior selection.
    /// Options that do not belong to the current question are ignored.
    pub fn select_answer(&mut self, option: OptionId) {
        if self.phase != Phase::Question || self.feedback_shown {
            return;
        }
        let Some(question) = self.current_question() else {
            return;
        };
        if question.has_option(&option) {
            self.selection = Some(option);
        }
    }

    /// Lock in the current selection, or advance past shown feedback.
    ///
    /// First call with a selection pending: evaluates it, appends one record
    /// and shows feedback. If the question already has a record this attempt
    /// (after `go_back`), feedback is re-shown without appending a second
    /// record. Second call, with feedback showing, advances the cursor.
    pub fn confirm_answer(&mut self) {
        if self.phase != Phase::Question {
            return;
        }

        if self.feedback_shown {
            self.advance();
            return;
        }

        let Some(question) = self.current_question() else {
            return;
        };

        if self.record_for(question.id()).is_some() {
            self.feedback_shown = true;
            return;
        }

        let Some(selected) = self.selection.clone() else {
            return;
        };
        self.records.push(AnswerRecord::answered(question, selected));
        self.feedback_shown = true;
    }

    /// Skip the current question and advance, no feedback required.
    pub fn skip(&mut self) {
        if self.phase != Phase::Question {
            return;
        }
        let Some(question) = self.current_question() else {
            return;
        };
        if self.record_for(question.id()).is_none() {
            self.records.push(AnswerRecord::skipped(question));
        }
        self.advance();
    }

    /// Step backwards: hide feedback, or move to the previous question.
    ///
    /// Hiding feedback does not retract the record already appended for the
    /// question; the log is an audit trail. No-op at the very first question
    /// of the very first subject.
    pub fn go_back(&mut self) {
        if self.phase != Phase::Question {
            return;
        }

        if self.feedback_shown {
            self.feedback_shown = false;
            return;
        }

        if self.question_idx > 0 {
            self.question_idx -= 1;
            self.selection = None;
        } else if self.subject_idx > 0 {
            self.subject_idx -= 1;
            let prev_len = self
                .current_subject()
                .map_or(0, Subject::question_count);
            self.question_idx = prev_len.saturating_sub(1);
            self.selection = None;
        }
    }

    /// Finish the results-processing phase.
    pub fn complete_processing(&mut self) {
        if self.phase != Phase::Processing {
            return;
        }
        self.phase = Phase::Complete;
    }

    /// Throw away the attempt and return to the welcome screen.
    pub fn reset(&mut self) {
        self.subject_idx = 0;
        self.question_idx = 0;
        self.phase = Phase::Welcome;
        self.selection = None;
        self.feedback_shown = false;
        self.records.clear();
    }

    // ─── Internals ─────────────────────────────────────────────────────────

    fn record_for(&self, question_id: QuestionId) -> Option<&AnswerRecord> {
        self.records
            .iter()
            .find(|r| r.question_id() == question_id)
    }

    fn advance(&mut self) {
        self.selection = None;
        self.feedback_shown = false;

        let Some(subject) = self.current_subject() else {
            return;
        };

        if self.question_idx + 1 < subject.question_count() {
            self.question_idx += 1;
        } else if self.subject_idx + 1 < self.bank.subject_count() {
            self.subject_idx += 1;
            self.question_idx = 0;
            self.phase = Phase::SubjectTransition;
        } else {
            self.phase = Phase::Processing;
        }
    }
}

impl fmt::Debug for Assessment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assessment")
            .field("phase", &self.phase)
            .field("subject_idx", &self.subject_idx)
            .field("question_idx", &self.question_idx)
            .field("feedback_shown", &self.feedback_shown)
            .field("records_len", &self.records.len())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;

    fn started() -> Assessment {
        let mut assessment = Assessment::placement();
        assessment.start();
        assessment.begin_subject();
        assessment
    }

    /// Answer the current question with its correct option and step past
    /// feedback.
    fn answer_current_correctly(assessment: &mut Assessment) {
        let correct = assessment
            .current_question()
            .unwrap()
            .correct_option()
            .clone();
        assessment.select_answer(correct);
        assessment.confirm_answer();
        assert!(assessment.feedback_shown());
        assessment.confirm_answer();
    }

    fn drive_to_question_phase(assessment: &mut Assessment) {
        if assessment.phase() == Phase::SubjectTransition {
            assessment.begin_subject();
        }
    }

    #[test]
    fn starts_on_welcome_and_walks_into_first_subject() {
        let mut assessment = Assessment::placement();
        assert_eq!(assessment.phase(), Phase::Welcome);

        assessment.start();
        assert_eq!(assessment.phase(), Phase::SubjectTransition);
        assert_eq!(assessment.current_subject().unwrap().name(), "Math");

        assessment.begin_subject();
        assert_eq!(assessment.phase(), Phase::Question);
        assert_eq!(assessment.progress().step, 1);
    }

    #[test]
    fn start_outside_welcome_is_a_no_op() {
        let mut assessment = started();
        let before = assessment.phase();
        assessment.start();
        assert_eq!(assessment.phase(), before);
    }

    #[test]
    fn confirm_appends_exactly_one_evaluated_record() {
        let mut assessment = started();
        assessment.select_answer(OptionId::new("b"));
        assessment.confirm_answer();

        assert_eq!(assessment.records().len(), 1);
        let record = &assessment.records()[0];
        assert_eq!(record.selected(), Some(&OptionId::new("b")));
        assert!(record.is_correct());
        assert!(assessment.feedback_shown());

        // Confirming again advances instead of appending.
        assessment.confirm_answer();
        assert_eq!(assessment.records().len(), 1);
        assert!(!assessment.feedback_shown());
        assert_eq!(assessment.progress().step, 2);
    }

    #[test]
    fn confirm_without_selection_does_nothing() {
        let mut assessment = started();
        assessment.confirm_answer();
        assert!(assessment.records().is_empty());
        assert!(!assessment.feedback_shown());
    }

    #[test]
    fn selection_overwrites_until_confirmed() {
        let mut assessment = started();
        assessment.select_answer(OptionId::new("a"));
        assessment.select_answer(OptionId::new("c"));
        assert_eq!(assessment.selection(), Some(&OptionId::new("c")));

        assessment.confirm_answer();
        assert_eq!(
            assessment.records()[0].selected(),
            Some(&OptionId::new("c"))
        );

        // Feedback is showing; further selections are ignored.
        assessment.select_answer(OptionId::new("a"));
        assert_eq!(assessment.selection(), Some(&OptionId::new("c")));
    }

    #[test]
    fn foreign_option_keys_are_ignored() {
        let mut assessment = started();
        assessment.select_answer(OptionId::new("z"));
        assert_eq!(assessment.selection(), None);
    }

    #[test]
    fn skip_records_and_advances_like_a_confirmed_answer() {
        let mut assessment = started();
        let skipped_id = assessment.current_question().unwrap().id();

        assessment.skip();

        assert_eq!(assessment.records().len(), 1);
        let record = &assessment.records()[0];
        assert_eq!(record.question_id(), skipped_id);
        assert_eq!(record.selected(), None);
        assert!(!record.is_correct());
        assert!(record.is_skipped());
        assert_eq!(assessment.progress().step, 2);
        assert!(!assessment.feedback_shown());
    }

    #[test]
    fn last_question_of_subject_moves_to_transition() {
        let mut assessment = started();
        answer_current_correctly(&mut assessment); // Math 1
        assessment.skip(); // Math 2

        assert_eq!(assessment.phase(), Phase::SubjectTransition);
        assert_eq!(assessment.current_subject().unwrap().name(), "Science");
    }

    #[test]
    fn exhausting_every_subject_reaches_complete_with_full_log() {
        let mut assessment = Assessment::placement();
        let total = assessment.bank().total_questions();
        assessment.start();

        // Alternate confirm and skip until the flow leaves the question loop.
        let mut flip = false;
        loop {
            match assessment.phase() {
                Phase::SubjectTransition => assessment.begin_subject(),
                Phase::Question => {
                    if flip {
                        assessment.skip();
                    } else {
                        answer_current_correctly(&mut assessment);
                    }
                    flip = !flip;
                }
                Phase::Processing | Phase::Complete | Phase::Welcome => break,
            }
        }

        assert_eq!(assessment.phase(), Phase::Processing);
        assert_eq!(assessment.records().len(), total);

        assessment.complete_processing();
        assert!(assessment.is_complete());
    }

    #[test]
    fn go_back_at_origin_is_idempotent() {
        let mut assessment = started();
        for _ in 0..3 {
            assessment.go_back();
            assert_eq!(assessment.phase(), Phase::Question);
            assert_eq!(assessment.progress().step, 1);
        }
        assert!(!assessment.can_go_back());
    }

    #[test]
    fn go_back_hides_feedback_but_keeps_the_record() {
        let mut assessment = started();
        assessment.select_answer(OptionId::new("a"));
        assessment.confirm_answer();
        assert!(assessment.feedback_shown());

        assessment.go_back();
        assert!(!assessment.feedback_shown());
        assert_eq!(assessment.records().len(), 1);
        assert_eq!(assessment.progress().step, 1);
    }

    #[test]
    fn reconfirming_after_go_back_does_not_duplicate_the_record() {
        let mut assessment = started();
        assessment.select_answer(OptionId::new("a"));
        assessment.confirm_answer();
        assessment.go_back();

        // Pick something else and confirm again: the original record stands.
        assessment.select_answer(OptionId::new("b"));
        assessment.confirm_answer();

        assert_eq!(assessment.records().len(), 1);
        assert_eq!(
            assessment.records()[0].selected(),
            Some(&OptionId::new("a"))
        );
        assert!(assessment.feedback_shown());
    }

    #[test]
    fn go_back_crosses_subject_boundary_to_last_question() {
        let mut assessment = started();
        answer_current_correctly(&mut assessment);
        assessment.skip();
        assert_eq!(assessment.phase(), Phase::SubjectTransition);
        assessment.begin_subject();

        // Science question 1 -> back over the boundary to Math question 2.
        assessment.go_back();
        assert_eq!(assessment.phase(), Phase::Question);
        assert_eq!(assessment.current_subject().unwrap().name(), "Math");
        assert_eq!(
            assessment.current_question().unwrap().id(),
            QuestionId::new(2)
        );
    }

    #[test]
    fn round_trip_is_deterministic() {
        let run = || {
            let mut assessment = Assessment::placement();
            assessment.start();
            loop {
                match assessment.phase() {
                    Phase::SubjectTransition => assessment.begin_subject(),
                    Phase::Question => {
                        assessment.select_answer(OptionId::new("a"));
                        assessment.confirm_answer();
                        assessment.confirm_answer();
                    }
                    _ => break,
                }
            }
            assessment.complete_processing();
            assessment.summary()
        };

        let first = run();
        let second = run();
        assert_eq!(first, second);
        assert_eq!(first.total_questions(), 6);
        assert_eq!(first.attempted(), 6);
    }

    #[test]
    fn summary_counts_only_attempted_in_accuracy() {
        let mut assessment = Assessment::placement();
        assessment.start();
        let mut answered = 0;
        loop {
            match assessment.phase() {
                Phase::SubjectTransition => assessment.begin_subject(),
                Phase::Question => {
                    if answered < 2 {
                        answer_current_correctly(&mut assessment);
                        answered += 1;
                    } else {
                        assessment.skip();
                    }
                }
                _ => break,
            }
        }

        let summary = assessment.summary();
        assert_eq!(summary.answered(), 6);
        assert_eq!(summary.attempted(), 2);
        assert_eq!(summary.correct(), 2);
        assert_eq!(summary.accuracy_percent(), 100);
    }

    #[test]
    fn reset_returns_to_welcome_with_empty_log() {
        let mut assessment = started();
        assessment.skip();
        assessment.reset();

        assert_eq!(assessment.phase(), Phase::Welcome);
        assert!(assessment.records().is_empty());
        assert_eq!(assessment.progress().step, 1);

        // A fresh attempt can record the same question again.
        assessment.start();
        drive_to_question_phase(&mut assessment);
        assessment.skip();
        assert_eq!(assessment.records().len(), 1);
    }
}
