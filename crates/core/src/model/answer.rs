use serde::{Deserialize, Serialize};

use crate::model::ids::{OptionId, QuestionId};
use crate::model::question::Question;

/// One question's recorded outcome within an attempt.
///
/// Records are append-only: once pushed onto the log they are never mutated,
/// so the log doubles as an audit trail of the attempt. Skip and answer are
/// mutually exclusive terminal actions for a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    question_id: QuestionId,
    subject: String,
    selected: Option<OptionId>,
    correct_option: OptionId,
    is_correct: bool,
    skipped: bool,
}

impl AnswerRecord {
    /// Record a confirmed answer, evaluating it against the question.
    #[must_use]
    pub fn answered(question: &Question, selected: OptionId) -> Self {
        let is_correct = question.is_correct(&selected);
        Self {
            question_id: question.id(),
            subject: question.subject().to_string(),
            selected: Some(selected),
            correct_option: question.correct_option().clone(),
            is_correct,
            skipped: false,
        }
    }

    /// Record a skipped question: no selection, never correct.
    #[must_use]
    pub fn skipped(question: &Question) -> Self {
        Self {
            question_id: question.id(),
            subject: question.subject().to_string(),
            selected: None,
            correct_option: question.correct_option().clone(),
            is_correct: false,
            skipped: true,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn selected(&self) -> Option<&OptionId> {
        self.selected.as_ref()
    }

    #[must_use]
    pub fn correct_option(&self) -> &OptionId {
        &self.correct_option
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Returns true when the student actually picked an option.
    ///
    /// Skipped records carry no selection and stay out of accuracy math.
    #[must_use]
    pub fn attempted(&self) -> bool {
        self.selected.is_some()
    }
}
