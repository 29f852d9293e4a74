use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{OptionId, QuestionId, SubjectId};
use crate::model::question::{AnswerOption, Difficulty, Question, QuestionError};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SubjectError {
    #[error("subject name cannot be empty")]
    EmptyName,

    #[error("subject {0} has no questions")]
    NoQuestions(String),

    #[error("question {question} is tagged {tag}, expected subject {subject}")]
    MismatchedTag {
        question: QuestionId,
        tag: String,
        subject: String,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BankError {
    #[error("question bank has no subjects")]
    Empty,

    #[error("duplicate subject name: {0}")]
    DuplicateSubject(String),

    #[error("question id {0} appears in more than one subject")]
    DuplicateQuestion(QuestionId),

    #[error(transparent)]
    Subject(#[from] SubjectError),

    #[error(transparent)]
    Question(#[from] QuestionError),
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// A named category holding an ordered list of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    id: SubjectId,
    name: String,
    questions: Vec<Question>,
}

impl Subject {
    /// Build a subject from its questions.
    ///
    /// # Errors
    ///
    /// Returns `SubjectError` if the name is empty, the question list is
    /// empty, or a question carries a different subject tag.
    pub fn new(
        id: SubjectId,
        name: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, SubjectError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(SubjectError::EmptyName);
        }
        if questions.is_empty() {
            return Err(SubjectError::NoQuestions(name));
        }
        for question in &questions {
            if question.subject() != name {
                return Err(SubjectError::MismatchedTag {
                    question: question.id(),
                    tag: question.subject().to_string(),
                    subject: name,
                });
            }
        }

        Ok(Self {
            id,
            name,
            questions,
        })
    }

    #[must_use]
    pub fn id(&self) -> SubjectId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}

//
// ─── QUESTION BANK ─────────────────────────────────────────────────────────────
//

/// An ordered, immutable set of subjects an assessment walks through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBank {
    subjects: Vec<Subject>,
}

impl QuestionBank {
    /// Build a bank from its subjects.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if the subject list is empty, subject names
    /// repeat, or a question id appears twice.
    pub fn new(subjects: Vec<Subject>) -> Result<Self, BankError> {
        if subjects.is_empty() {
            return Err(BankError::Empty);
        }

        let mut names = HashSet::new();
        let mut question_ids = HashSet::new();
        for subject in &subjects {
            if !names.insert(subject.name().to_string()) {
                return Err(BankError::DuplicateSubject(subject.name().to_string()));
            }
            for question in subject.questions() {
                if !question_ids.insert(question.id()) {
                    return Err(BankError::DuplicateQuestion(question.id()));
                }
            }
        }

        Ok(Self { subjects })
    }

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    #[must_use]
    pub fn subject(&self, index: usize) -> Option<&Subject> {
        self.subjects.get(index)
    }

    #[must_use]
    pub fn subject_count(&self) -> usize {
        self.subjects.len()
    }

    /// Total question count across all subjects.
    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.subjects.iter().map(Subject::question_count).sum()
    }

    #[must_use]
    pub fn question(&self, subject_idx: usize, question_idx: usize) -> Option<&Question> {
        self.subjects
            .get(subject_idx)?
            .questions()
            .get(question_idx)
    }

    /// The built-in placement assessment bank.
    ///
    /// Four subjects, six questions, walked front to back by the onboarding
    /// flow before any per-student data exists.
    ///
    /// # Panics
    ///
    /// The bank content is static and validated by tests; construction does
    /// not fail at runtime.
    #[must_use]
    #[allow(clippy::too_many_lines)]
    pub fn placement() -> Self {
        let math = Subject::new(
            SubjectId::new(1),
            "Math",
            vec![
                question(
                    1,
                    "Math",
                    Difficulty::Medium,
                    "If 3x + 7 = 22, what is the value of x?",
                    &[
                        ("a", "x = 3"),
                        ("b", "x = 5"),
                        ("c", "x = 7"),
                        ("d", "x = 9"),
                    ],
                    "b",
                    "To solve 3x + 7 = 22, subtract 7 from both sides: 3x = 15, \
                     then divide by 3: x = 5.",
                ),
                question(
                    2,
                    "Math",
                    Difficulty::Hard,
                    "What is the area of a circle with radius 6 units?",
                    &[
                        ("a", "12π square units"),
                        ("b", "36π square units"),
                        ("c", "18π square units"),
                        ("d", "24π square units"),
                    ],
                    "b",
                    "Using the formula A = πr², with r = 6: \
                     A = π(6)² = π(36) = 36π square units.",
                ),
            ],
        );

        let science = Subject::new(
            SubjectId::new(2),
            "Science",
            vec![
                question(
                    3,
                    "Science",
                    Difficulty::Medium,
                    "Which of the following is NOT a renewable energy source?",
                    &[
                        ("a", "Solar power"),
                        ("b", "Wind power"),
                        ("c", "Natural gas"),
                        ("d", "Hydroelectric power"),
                    ],
                    "c",
                    "Natural gas is a fossil fuel and is considered non-renewable. \
                     Solar, wind, and hydroelectric are all renewable energy sources.",
                ),
                question(
                    4,
                    "Science",
                    Difficulty::Easy,
                    "What is the chemical symbol for water?",
                    &[("a", "H2O"), ("b", "CO2"), ("c", "NaCl"), ("d", "O2")],
                    "a",
                    "Water is composed of two hydrogen atoms and one oxygen atom, \
                     giving it the chemical formula H2O.",
                ),
            ],
        );

        let english = Subject::new(
            SubjectId::new(3),
            "English",
            vec![question(
                5,
                "English",
                Difficulty::Medium,
                "Which sentence uses the correct form of \"their,\" \"there,\" or \
                 \"they're\"?",
                &[
                    ("a", "Their going to the store later."),
                    ("b", "The books are over they're."),
                    ("c", "They're planning to visit there friends."),
                    ("d", "The students left their backpacks there."),
                ],
                "d",
                "\"Their\" shows possession (their backpacks), and \"there\" \
                 indicates location (left them there).",
            )],
        );

        let history = Subject::new(
            SubjectId::new(4),
            "History",
            vec![question(
                6,
                "History",
                Difficulty::Medium,
                "In which year did World War II end?",
                &[("a", "1944"), ("b", "1945"), ("c", "1946"), ("d", "1947")],
                "b",
                "World War II ended in 1945 with the surrender of Japan in \
                 September, following Germany's surrender in May.",
            )],
        );

        let subjects: Vec<Subject> = [math, science, english, history]
            .into_iter()
            .map(|s| s.expect("placement bank subjects are statically valid"))
            .collect();

        Self::new(subjects).expect("placement bank is statically valid")
    }
}

/// Shorthand for the static bank content, which is validated by tests.
fn question(
    id: u64,
    subject: &str,
    difficulty: Difficulty,
    prompt: &str,
    options: &[(&str, &str)],
    correct: &str,
    explanation: &str,
) -> Question {
    Question::new(
        QuestionId::new(id),
        subject,
        difficulty,
        prompt,
        options
            .iter()
            .map(|(key, text)| AnswerOption::new(OptionId::new(*key), *text))
            .collect(),
        OptionId::new(correct),
        explanation,
    )
    .expect("static bank question is valid")
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
