mod answer;
mod ids;
mod question;
mod subject;
mod summary;

pub use answer::AnswerRecord;
pub use ids::{OptionId, ParseIdError, QuestionId, SubjectId};
pub use question::{AnswerOption, Difficulty, Question, QuestionError};
pub use subject::{BankError, QuestionBank, Subject, SubjectError};
pub use summary::{AssessmentSummary, PerformanceLevel};
