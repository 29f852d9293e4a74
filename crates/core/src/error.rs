use thiserror::Error;

use crate::model::{BankError, QuestionError, SubjectError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Subject(#[from] SubjectError),
    #[error(transparent)]
    Bank(#[from] BankError),
}
