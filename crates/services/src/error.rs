//! Shared error types for the services crate.

use thiserror::Error;

use backend::BackendError;
use learnpath_core::model::OptionId;

/// Errors emitted by `AuthService`.
///
/// The Display strings for the validation variants are the inline form
/// messages shown next to the fields.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("please fill in all required fields")]
    MissingFields,
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("password must be at least 6 characters")]
    PasswordTooShort,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted by `AssessmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AssessmentServiceError {
    #[error("assessment is not complete yet")]
    NotComplete,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted by quiz sessions and `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    Empty,
    #[error("quiz was already submitted")]
    AlreadySubmitted,
    #[error("quiz has not been submitted yet")]
    NotSubmitted,
    #[error("question number {0} is out of range")]
    OutOfRange(usize),
    #[error("option {0} does not belong to the current question")]
    UnknownOption(OptionId),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted by `StudySessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudySessionError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}
