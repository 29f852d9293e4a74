#![forbid(unsafe_code)]

pub mod assessment;
pub mod auth;
pub mod error;
pub mod progress;
pub mod quiz;
pub mod study_sessions;

pub use learnpath_core::Clock;

pub use assessment::AssessmentService;
pub use auth::{AuthService, Credentials, SignupForm};
pub use error::{
    AssessmentServiceError, AuthError, ProgressError, QuizError, StudySessionError,
};
pub use progress::{ProgressService, SubjectProgress};
pub use quiz::{QuizResults, QuizService, QuizSession, QuizTick};
pub use study_sessions::StudySessionService;
