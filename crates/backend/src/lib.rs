#![forbid(unsafe_code)]

pub mod api;
pub mod error;
pub mod hosted;
pub mod memory;
pub mod records;

pub use api::{AuthApi, Backend, StudyApi};
pub use error::BackendError;
pub use hosted::{HostedClient, HostedConfig};
pub use memory::InMemoryBackend;
pub use records::{
    AccountStatus, AuthSession, NewQuizAttempt, NewStudySession, NewUserProfile, ProfileUpdate,
    QuizAttemptRow, Role, StudySessionRow, StudySessionUpdate, SubjectRef, SubjectRow, UserProfile,
};
