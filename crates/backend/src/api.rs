use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::BackendError;
use crate::memory::InMemoryBackend;
use crate::records::{
    AuthSession, NewQuizAttempt, NewStudySession, NewUserProfile, ProfileUpdate, QuizAttemptRow,
    StudySessionRow, StudySessionUpdate, SubjectRow, UserProfile,
};

/// Identity operations against the hosted service.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Rejected` for bad credentials and
    /// `BackendError::Unreachable` when the service cannot be reached.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;

    /// Create an account with the given profile metadata.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the service refuses the signup or is
    /// unreachable.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: NewUserProfile,
    ) -> Result<AuthSession, BackendError>;

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the service is unreachable.
    async fn sign_out(&self) -> Result<(), BackendError>;

    /// The current session, if one is active.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the service is unreachable.
    async fn session(&self) -> Result<Option<AuthSession>, BackendError>;

    /// Fetch a user profile by id.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the profile is missing.
    async fn profile(&self, user_id: Uuid) -> Result<UserProfile, BackendError>;

    /// Apply a partial profile update and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the profile is missing.
    async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<UserProfile, BackendError>;

    /// Request a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the service refuses or is unreachable.
    async fn reset_password(&self, email: &str) -> Result<(), BackendError>;

    /// Active student profiles, ordered by name (teacher rosters).
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the service is unreachable.
    async fn list_students(&self) -> Result<Vec<UserProfile>, BackendError>;
}

/// Study-data operations against the hosted service.
#[async_trait]
pub trait StudyApi: Send + Sync {
    /// All subjects, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the service is unreachable.
    async fn list_subjects(&self) -> Result<Vec<SubjectRow>, BackendError>;

    /// Study sessions, newest first, optionally for one student.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the service is unreachable.
    async fn list_study_sessions(
        &self,
        student_id: Option<Uuid>,
    ) -> Result<Vec<StudySessionRow>, BackendError>;

    /// Insert a study session and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the insert is refused.
    async fn create_study_session(
        &self,
        new: NewStudySession,
    ) -> Result<StudySessionRow, BackendError>;

    /// Apply a partial update (typically completion) to a study session.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` if the session is missing.
    async fn update_study_session(
        &self,
        id: i64,
        update: StudySessionUpdate,
    ) -> Result<StudySessionRow, BackendError>;

    /// Quiz attempts, newest first, optionally for one student.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the service is unreachable.
    async fn list_quiz_attempts(
        &self,
        student_id: Option<Uuid>,
    ) -> Result<Vec<QuizAttemptRow>, BackendError>;

    /// Insert a quiz attempt and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` when the insert is refused.
    async fn create_quiz_attempt(
        &self,
        new: NewQuizAttempt,
    ) -> Result<QuizAttemptRow, BackendError>;
}

/// Aggregates the backend capabilities behind trait objects so services can
/// swap the hosted client for the in-memory fake.
#[derive(Clone)]
pub struct Backend {
    pub auth: Arc<dyn AuthApi>,
    pub study: Arc<dyn StudyApi>,
}

impl Backend {
    /// Backend over a fresh in-memory fake, for tests and prototyping.
    #[must_use]
    pub fn in_memory() -> Self {
        let fake = InMemoryBackend::new();
        Self::from_fake(fake)
    }

    /// Backend over an existing fake, so tests can keep a seeding handle.
    #[must_use]
    pub fn from_fake(fake: InMemoryBackend) -> Self {
        let auth: Arc<dyn AuthApi> = Arc::new(fake.clone());
        let study: Arc<dyn StudyApi> = Arc::new(fake);
        Self { auth, study }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_backend_wires_both_capabilities() {
        let backend = Backend::in_memory();
        assert!(backend.auth.session().await.unwrap().is_none());
        assert!(backend.study.list_subjects().await.unwrap().is_empty());
    }
}
