use std::sync::Arc;
use uuid::Uuid;

use backend::{NewStudySession, StudyApi, StudySessionRow, StudySessionUpdate};
use learnpath_core::Clock;

use crate::error::StudySessionError;

/// Study-session lifecycle over an injected `StudyApi`.
///
/// A session is opened when the student enters the viewer and completed
/// with its final duration when they finish; abandoning the page leaves an
/// open row behind, matching the original flow.
#[derive(Clone)]
pub struct StudySessionService {
    clock: Clock,
    study: Arc<dyn StudyApi>,
}

impl StudySessionService {
    #[must_use]
    pub fn new(clock: Clock, study: Arc<dyn StudyApi>) -> Self {
        Self { clock, study }
    }

    /// Open a session for a student and subject.
    ///
    /// `planned_minutes` is the advertised length, not the measured one;
    /// completion overwrites it with the actual duration.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the insert is refused.
    pub async fn start(
        &self,
        student_id: Uuid,
        subject_id: Uuid,
        planned_minutes: Option<u32>,
    ) -> Result<StudySessionRow, StudySessionError> {
        let row = self
            .study
            .create_study_session(NewStudySession {
                student_id,
                subject_id,
                duration_minutes: planned_minutes,
            })
            .await?;
        tracing::debug!("opened study session {} for {student_id}", row.id);
        Ok(row)
    }

    /// Complete a session with its measured duration.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` through the service error when the
    /// session row is missing.
    pub async fn complete(
        &self,
        session_id: i64,
        duration_minutes: u32,
    ) -> Result<StudySessionRow, StudySessionError> {
        let row = self
            .study
            .update_study_session(
                session_id,
                StudySessionUpdate {
                    duration_minutes: Some(duration_minutes),
                    completed_at: Some(self.clock.now()),
                },
            )
            .await?;
        Ok(row)
    }

    /// All of a student's sessions, newest first.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the service is unreachable.
    pub async fn list_for_student(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<StudySessionRow>, StudySessionError> {
        Ok(self.study.list_study_sessions(Some(student_id)).await?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use backend::{BackendError, InMemoryBackend, Role};
    use learnpath_core::time::{fixed_clock, fixed_now};

    #[tokio::test]
    async fn start_then_complete_stamps_the_clock() {
        let fake = InMemoryBackend::new().with_clock(fixed_clock());
        let student = fake.add_user("sam@school.edu", "pw", "Sam", Role::Student);
        let subject = fake.add_subject("Mathematics", Some("core"));
        let service = StudySessionService::new(fixed_clock(), Arc::new(fake));

        let open = service.start(student, subject, Some(45)).await.unwrap();
        assert!(!open.is_completed());
        assert_eq!(open.subject_name(), "Mathematics");

        let done = service.complete(open.id, 37).await.unwrap();
        assert_eq!(done.completed_at, Some(fixed_now()));
        assert_eq!(done.duration_minutes, Some(37));

        let listed = service.list_for_student(student).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].is_completed());
    }

    #[tokio::test]
    async fn completing_a_missing_session_is_not_found() {
        let fake = InMemoryBackend::new();
        let service = StudySessionService::new(fixed_clock(), Arc::new(fake));

        let err = service.complete(404, 10).await.unwrap_err();
        assert!(matches!(
            err,
            StudySessionError::Backend(BackendError::NotFound)
        ));
    }
}
