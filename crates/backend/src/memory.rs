use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use learnpath_core::Clock;

use crate::api::{AuthApi, StudyApi};
use crate::error::BackendError;
use crate::records::{
    AuthSession, NewQuizAttempt, NewStudySession, NewUserProfile, ProfileUpdate, QuizAttemptRow,
    Role, StudySessionRow, StudySessionUpdate, SubjectRef, SubjectRow, UserProfile,
};

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    session: Option<AuthSession>,
    subjects: Vec<SubjectRow>,
    study_sessions: Vec<StudySessionRow>,
    quiz_attempts: Vec<QuizAttemptRow>,
    next_session_id: i64,
    next_attempt_id: i64,
    offline: bool,
}

struct Account {
    password: String,
    profile: UserProfile,
}

/// In-memory stand-in for the hosted service, for tests and prototyping.
///
/// Clones share state, so a test can keep one handle for seeding while the
/// services under test hold another. `set_offline` makes every call fail
/// with `Unreachable` to exercise the degraded paths.
#[derive(Clone)]
pub struct InMemoryBackend {
    clock: Clock,
    inner: Arc<Mutex<Inner>>,
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: Clock::default_clock(),
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    /// Use an explicit clock for `created_at` stamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Seed an account and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the shared state lock is poisoned, which only happens after
    /// another test thread panicked.
    pub fn add_user(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: Role,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let mut inner = self.lock_unpoisoned();
        inner.accounts.push(Account {
            password: password.to_string(),
            profile: UserProfile {
                id,
                email: email.to_string(),
                full_name: Some(full_name.to_string()),
                role,
                school_name: None,
                grade_level: None,
                status: crate::records::AccountStatus::Active,
            },
        });
        id
    }

    /// Seed a subject and return its id.
    ///
    /// # Panics
    ///
    /// Panics if the shared state lock is poisoned.
    pub fn add_subject(&self, name: &str, subject_type: Option<&str>) -> Uuid {
        let id = Uuid::new_v4();
        let mut inner = self.lock_unpoisoned();
        inner.subjects.push(SubjectRow {
            id,
            name: name.to_string(),
            subject_type: subject_type.map(str::to_string),
        });
        id
    }

    /// Make every subsequent call fail as unreachable (or restore service).
    ///
    /// # Panics
    ///
    /// Panics if the shared state lock is poisoned.
    pub fn set_offline(&self, offline: bool) {
        self.lock_unpoisoned().offline = offline;
    }

    fn lock_unpoisoned(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .expect("in-memory backend state lock poisoned")
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, BackendError> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| BackendError::Payload(e.to_string()))?;
        if inner.offline {
            return Err(BackendError::Unreachable);
        }
        Ok(inner)
    }

    fn subject_ref(inner: &Inner, subject_id: Uuid) -> Option<SubjectRef> {
        inner
            .subjects
            .iter()
            .find(|s| s.id == subject_id)
            .map(SubjectRef::from)
    }
}

#[async_trait]
impl AuthApi for InMemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let mut inner = self.lock()?;
        let account = inner
            .accounts
            .iter()
            .find(|a| a.profile.email == email && a.password == password)
            .ok_or_else(|| BackendError::Rejected("Invalid login credentials".into()))?;

        let session = AuthSession {
            user: account.profile.clone(),
            access_token: format!("fake-token-{}", account.profile.id),
            expires_at: None,
        };
        inner.session = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        profile: NewUserProfile,
    ) -> Result<AuthSession, BackendError> {
        let mut inner = self.lock()?;
        if inner.accounts.iter().any(|a| a.profile.email == email) {
            return Err(BackendError::Rejected("User already registered".into()));
        }

        let user = UserProfile {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: Some(profile.full_name),
            role: profile.role,
            school_name: profile.school_name,
            grade_level: profile.grade_level,
            status: crate::records::AccountStatus::Active,
        };
        inner.accounts.push(Account {
            password: password.to_string(),
            profile: user.clone(),
        });

        let session = AuthSession {
            access_token: format!("fake-token-{}", user.id),
            user,
            expires_at: None,
        };
        inner.session = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.lock()?.session = None;
        Ok(())
    }

    async fn session(&self) -> Result<Option<AuthSession>, BackendError> {
        Ok(self.lock()?.session.clone())
    }

    async fn profile(&self, user_id: Uuid) -> Result<UserProfile, BackendError> {
        self.lock()?
            .accounts
            .iter()
            .find(|a| a.profile.id == user_id)
            .map(|a| a.profile.clone())
            .ok_or(BackendError::NotFound)
    }

    async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<UserProfile, BackendError> {
        let mut inner = self.lock()?;
        let account = inner
            .accounts
            .iter_mut()
            .find(|a| a.profile.id == user_id)
            .ok_or(BackendError::NotFound)?;

        if let Some(full_name) = update.full_name {
            account.profile.full_name = Some(full_name);
        }
        if let Some(school_name) = update.school_name {
            account.profile.school_name = Some(school_name);
        }
        if let Some(grade_level) = update.grade_level {
            account.profile.grade_level = Some(grade_level);
        }
        Ok(account.profile.clone())
    }

    async fn reset_password(&self, email: &str) -> Result<(), BackendError> {
        // The hosted service answers success for unknown addresses too, to
        // avoid leaking which emails exist; only reachability matters here.
        let _ = (self.lock()?, email);
        Ok(())
    }

    async fn list_students(&self) -> Result<Vec<UserProfile>, BackendError> {
        let inner = self.lock()?;
        let mut students: Vec<UserProfile> = inner
            .accounts
            .iter()
            .map(|a| a.profile.clone())
            .filter(|p| p.role == Role::Student && p.is_active())
            .collect();
        students.sort_by(|a, b| a.display_name().cmp(b.display_name()));
        Ok(students)
    }
}

#[async_trait]
impl StudyApi for InMemoryBackend {
    async fn list_subjects(&self) -> Result<Vec<SubjectRow>, BackendError> {
        let inner = self.lock()?;
        let mut subjects = inner.subjects.clone();
        subjects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(subjects)
    }

    async fn list_study_sessions(
        &self,
        student_id: Option<Uuid>,
    ) -> Result<Vec<StudySessionRow>, BackendError> {
        let inner = self.lock()?;
        let mut rows: Vec<StudySessionRow> = inner
            .study_sessions
            .iter()
            .filter(|row| student_id.is_none_or(|id| row.student_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn create_study_session(
        &self,
        new: NewStudySession,
    ) -> Result<StudySessionRow, BackendError> {
        let mut inner = self.lock()?;
        inner.next_session_id += 1;
        let row = StudySessionRow {
            id: inner.next_session_id,
            student_id: new.student_id,
            subject: Self::subject_ref(&inner, new.subject_id),
            duration_minutes: new.duration_minutes,
            completed_at: None,
            created_at: self.clock.now(),
        };
        inner.study_sessions.push(row.clone());
        Ok(row)
    }

    async fn update_study_session(
        &self,
        id: i64,
        update: StudySessionUpdate,
    ) -> Result<StudySessionRow, BackendError> {
        let mut inner = self.lock()?;
        let row = inner
            .study_sessions
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(BackendError::NotFound)?;

        if let Some(duration) = update.duration_minutes {
            row.duration_minutes = Some(duration);
        }
        if let Some(completed_at) = update.completed_at {
            row.completed_at = Some(completed_at);
        }
        Ok(row.clone())
    }

    async fn list_quiz_attempts(
        &self,
        student_id: Option<Uuid>,
    ) -> Result<Vec<QuizAttemptRow>, BackendError> {
        let inner = self.lock()?;
        let mut rows: Vec<QuizAttemptRow> = inner
            .quiz_attempts
            .iter()
            .filter(|row| student_id.is_none_or(|id| row.student_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(rows)
    }

    async fn create_quiz_attempt(
        &self,
        new: NewQuizAttempt,
    ) -> Result<QuizAttemptRow, BackendError> {
        let mut inner = self.lock()?;
        inner.next_attempt_id += 1;
        let row = QuizAttemptRow {
            id: inner.next_attempt_id,
            student_id: new.student_id,
            subject: Self::subject_ref(&inner, new.subject_id),
            score: Some(new.score),
            correct_answers: Some(new.correct_answers),
            total_questions: Some(new.total_questions),
            time_spent_seconds: new.time_spent_seconds,
            completed_at: Some(new.completed_at),
        };
        inner.quiz_attempts.push(row.clone());
        Ok(row)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
