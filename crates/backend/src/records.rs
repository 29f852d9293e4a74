use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//
// ─── IDENTITY ──────────────────────────────────────────────────────────────────
//

/// Account role on the platform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Student,
    Teacher,
}

/// Whether an account is usable. Rows the service never filled in count as
/// active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Inactive,
}

/// A row from the user-profiles table.
///
/// The hosted service leaves optional columns null rather than omitting the
/// row, so every display path goes through an accessor with a stated
/// default instead of ad hoc fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub grade_level: Option<u8>,
    #[serde(default)]
    pub status: AccountStatus,
}

impl UserProfile {
    /// Name to show in headers and rosters: the full name when present,
    /// otherwise the local part of the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Metadata attached to a signup request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUserProfile {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub school_name: Option<String>,
    #[serde(default)]
    pub grade_level: Option<u8>,
}

/// Partial profile update; absent fields stay untouched server-side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<u8>,
}

/// An authenticated session as returned by sign-in/sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: UserProfile,
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

//
// ─── SUBJECTS ──────────────────────────────────────────────────────────────────
//

/// A row from the subjects table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRow {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub subject_type: Option<String>,
}

/// Embedded subject reference on session/attempt rows.
///
/// Every field is optional because the join can come back null when the
/// subject row was deleted; `display_name` states the default once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRef {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subject_type: Option<String>,
}

impl SubjectRef {
    /// Subject name for display; `"Unknown"` when the reference is empty.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unknown")
    }
}

impl From<&SubjectRow> for SubjectRef {
    fn from(row: &SubjectRow) -> Self {
        Self {
            id: Some(row.id),
            name: Some(row.name.clone()),
            subject_type: row.subject_type.clone(),
        }
    }
}

//
// ─── STUDY SESSIONS ────────────────────────────────────────────────────────────
//

/// A row from the study-sessions table, with the subject join embedded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySessionRow {
    pub id: i64,
    pub student_id: Uuid,
    #[serde(default)]
    pub subject: Option<SubjectRef>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl StudySessionRow {
    #[must_use]
    pub fn subject_name(&self) -> &str {
        self.subject
            .as_ref()
            .map_or("Unknown", SubjectRef::display_name)
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Write shape for starting a study session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudySession {
    pub student_id: Uuid,
    pub subject_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// Partial update for a study session (typically completion).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySessionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

//
// ─── QUIZ ATTEMPTS ─────────────────────────────────────────────────────────────
//

/// A row from the quiz-attempts table, with the subject join embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttemptRow {
    pub id: i64,
    pub student_id: Uuid,
    #[serde(default)]
    pub subject: Option<SubjectRef>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub correct_answers: Option<u32>,
    #[serde(default)]
    pub total_questions: Option<u32>,
    #[serde(default)]
    pub time_spent_seconds: Option<u32>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl QuizAttemptRow {
    #[must_use]
    pub fn subject_name(&self) -> &str {
        self.subject
            .as_ref()
            .map_or("Unknown", SubjectRef::display_name)
    }

    /// Score with the stated default: missing scores count as zero.
    #[must_use]
    pub fn score_or_zero(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }
}

/// Write shape for recording a finished quiz attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuizAttempt {
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub score: f64,
    pub correct_answers: u32,
    pub total_questions: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_spent_seconds: Option<u32>,
    pub completed_at: DateTime<Utc>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
