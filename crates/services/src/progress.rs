use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use uuid::Uuid;

use backend::StudyApi;

use crate::error::ProgressError;

/// Per-subject rollup for the progress overview.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectProgress {
    pub name: String,
    pub total_hours: f64,
    pub session_count: u32,
    pub quiz_count: u32,
    pub average_score: f64,
}

/// Aggregates study sessions and quiz attempts into per-subject progress.
#[derive(Clone)]
pub struct ProgressService {
    study: Arc<dyn StudyApi>,
}

impl ProgressService {
    #[must_use]
    pub fn new(study: Arc<dyn StudyApi>) -> Self {
        Self { study }
    }

    /// One entry per subject the student has touched, ordered by name.
    ///
    /// Only completed study sessions count toward hours; quiz scores fold
    /// into a running average. Rows whose subject reference is missing land
    /// under `"Unknown"` rather than being dropped.
    ///
    /// # Errors
    ///
    /// Returns the backend error when either fetch fails.
    pub async fn subject_progress(
        &self,
        student_id: Uuid,
    ) -> Result<Vec<SubjectProgress>, ProgressError> {
        let sessions = self.study.list_study_sessions(Some(student_id)).await?;
        let attempts = self.study.list_quiz_attempts(Some(student_id)).await?;

        let mut by_subject: BTreeMap<String, SubjectProgress> = BTreeMap::new();

        for session in sessions.iter().filter(|s| s.is_completed()) {
            let entry = entry_for(&mut by_subject, session.subject_name());
            entry.total_hours += f64::from(session.duration_minutes.unwrap_or(0)) / 60.0;
            entry.session_count += 1;
        }

        for attempt in &attempts {
            let entry = entry_for(&mut by_subject, attempt.subject_name());
            entry.quiz_count += 1;
            entry.average_score = (entry.average_score * f64::from(entry.quiz_count - 1)
                + attempt.score_or_zero())
                / f64::from(entry.quiz_count);
        }

        Ok(by_subject.into_values().collect())
    }
}

fn entry_for<'a>(
    by_subject: &'a mut BTreeMap<String, SubjectProgress>,
    name: &str,
) -> &'a mut SubjectProgress {
    by_subject
        .entry(name.to_string())
        .or_insert_with(|| SubjectProgress {
            name: name.to_string(),
            ..SubjectProgress::default()
        })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
