use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use backend::{NewQuizAttempt, QuizAttemptRow, StudyApi};
use learnpath_core::model::{QuestionBank, Subject};
use learnpath_core::{Assessment, Clock, ProcessingSequence};

use crate::error::AssessmentServiceError;

/// Drives placement assessments and persists their results.
///
/// The engine itself stays in-memory and local; nothing is written until
/// `save_results` is called explicitly, so navigating away abandons the
/// attempt.
#[derive(Clone)]
pub struct AssessmentService {
    clock: Clock,
    study: Arc<dyn StudyApi>,
}

impl AssessmentService {
    #[must_use]
    pub fn new(clock: Clock, study: Arc<dyn StudyApi>) -> Self {
        Self { clock, study }
    }

    /// A fresh attempt over the built-in placement bank.
    #[must_use]
    pub fn start(&self) -> Assessment {
        Assessment::placement()
    }

    /// A fresh attempt over a custom bank.
    #[must_use]
    pub fn start_with_bank(&self, bank: QuestionBank) -> Assessment {
        Assessment::new(bank)
    }

    /// The steps the results screen animates while results are saved.
    #[must_use]
    pub fn processing_sequence(&self) -> ProcessingSequence {
        ProcessingSequence::learning_path()
    }

    /// Persist a completed assessment as one quiz attempt per subject.
    ///
    /// Subject names from the bank are resolved against the backend's
    /// subject table; subjects without a backend row are skipped with a
    /// warning rather than failing the whole save. Subjects the student
    /// never reached (no records) are skipped silently.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentServiceError::NotComplete` unless the assessment
    /// reached its terminal phase, and backend errors from the writes.
    pub async fn save_results(
        &self,
        student_id: Uuid,
        assessment: &Assessment,
    ) -> Result<Vec<QuizAttemptRow>, AssessmentServiceError> {
        if !assessment.is_complete() {
            return Err(AssessmentServiceError::NotComplete);
        }

        let subjects = self.study.list_subjects().await?;
        let by_name: HashMap<&str, Uuid> =
            subjects.iter().map(|s| (s.name.as_str(), s.id)).collect();

        let completed_at = self.clock.now();
        let mut created = Vec::new();

        for subject in assessment.bank().subjects() {
            let records: Vec<_> = assessment
                .records()
                .iter()
                .filter(|r| r.subject() == subject.name())
                .collect();
            if records.is_empty() {
                continue;
            }

            let Some(&subject_id) = by_name.get(subject.name()) else {
                tracing::warn!(
                    "subject '{}' has no backend row, skipping its attempt",
                    subject.name()
                );
                continue;
            };

            let correct = records.iter().filter(|r| r.is_correct()).count();
            let attempt = NewQuizAttempt {
                student_id,
                subject_id,
                score: subject_score(correct, subject),
                correct_answers: u32::try_from(correct).unwrap_or(u32::MAX),
                total_questions: u32::try_from(subject.question_count()).unwrap_or(u32::MAX),
                time_spent_seconds: None,
                completed_at,
            };
            created.push(self.study.create_quiz_attempt(attempt).await?);
        }

        tracing::debug!("saved {} assessment attempts", created.len());
        Ok(created)
    }
}

/// Per-subject score over the subject's full question list, in percent.
#[allow(clippy::cast_precision_loss)]
fn subject_score(correct: usize, subject: &Subject) -> f64 {
    if subject.question_count() == 0 {
        return 0.0;
    }
    (correct as f64 / subject.question_count() as f64 * 100.0).round()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use backend::InMemoryBackend;
    use learnpath_core::Phase;
    use learnpath_core::time::fixed_clock;

    fn complete_assessment(assessment: &mut Assessment) {
        assessment.start();
        loop {
            match assessment.phase() {
                Phase::SubjectTransition => assessment.begin_subject(),
                Phase::Question => {
                    let correct = assessment
                        .current_question()
                        .unwrap()
                        .correct_option()
                        .clone();
                    assessment.select_answer(correct);
                    assessment.confirm_answer();
                    assessment.confirm_answer();
                }
                _ => break,
            }
        }
        assessment.complete_processing();
    }

    #[tokio::test]
    async fn save_results_requires_completion() {
        let fake = InMemoryBackend::new();
        let service = AssessmentService::new(fixed_clock(), Arc::new(fake));

        let assessment = service.start();
        let err = service
            .save_results(Uuid::new_v4(), &assessment)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentServiceError::NotComplete));
    }

    #[tokio::test]
    async fn save_results_creates_one_attempt_per_resolved_subject() {
        let fake = InMemoryBackend::new().with_clock(fixed_clock());
        for name in ["Math", "Science", "English", "History"] {
            fake.add_subject(name, Some("core"));
        }
        let student = Uuid::new_v4();
        let service = AssessmentService::new(fixed_clock(), Arc::new(fake.clone()));

        let mut assessment = service.start();
        complete_assessment(&mut assessment);

        let created = service.save_results(student, &assessment).await.unwrap();
        assert_eq!(created.len(), 4);
        assert!(created.iter().all(|row| row.student_id == student));
        assert!(
            created
                .iter()
                .all(|row| (row.score_or_zero() - 100.0).abs() < f64::EPSILON)
        );

        let math = created
            .iter()
            .find(|row| row.subject_name() == "Math")
            .unwrap();
        assert_eq!(math.correct_answers, Some(2));
        assert_eq!(math.total_questions, Some(2));
    }

    #[tokio::test]
    async fn unresolved_subjects_are_skipped_not_fatal() {
        let fake = InMemoryBackend::new().with_clock(fixed_clock());
        fake.add_subject("Math", None);
        let service = AssessmentService::new(fixed_clock(), Arc::new(fake));

        let mut assessment = service.start();
        complete_assessment(&mut assessment);

        let created = service
            .save_results(Uuid::new_v4(), &assessment)
            .await
            .unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].subject_name(), "Math");
    }

    #[test]
    fn processing_sequence_matches_the_results_screen() {
        let service = AssessmentService::new(fixed_clock(), Arc::new(InMemoryBackend::new()));
        let sequence = service.processing_sequence();
        assert_eq!(sequence.steps().len(), 4);
    }
}
