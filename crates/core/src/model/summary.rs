use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::answer::AnswerRecord;

//
// ─── PERFORMANCE LEVEL ─────────────────────────────────────────────────────────
//

/// Coarse label for a percentage score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceLevel {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
}

impl PerformanceLevel {
    /// Maps a 0-100 score to a level (80/70/60 cut points).
    #[must_use]
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            80.. => PerformanceLevel::Excellent,
            70..=79 => PerformanceLevel::Good,
            60..=69 => PerformanceLevel::Fair,
            _ => PerformanceLevel::NeedsImprovement,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            PerformanceLevel::Excellent => "Excellent",
            PerformanceLevel::Good => "Good",
            PerformanceLevel::Fair => "Fair",
            PerformanceLevel::NeedsImprovement => "Needs Improvement",
        }
    }
}

impl fmt::Display for PerformanceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── ASSESSMENT SUMMARY ────────────────────────────────────────────────────────
//

/// Aggregate outcome of an assessment attempt.
///
/// `total_questions` is the bank size, independent of how many questions the
/// log actually covers, so a partially-abandoned attempt still reports the
/// full denominator the flow advertised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentSummary {
    total_questions: usize,
    answered: usize,
    attempted: usize,
    correct: usize,
    skipped: usize,
    accuracy_percent: u8,
}

impl AssessmentSummary {
    /// Fold an answer-record log into a summary.
    ///
    /// Accuracy is `correct / attempted` rounded to the nearest percent,
    /// where attempted means a non-null selection. Skipped records count
    /// toward the log but not the accuracy denominator.
    #[must_use]
    pub fn from_records(total_questions: usize, records: &[AnswerRecord]) -> Self {
        let answered = records.len();
        let attempted = records.iter().filter(|r| r.attempted()).count();
        let correct = records.iter().filter(|r| r.is_correct()).count();
        let skipped = records.iter().filter(|r| r.is_skipped()).count();

        let accuracy_percent = percent_of(correct, attempted);

        Self {
            total_questions,
            answered,
            attempted,
            correct,
            skipped,
            accuracy_percent,
        }
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.total_questions
    }

    /// Records in the log, skips included.
    #[must_use]
    pub fn answered(&self) -> usize {
        self.answered
    }

    /// Records with a non-null selection.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.attempted
    }

    #[must_use]
    pub fn correct(&self) -> usize {
        self.correct
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Accuracy over attempted questions, rounded to the nearest percent.
    ///
    /// Zero when nothing was attempted.
    #[must_use]
    pub fn accuracy_percent(&self) -> u8 {
        self.accuracy_percent
    }

    #[must_use]
    pub fn performance_level(&self) -> PerformanceLevel {
        PerformanceLevel::from_percent(self.accuracy_percent)
    }
}

/// `numerator / denominator` as a rounded 0-100 percentage; 0 for an empty
/// denominator.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent_of(numerator: usize, denominator: usize) -> u8 {
    if denominator == 0 {
        return 0;
    }
    let pct = (numerator as f64 / denominator as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
