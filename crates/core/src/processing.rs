use std::time::Duration;

/// One stage of the post-assessment processing animation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingStep {
    pub title: &'static str,
    pub description: &'static str,
    pub duration: Duration,
}

/// A fixed sequence of timed presentation steps with a cursor.
///
/// The sequence is pure data: the caller sleeps for each step's duration and
/// calls `advance()`, so nothing here touches the wall clock and tests can
/// walk it instantly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingSequence {
    steps: Vec<ProcessingStep>,
    current: usize,
}

impl ProcessingSequence {
    /// Build a sequence from its steps. An empty sequence is already
    /// finished.
    #[must_use]
    pub fn new(steps: Vec<ProcessingStep>) -> Self {
        Self { steps, current: 0 }
    }

    /// The steps shown while assessment results are turned into a study
    /// plan.
    #[must_use]
    pub fn learning_path() -> Self {
        Self::new(vec![
            ProcessingStep {
                title: "Analyzing Responses",
                description: "Evaluating your answers and identifying patterns",
                duration: Duration::from_millis(2000),
            },
            ProcessingStep {
                title: "Identifying Strengths",
                description: "Discovering your academic strengths and preferred learning style",
                duration: Duration::from_millis(2500),
            },
            ProcessingStep {
                title: "Finding Focus Areas",
                description: "Pinpointing areas that need additional attention and practice",
                duration: Duration::from_millis(2000),
            },
            ProcessingStep {
                title: "Creating Learning Path",
                description: "Designing your personalized study plan and recommendations",
                duration: Duration::from_millis(3000),
            },
        ])
    }

    #[must_use]
    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }

    /// The step to show right now; `None` once finished.
    #[must_use]
    pub fn current(&self) -> Option<&ProcessingStep> {
        self.steps.get(self.current)
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current >= self.steps.len()
    }

    /// Move to the next step. Returns false once the sequence is finished.
    pub fn advance(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.current += 1;
        !self.is_finished()
    }

    /// Completed fraction in [0, 1], counting the current step as underway.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction_done(&self) -> f32 {
        if self.steps.is_empty() {
            return 1.0;
        }
        ((self.current.min(self.steps.len() - 1) + 1) as f32) / (self.steps.len() as f32)
    }
}
