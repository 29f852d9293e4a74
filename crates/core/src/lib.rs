#![forbid(unsafe_code)]

pub mod assessment;
pub mod countdown;
pub mod error;
pub mod model;
pub mod processing;
pub mod time;

pub use assessment::{Assessment, AssessmentProgress, Phase};
pub use countdown::{Countdown, Stopwatch, Tick};
pub use error::Error;
pub use processing::{ProcessingSequence, ProcessingStep};
pub use time::Clock;
