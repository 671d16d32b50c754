//! Comparison runs and the statistics derived from them

pub mod entities;
pub mod stats;

pub use entities::{ComparisonRun, RunId};
pub use stats::{NO_MAJORITY_KEY, RunStats};
