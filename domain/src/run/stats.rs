//! Aggregate statistics over persisted runs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key used in [`RunStats::by_majority`] for runs without a majority
pub const NO_MAJORITY_KEY: &str = "NONE";

/// Summary of all persisted comparison runs
///
/// Always computed from storage on demand; never kept as a running counter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// Number of persisted runs
    pub total_runs: usize,
    /// Runs where every OK verdict agreed
    pub agreeing_runs: usize,
    /// Runs where no provider produced a usable verdict
    pub no_data_runs: usize,
    /// Run count per majority classification ("SAFE", "UNSAFE", "UNCERTAIN", "NONE")
    pub by_majority: BTreeMap<String, usize>,
}

impl RunStats {
    /// Runs where providers disagreed (including ties and no-data runs)
    pub fn disagreeing_runs(&self) -> usize {
        self.total_runs.saturating_sub(self.agreeing_runs)
    }

    /// Fraction of runs with agreement, in `[0, 1]`; `0.0` when empty
    pub fn agreement_rate(&self) -> f64 {
        if self.total_runs == 0 {
            0.0
        } else {
            self.agreeing_runs as f64 / self.total_runs as f64
        }
    }
}
