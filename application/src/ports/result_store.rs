//! Result store port
//!
//! Persistence contract for completed comparison runs.

use async_trait::async_trait;
use chorus_domain::{ComparisonRun, RunId, RunStats};
use thiserror::Error;

/// Errors that can occur while persisting or querying runs
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage query failed: {0}")]
    Query(String),

    #[error("Run #{0} not found")]
    NotFound(RunId),

    #[error("Run #{0} has provider agreement and cannot be annotated")]
    InvalidAnnotation(RunId),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// Store for comparison runs
///
/// `save` is atomic per run: either the query, every verdict and the
/// consensus columns are durable, or nothing is. No cross-run guarantees.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Persist a completed run and return its new identifier
    async fn save(&self, run: &ComparisonRun) -> Result<RunId, StorageError>;

    /// Fetch a single run by id
    async fn get(&self, id: RunId) -> Result<Option<ComparisonRun>, StorageError>;

    /// Runs without agreement, most recent first
    async fn list_disagreements(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ComparisonRun>, StorageError>;

    /// All runs, most recent first
    async fn list_runs(&self, limit: usize, offset: usize)
    -> Result<Vec<ComparisonRun>, StorageError>;

    /// Aggregate counters over every persisted run
    async fn stats(&self) -> Result<RunStats, StorageError>;

    /// Set the disagreement category of a persisted run
    ///
    /// Fails with [`StorageError::InvalidAnnotation`] when the run's
    /// providers agreed.
    async fn annotate(&self, id: RunId, category: &str) -> Result<ComparisonRun, StorageError>;

    /// Fraction of persisted runs with agreement, in `[0, 1]`
    async fn aggregate_agreement_rate(&self) -> Result<f64, StorageError> {
        Ok(self.stats().await?.agreement_rate())
    }
}
