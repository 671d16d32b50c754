//! In-memory result store
//!
//! Keeps runs for the lifetime of the process. Used with
//! `storage.backend = "memory"` and in tests.

use async_trait::async_trait;
use chorus_application::ports::result_store::{ResultStore, StorageError};
use chorus_domain::{ComparisonRun, DomainError, NO_MAJORITY_KEY, RunId, RunStats};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    runs: RwLock<Vec<ComparisonRun>>,
}

impl InMemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent first, filtered, then paged
    async fn page(
        &self,
        limit: usize,
        offset: usize,
        keep: impl Fn(&ComparisonRun) -> bool,
    ) -> Vec<ComparisonRun> {
        self.runs
            .read()
            .await
            .iter()
            .rev()
            .filter(|r| keep(r))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ResultStore for InMemoryResultStore {
    async fn save(&self, run: &ComparisonRun) -> Result<RunId, StorageError> {
        let mut runs = self.runs.write().await;
        let id = RunId(runs.len() as i64 + 1);
        runs.push(run.clone().with_id(id));
        Ok(id)
    }

    async fn get(&self, id: RunId) -> Result<Option<ComparisonRun>, StorageError> {
        Ok(self
            .runs
            .read()
            .await
            .iter()
            .find(|r| r.id() == Some(id))
            .cloned())
    }

    async fn list_disagreements(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ComparisonRun>, StorageError> {
        Ok(self
            .page(limit, offset, |r| !r.consensus().agreement)
            .await)
    }

    async fn list_runs(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ComparisonRun>, StorageError> {
        Ok(self.page(limit, offset, |_| true).await)
    }

    async fn stats(&self) -> Result<RunStats, StorageError> {
        let runs = self.runs.read().await;
        let mut stats = RunStats {
            total_runs: runs.len(),
            ..Default::default()
        };
        for run in runs.iter() {
            let consensus = run.consensus();
            if consensus.agreement {
                stats.agreeing_runs += 1;
            }
            if consensus.is_no_data() {
                stats.no_data_runs += 1;
            }
            let key = consensus
                .majority
                .map(|c| c.as_str())
                .unwrap_or(NO_MAJORITY_KEY);
            *stats.by_majority.entry(key.to_string()).or_default() += 1;
        }
        Ok(stats)
    }

    async fn annotate(&self, id: RunId, category: &str) -> Result<ComparisonRun, StorageError> {
        let mut runs = self.runs.write().await;
        let run = runs
            .iter_mut()
            .find(|r| r.id() == Some(id))
            .ok_or(StorageError::NotFound(id))?;
        run.annotate(category).map_err(|e| match e {
            DomainError::AnnotationOnAgreement => StorageError::InvalidAnnotation(id),
            other => StorageError::Corrupt(other.to_string()),
        })?;
        Ok(run.clone())
    }
}
