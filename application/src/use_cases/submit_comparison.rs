//! Submit Comparison use case
//!
//! The single entry point of the core: classify one prompt with every
//! enabled provider, compute consensus, persist the run.

use crate::config::normalize_providers;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::result_store::{ResultStore, StorageError};
use crate::use_cases::dispatch::FanOutDispatcher;
use chorus_domain::{ComparisonRun, DomainError, ProviderId, RunId, SafetyQuery};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors that prevent a comparison from starting
#[derive(Error, Debug)]
pub enum SubmitComparisonError {
    #[error("No providers enabled")]
    NoProviders,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Input for the SubmitComparison use case
#[derive(Debug, Clone)]
pub struct SubmitComparisonInput {
    /// Prompt text to classify
    pub prompt: String,
    /// Optional caller-supplied category hint
    pub category_hint: Option<String>,
    /// Restrict the run to these providers (defaults to the configured set)
    pub providers: Option<Vec<ProviderId>>,
    /// Whether to persist the run
    pub save: bool,
}

impl SubmitComparisonInput {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            category_hint: None,
            providers: None,
            save: true,
        }
    }

    pub fn with_category_hint(mut self, hint: impl Into<String>) -> Self {
        self.category_hint = Some(hint.into());
        self
    }

    pub fn with_providers(mut self, providers: impl IntoIterator<Item = ProviderId>) -> Self {
        self.providers = Some(providers.into_iter().collect());
        self
    }

    pub fn without_save(mut self) -> Self {
        self.save = false;
        self
    }
}

/// Result of a submitted comparison
///
/// The run is always present. The all-failed and storage-failure
/// conditions are reported alongside it rather than replacing it.
#[derive(Debug)]
pub struct ComparisonOutcome {
    pub run: ComparisonRun,
    /// No provider produced a usable verdict
    pub all_failed: bool,
    /// Set when persisting the run failed
    pub storage_error: Option<StorageError>,
}

impl ComparisonOutcome {
    /// Identifier assigned by the store, if the run was persisted
    pub fn run_id(&self) -> Option<RunId> {
        self.run.id()
    }

    pub fn is_persisted(&self) -> bool {
        self.run.id().is_some()
    }
}

/// Use case for submitting one prompt to all enabled providers
pub struct SubmitComparisonUseCase {
    dispatcher: Arc<FanOutDispatcher>,
    store: Option<Arc<dyn ResultStore>>,
}

impl SubmitComparisonUseCase {
    pub fn new(dispatcher: Arc<FanOutDispatcher>, store: Arc<dyn ResultStore>) -> Self {
        Self {
            dispatcher,
            store: Some(store),
        }
    }

    /// A use case that never persists, for dry runs
    pub fn without_store(dispatcher: Arc<FanOutDispatcher>) -> Self {
        Self {
            dispatcher,
            store: None,
        }
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: SubmitComparisonInput,
    ) -> Result<ComparisonOutcome, SubmitComparisonError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: SubmitComparisonInput,
        progress: &dyn ProgressNotifier,
    ) -> Result<ComparisonOutcome, SubmitComparisonError> {
        let providers = normalize_providers(
            input
                .providers
                .unwrap_or_else(|| self.dispatcher.params().providers.clone()),
        );
        if providers.is_empty() {
            return Err(SubmitComparisonError::NoProviders);
        }

        let mut query = SafetyQuery::new(input.prompt)?;
        if let Some(hint) = input.category_hint {
            query = query.with_category_hint(hint);
        }

        info!("Submitting comparison: {}", query.preview(60));

        let verdicts = self
            .dispatcher
            .run_with_progress(&query, &providers, progress)
            .await;
        let mut run = ComparisonRun::new(query, verdicts)?;

        let all_failed = run.all_failed();
        if all_failed {
            warn!("All {} providers failed; recording a no-data run", providers.len());
        } else {
            let consensus = run.consensus();
            info!(
                "Consensus: {} (majority: {}, dissenters: {})",
                consensus.status_label(),
                consensus
                    .majority
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none".to_string()),
                consensus.dissenters.len()
            );
        }

        let mut storage_error = None;
        match (&self.store, input.save) {
            (Some(store), true) => match store.save(&run).await {
                Ok(id) => {
                    info!("Saved run #{}", id);
                    run = run.with_id(id);
                }
                Err(e) => {
                    warn!("Failed to save run: {}", e);
                    storage_error = Some(e);
                }
            },
            _ => info!("Run not persisted"),
        }

        Ok(ComparisonOutcome {
            run,
            all_failed,
            storage_error,
        })
    }
}
