//! Fan-out dispatcher
//!
//! Queries every enabled provider concurrently and settles exactly one
//! verdict per provider.

use crate::config::{DispatchParams, normalize_providers};
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::safety_classifier::SafetyClassifier;
use chorus_domain::{ProviderId, SafetyQuery, Verdict};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Concurrent dispatcher over the registered provider adapters
///
/// Every provider gets a fixed result slot. Each adapter call runs in its
/// own task under the same wall-clock budget; a call that does not settle
/// in time is replaced with a `TIMEOUT` verdict, and a task that dies
/// (panic, cancellation) or a provider without a registered adapter is
/// replaced with a `PROVIDER_ERROR` verdict. The returned set is sorted by
/// provider.
pub struct FanOutDispatcher {
    classifiers: BTreeMap<ProviderId, Arc<dyn SafetyClassifier>>,
    params: DispatchParams,
}

impl FanOutDispatcher {
    pub fn new(
        classifiers: impl IntoIterator<Item = Arc<dyn SafetyClassifier>>,
        params: DispatchParams,
    ) -> Self {
        let classifiers = classifiers
            .into_iter()
            .map(|c| (c.provider(), c))
            .collect();
        Self {
            classifiers,
            params,
        }
    }

    pub fn params(&self) -> &DispatchParams {
        &self.params
    }

    /// Providers that have an adapter registered
    pub fn registered(&self) -> Vec<ProviderId> {
        self.classifiers.keys().copied().collect()
    }

    /// Dispatch to the configured providers with default (no-op) progress
    pub async fn run(&self, query: &SafetyQuery) -> Vec<Verdict> {
        self.run_with_progress(query, &self.params.providers, &NoProgress)
            .await
    }

    /// Dispatch to an explicit provider set with progress callbacks
    pub async fn run_with_progress(
        &self,
        query: &SafetyQuery,
        providers: &[ProviderId],
        progress: &dyn ProgressNotifier,
    ) -> Vec<Verdict> {
        let providers = normalize_providers(providers.iter().copied());
        let budget = self.params.timeout;

        info!(
            "Dispatching to {} providers (timeout {}ms)",
            providers.len(),
            budget.as_millis()
        );
        progress.on_dispatch_start(&providers);

        let mut slots: BTreeMap<ProviderId, Option<Verdict>> =
            providers.iter().map(|p| (*p, None)).collect();
        let mut join_set = JoinSet::new();

        for provider in &providers {
            let Some(classifier) = self.classifiers.get(provider) else {
                warn!("No adapter registered for {}", provider);
                let verdict = Verdict::provider_error(
                    *provider,
                    format!("no adapter registered for {}", provider),
                    Duration::ZERO,
                );
                progress.on_provider_complete(&verdict);
                slots.insert(*provider, Some(verdict));
                continue;
            };

            let classifier = Arc::clone(classifier);
            let query = query.clone();
            let provider = *provider;

            join_set.spawn(async move {
                let verdict = Self::classify_within(classifier.as_ref(), &query, budget).await;
                (provider, verdict)
            });
        }

        while let Some(result) = join_set.join_next().await {
            match result {
                Ok((provider, verdict)) => {
                    let verdict = Self::check_identity(provider, verdict);
                    debug!(
                        "{} settled: {} in {}ms",
                        provider,
                        verdict.outcome(),
                        verdict.latency().as_millis()
                    );
                    progress.on_provider_complete(&verdict);
                    slots.insert(provider, Some(verdict));
                }
                Err(e) => {
                    warn!("Provider task join error: {}", e);
                }
            }
        }

        let verdicts: Vec<Verdict> = slots
            .into_iter()
            .map(|(provider, slot)| {
                slot.unwrap_or_else(|| {
                    let verdict = Verdict::provider_error(
                        provider,
                        "provider task terminated before producing a verdict",
                        Duration::ZERO,
                    );
                    progress.on_provider_complete(&verdict);
                    verdict
                })
            })
            .collect();

        progress.on_dispatch_complete();
        verdicts
    }

    /// Run one adapter call under the budget, substituting a timeout verdict
    async fn classify_within(
        classifier: &dyn SafetyClassifier,
        query: &SafetyQuery,
        budget: Duration,
    ) -> Verdict {
        let started = Instant::now();
        match tokio::time::timeout(budget, classifier.classify(query, budget)).await {
            Ok(verdict) => verdict,
            Err(_) => {
                warn!(
                    "{} timed out after {}ms",
                    classifier.provider(),
                    started.elapsed().as_millis()
                );
                Verdict::timeout(classifier.provider(), budget)
            }
        }
    }

    /// Guard the one-verdict-per-slot invariant against a misbehaving adapter
    fn check_identity(slot: ProviderId, verdict: Verdict) -> Verdict {
        if verdict.provider() == slot {
            return verdict;
        }
        warn!(
            "Adapter for {} returned a verdict for {}; discarding",
            slot,
            verdict.provider()
        );
        Verdict::provider_error(
            slot,
            format!("adapter returned a verdict for {}", verdict.provider()),
            verdict.latency(),
        )
    }
}
