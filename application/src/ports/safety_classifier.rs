//! Safety classifier port
//!
//! Defines the interface every provider adapter implements.

use async_trait::async_trait;
use chorus_domain::{ProviderId, SafetyQuery, Verdict};
use std::time::Duration;

/// One provider's safety classification endpoint
///
/// Implementations live in the infrastructure layer. `classify` never
/// fails outward: auth, network, quota and malformed-response problems are
/// returned as a [`Verdict`] with a `PROVIDER_ERROR` outcome.
///
/// The `timeout` is advisory. Adapters may pass it to their transport, but
/// enforcing the budget (and producing the `TIMEOUT` verdict) is the
/// dispatcher's job.
#[async_trait]
pub trait SafetyClassifier: Send + Sync {
    /// Which provider this adapter talks to
    fn provider(&self) -> ProviderId;

    /// Model identifier sent to the provider
    fn model(&self) -> &str;

    /// Classify a query, returning exactly one verdict for [`Self::provider`]
    async fn classify(&self, query: &SafetyQuery, timeout: Duration) -> Verdict;
}
