//! Dispatch parameters for provider fan-out
//!
//! [`DispatchParams`] groups the static parameters that control how
//! [`FanOutDispatcher`](crate::use_cases::dispatch::FanOutDispatcher)
//! queries providers. These are application-layer concerns, not domain policy.

use chorus_domain::ProviderId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-provider wall-clock budget
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fan-out control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchParams {
    /// Budget applied to every provider call.
    pub timeout: Duration,
    /// Providers queried when a request does not restrict the set.
    pub providers: Vec<ProviderId>,
}

impl Default for DispatchParams {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            providers: ProviderId::ALL.to_vec(),
        }
    }
}

impl DispatchParams {
    // ==================== Builder Methods ====================

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the enabled provider set (sorted, duplicates removed)
    pub fn with_providers(mut self, providers: impl IntoIterator<Item = ProviderId>) -> Self {
        self.providers = normalize_providers(providers);
        self
    }
}

/// Sort and dedupe a provider list so each provider gets one slot
pub fn normalize_providers(providers: impl IntoIterator<Item = ProviderId>) -> Vec<ProviderId> {
    let mut providers: Vec<_> = providers.into_iter().collect();
    providers.sort();
    providers.dedup();
    providers
}
