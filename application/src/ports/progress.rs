//! Progress notification port
//!
//! Defines the interface for reporting progress while providers are queried.

use chorus_domain::{ProviderId, Verdict};

/// Callback for progress updates during a dispatch
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (spinner, plain lines, nothing).
pub trait ProgressNotifier: Send + Sync {
    /// Called once before any provider is queried
    fn on_dispatch_start(&self, providers: &[ProviderId]);

    /// Called as each provider's slot is resolved
    fn on_provider_complete(&self, verdict: &Verdict);

    /// Called after every slot is resolved
    fn on_dispatch_complete(&self);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_dispatch_start(&self, _providers: &[ProviderId]) {}
    fn on_provider_complete(&self, _verdict: &Verdict) {}
    fn on_dispatch_complete(&self) {}
}
