//! Normalized per-provider verdict

use super::classification::{Classification, Outcome};
use crate::core::error::DomainError;
use crate::core::provider::ProviderId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One provider's normalized answer for a query
///
/// The constructors keep the outcome and classification consistent:
/// an [`Outcome::Ok`] verdict always carries a classification, while
/// [`Outcome::ProviderError`] and [`Outcome::Timeout`] never do.
///
/// # Example
///
/// ```
/// use chorus_domain::{Classification, Outcome, ProviderId, Verdict};
/// use std::time::Duration;
///
/// let ok = Verdict::ok(ProviderId::Claude, Classification::Safe, "Harmless.", Duration::from_millis(850));
/// assert_eq!(ok.classification(), Some(Classification::Safe));
///
/// let late = Verdict::timeout(ProviderId::Llama, Duration::from_secs(30));
/// assert_eq!(late.outcome(), Outcome::Timeout);
/// assert!(late.classification().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "VerdictRecord", into = "VerdictRecord")]
pub struct Verdict {
    provider: ProviderId,
    classification: Option<Classification>,
    rationale: String,
    concerns: Vec<String>,
    latency: Duration,
    outcome: Outcome,
    error: Option<String>,
}

impl Verdict {
    /// A successful, parsed provider answer
    pub fn ok(
        provider: ProviderId,
        classification: Classification,
        rationale: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            provider,
            classification: Some(classification),
            rationale: rationale.into(),
            concerns: Vec::new(),
            latency: whole_millis(latency),
            outcome: Outcome::Ok,
            error: None,
        }
    }

    /// A provider-side failure
    pub fn provider_error(
        provider: ProviderId,
        error: impl Into<String>,
        latency: Duration,
    ) -> Self {
        Self {
            provider,
            classification: None,
            rationale: String::new(),
            concerns: Vec::new(),
            latency: whole_millis(latency),
            outcome: Outcome::ProviderError,
            error: Some(error.into()),
        }
    }

    /// A call abandoned after the dispatch budget elapsed
    pub fn timeout(provider: ProviderId, budget: Duration) -> Self {
        Self {
            provider,
            classification: None,
            rationale: String::new(),
            concerns: Vec::new(),
            latency: whole_millis(budget),
            outcome: Outcome::Timeout,
            error: Some(format!("no response within {}ms", budget.as_millis())),
        }
    }

    /// Rebuild a verdict from stored fields, checking the outcome invariant
    pub fn from_parts(
        provider: ProviderId,
        outcome: Outcome,
        classification: Option<Classification>,
        rationale: impl Into<String>,
        latency: Duration,
        error: Option<String>,
    ) -> Result<Self, DomainError> {
        match (outcome, classification) {
            (Outcome::Ok, None) => {
                return Err(DomainError::InconsistentVerdict {
                    provider,
                    reason: "OK outcome without a classification".to_string(),
                });
            }
            (Outcome::ProviderError | Outcome::Timeout, Some(c)) => {
                return Err(DomainError::InconsistentVerdict {
                    provider,
                    reason: format!("{} outcome with classification {}", outcome, c),
                });
            }
            _ => {}
        }

        Ok(Self {
            provider,
            classification,
            rationale: rationale.into(),
            concerns: Vec::new(),
            latency: whole_millis(latency),
            outcome,
            error,
        })
    }

    /// Attach provider concerns (only meaningful for OK verdicts)
    pub fn with_concerns(mut self, concerns: Vec<String>) -> Self {
        self.concerns = concerns;
        self
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    pub fn classification(&self) -> Option<Classification> {
        self.classification
    }

    pub fn rationale(&self) -> &str {
        &self.rationale
    }

    pub fn concerns(&self) -> &[String] {
        &self.concerns
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether this verdict belongs to the voting set
    pub fn is_voting(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Latency is kept at millisecond resolution, the resolution it is stored at
fn whole_millis(latency: Duration) -> Duration {
    Duration::from_millis(latency.as_millis().min(u64::MAX as u128) as u64)
}

/// Flat serde shape for [`Verdict`]
#[derive(Serialize, Deserialize)]
struct VerdictRecord {
    provider: ProviderId,
    outcome: Outcome,
    classification: Option<Classification>,
    #[serde(default)]
    rationale: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    concerns: Vec<String>,
    latency_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TryFrom<VerdictRecord> for Verdict {
    type Error = DomainError;

    fn try_from(record: VerdictRecord) -> Result<Self, Self::Error> {
        Verdict::from_parts(
            record.provider,
            record.outcome,
            record.classification,
            record.rationale,
            Duration::from_millis(record.latency_ms),
            record.error,
        )
        .map(|v| v.with_concerns(record.concerns))
    }
}

impl From<Verdict> for VerdictRecord {
    fn from(verdict: Verdict) -> Self {
        Self {
            provider: verdict.provider,
            outcome: verdict.outcome,
            classification: verdict.classification,
            rationale: verdict.rationale,
            concerns: verdict.concerns,
            latency_ms: verdict.latency.as_millis() as u64,
            error: verdict.error,
        }
    }
}
