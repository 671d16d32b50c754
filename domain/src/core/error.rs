//! Domain error types

use crate::core::provider::ProviderId;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No providers configured")]
    NoProviders,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Unknown provider: {0}. Valid: claude, gpt, llama")]
    UnknownProvider(String),

    #[error("Unknown classification: {0}")]
    UnknownClassification(String),

    #[error("Unknown outcome: {0}")]
    UnknownOutcome(String),

    #[error("Inconsistent verdict for {provider}: {reason}")]
    InconsistentVerdict { provider: ProviderId, reason: String },

    #[error("Duplicate verdict for provider {0}")]
    DuplicateVerdict(ProviderId),

    #[error("Cannot annotate a run whose providers agreed")]
    AnnotationOnAgreement,

    #[error("Stored consensus does not match the verdicts")]
    InconsistentConsensus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_provider_lists_valid_keys() {
        let error = DomainError::UnknownProvider("gemini".to_string());
        assert_eq!(
            error.to_string(),
            "Unknown provider: gemini. Valid: claude, gpt, llama"
        );
    }

    #[test]
    fn test_inconsistent_verdict_display() {
        let error = DomainError::InconsistentVerdict {
            provider: ProviderId::Gpt,
            reason: "missing classification".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Inconsistent verdict for gpt: missing classification"
        );
    }
}
