//! Consensus result types

use crate::core::error::DomainError;
use crate::core::provider::ProviderId;
use crate::verdict::Classification;
use serde::{Deserialize, Serialize};

/// Category assigned when no provider produced a usable verdict
pub const CATEGORY_NO_DATA: &str = "no-data";

/// Category assigned when two classifications share the top count
pub const CATEGORY_TIE: &str = "tie";

/// Aggregate view over the verdicts of one run
///
/// Always derived from the verdicts by [`compute`](super::engine::compute);
/// the only field that may be set afterwards is the disagreement
/// [`category`](Self::category).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusResult {
    /// True iff every OK verdict carries the same classification
    pub agreement: bool,
    /// Classification with the strictly highest count among OK verdicts
    pub majority: Option<Classification>,
    /// OK providers whose classification differs from the majority
    pub dissenters: Vec<ProviderId>,
    /// Disagreement tag ("no-data", "tie", or an external annotation)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Size of the voting set
    pub voters: usize,
}

impl ConsensusResult {
    /// Attach a disagreement category supplied by an annotation step
    ///
    /// Only runs without agreement can be categorized.
    pub fn annotate(&mut self, category: impl Into<String>) -> Result<(), DomainError> {
        if self.agreement {
            return Err(DomainError::AnnotationOnAgreement);
        }
        self.category = Some(category.into());
        Ok(())
    }

    /// True when no provider produced a usable verdict
    pub fn is_no_data(&self) -> bool {
        self.voters == 0
    }

    /// True when the top classifications tied
    pub fn is_tie(&self) -> bool {
        self.voters > 0 && self.majority.is_none()
    }

    /// Coarse confidence label for display
    pub fn confidence(&self) -> Confidence {
        match (self.agreement, self.voters) {
            (true, n) if n >= 2 => Confidence::High,
            (true, _) => Confidence::Low,
            _ => Confidence::Uncertain,
        }
    }

    /// Short status label for reports
    pub fn status_label(&self) -> &'static str {
        if self.agreement {
            "AGREEMENT"
        } else if self.is_no_data() {
            "NO_DATA"
        } else {
            "REVIEW_REQUIRED"
        }
    }
}

/// Confidence label derived from agreement and voting-set size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    /// Two or more providers agreed
    High,
    /// A single provider answered
    Low,
    /// Providers disagreed, tied, or none answered
    Uncertain,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::High => write!(f, "high"),
            Confidence::Low => write!(f, "low"),
            Confidence::Uncertain => write!(f, "uncertain"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disagreement() -> ConsensusResult {
        ConsensusResult {
            agreement: false,
            majority: Some(Classification::Safe),
            dissenters: vec![ProviderId::Llama],
            category: None,
            voters: 3,
        }
    }

    #[test]
    fn test_annotate_disagreement() {
        let mut result = disagreement();
        result.annotate("dual-use-information").unwrap();
        assert_eq!(result.category.as_deref(), Some("dual-use-information"));
    }

    #[test]
    fn test_annotate_agreement_rejected() {
        let mut result = ConsensusResult {
            agreement: true,
            majority: Some(Classification::Safe),
            dissenters: vec![],
            category: None,
            voters: 3,
        };
        assert_eq!(
            result.annotate("anything"),
            Err(DomainError::AnnotationOnAgreement)
        );
        assert!(result.category.is_none());
    }

    #[test]
    fn test_confidence_levels() {
        let mut result = disagreement();
        assert_eq!(result.confidence(), Confidence::Uncertain);

        result.agreement = true;
        assert_eq!(result.confidence(), Confidence::High);

        result.voters = 1;
        assert_eq!(result.confidence(), Confidence::Low);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(disagreement().status_label(), "REVIEW_REQUIRED");
        let empty = ConsensusResult {
            agreement: false,
            majority: None,
            dissenters: vec![],
            category: Some(CATEGORY_NO_DATA.to_string()),
            voters: 0,
        };
        assert_eq!(empty.status_label(), "NO_DATA");
        assert!(empty.is_no_data());
        assert!(!empty.is_tie());
    }
}
