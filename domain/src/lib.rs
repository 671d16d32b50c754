//! Domain layer for chorus
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Verdict
//!
//! One provider's answer to a [`SafetyQuery`]: a [`Classification`]
//! (SAFE / UNSAFE / UNCERTAIN) plus rationale, or a failure
//! [`Outcome`] (PROVIDER_ERROR / TIMEOUT) that carries no classification.
//!
//! ## Consensus
//!
//! Only OK verdicts vote. [`consensus::compute`] reports agreement,
//! the strict majority and the dissenting providers. Disagreements are
//! the point of the tool: they are flagged and stored, never resolved.
//!
//! ## Comparison run
//!
//! A [`ComparisonRun`] ties a query to its verdicts and their consensus,
//! and is the unit persisted by the result store.

pub mod config;
pub mod consensus;
pub mod core;
pub mod run;
pub mod verdict;

pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use consensus::{CATEGORY_NO_DATA, CATEGORY_TIE, Confidence, ConsensusResult};
pub use core::{error::DomainError, provider::ProviderId, query::SafetyQuery};
pub use run::{ComparisonRun, NO_MAJORITY_KEY, RunId, RunStats};
pub use verdict::{
    Classification, Outcome, ParsedResponse, Verdict, parse_safety_response,
};
