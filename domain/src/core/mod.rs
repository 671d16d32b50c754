//! Core domain concepts shared across all subdomains.
//!
//! - [`provider::ProviderId`]: the fixed set of classification providers
//! - [`query::SafetyQuery`]: a validated prompt to classify
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod provider;
pub mod query;
