//! Consensus over provider verdicts
//!
//! Given the verdicts of one run, decide whether the providers agree,
//! which classification holds the majority and who dissented.
//!
//! ```text
//! verdicts ──► voting set (OK only) ──► tally ──► majority / tie / no-data
//!                                                    │
//!                                                    ▼
//!                                  agreement, dissenters, category
//! ```
//!
//! The engine flags *that* providers disagreed, never *why*: the
//! disagreement category is either one of the mechanical tags
//! ([`CATEGORY_NO_DATA`], [`CATEGORY_TIE`]) or an external annotation.

pub mod engine;
pub mod result;

pub use engine::compute;
pub use result::{CATEGORY_NO_DATA, CATEGORY_TIE, Confidence, ConsensusResult};
