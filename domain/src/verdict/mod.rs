//! Per-provider verdicts
//!
//! - [`classification`]: the SAFE / UNSAFE / UNCERTAIN classification and outcome tags
//! - [`entities::Verdict`]: one provider's normalized answer
//! - [`parsing`]: text-to-classification parsing shared by all adapters

pub mod classification;
pub mod entities;
pub mod parsing;

pub use classification::{Classification, Outcome};
pub use entities::Verdict;
pub use parsing::{ParsedResponse, parse_safety_response};
