//! Application-level configuration.
//!
//! - [`DispatchParams`]: fan-out control (timeout budget, enabled providers)

pub mod dispatch_params;

pub use dispatch_params::{DEFAULT_TIMEOUT, DispatchParams, normalize_providers};
