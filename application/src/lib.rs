//! Application layer for chorus
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{DEFAULT_TIMEOUT, DispatchParams};
pub use ports::{
    progress::{NoProgress, ProgressNotifier},
    result_store::{ResultStore, StorageError},
    safety_classifier::SafetyClassifier,
};
pub use use_cases::dispatch::FanOutDispatcher;
pub use use_cases::submit_comparison::{
    ComparisonOutcome, SubmitComparisonError, SubmitComparisonInput, SubmitComparisonUseCase,
};
