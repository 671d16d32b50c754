//! Infrastructure layer for chorus
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: HTTP provider adapters, result stores,
//! and configuration file loading.

pub mod config;
pub mod providers;
pub mod storage;

// Re-export commonly used types
pub use config::{
    ConfigLoader, FileConfig, FileDispatchConfig, FileOutputConfig, FileProvidersConfig,
    FileStorageConfig, StorageBackend,
};
pub use providers::{
    AnthropicClassifier, OpenAiClassifier, ProviderError, ProviderSettings, build_classifiers,
};
pub use storage::{InMemoryResultStore, SqliteResultStore, SqliteStoreConfig};
