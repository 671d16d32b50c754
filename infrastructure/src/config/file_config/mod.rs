//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod dispatch;
mod output;
mod providers;
mod storage;

pub use dispatch::FileDispatchConfig;
pub use output::FileOutputConfig;
pub use providers::{FileProviderConfig, FileProvidersConfig, ProviderDefaults};
pub use storage::{FileStorageConfig, StorageBackend};

use chorus_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Fan-out settings
    pub dispatch: FileDispatchConfig,
    /// Per-provider connection settings
    pub providers: FileProvidersConfig,
    /// Result store settings
    pub storage: FileStorageConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// This is the single entry point for config validation. It checks:
    /// 1. Dispatch timeout and provider list
    /// 2. Empty provider overrides
    /// 3. Storage backend and URL
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.dispatch.to_dispatch_params().1);
        issues.extend(self.providers.validate());
        issues.extend(self.storage.validate());
        issues
    }
}
