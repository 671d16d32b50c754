//! Storage configuration from TOML (`[storage]` section)

use chorus_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

/// Which result store backs the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

impl StorageBackend {
    pub const VALID: [&'static str; 2] = ["sqlite", "memory"];
}

/// Raw storage configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStorageConfig {
    /// "sqlite" (default) or "memory"
    pub backend: String,
    /// SQLite database URL
    pub url: String,
}

impl Default for FileStorageConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            url: "sqlite:chorus_results.db?mode=rwc".to_string(),
        }
    }
}

impl FileStorageConfig {
    pub fn parse_backend(&self) -> (StorageBackend, Vec<ConfigIssue>) {
        match self.backend.trim().to_lowercase().as_str() {
            "sqlite" => (StorageBackend::Sqlite, vec![]),
            "memory" => (StorageBackend::Memory, vec![]),
            other => {
                let issue = ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "storage.backend".to_string(),
                        value: other.to_string(),
                        valid_values: StorageBackend::VALID.iter().map(|s| s.to_string()).collect(),
                    },
                    format!(
                        "storage.backend: unknown value '{}' (valid: sqlite, memory)",
                        self.backend
                    ),
                );
                (StorageBackend::Sqlite, vec![issue])
            }
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let (backend, mut issues) = self.parse_backend();
        if backend == StorageBackend::Sqlite && self.url.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyValue {
                    field: "storage.url".to_string(),
                },
                "storage.url cannot be empty for the sqlite backend",
            ));
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sqlite_file() {
        let config = FileStorageConfig::default();
        assert_eq!(config.parse_backend().0, StorageBackend::Sqlite);
        assert!(config.url.contains("chorus_results.db"));
        assert!(config.validate().is_empty());
    }

    #[test]
    fn test_unknown_backend() {
        let config = FileStorageConfig {
            backend: "postgres".to_string(),
            ..Default::default()
        };
        let issues = config.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
    }

    #[test]
    fn test_memory_ignores_url() {
        let config = FileStorageConfig {
            backend: "Memory".to_string(),
            url: String::new(),
        };
        assert_eq!(config.parse_backend().0, StorageBackend::Memory);
        assert!(config.validate().is_empty());
    }
}
