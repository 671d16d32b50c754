//! Structured configuration issues
//!
//! Config loaders report problems as [`ConfigIssue`] values instead of
//! failing on the first one, so the binary can print every warning and
//! refuse to start only on [`Severity::Error`].
//!
//! ```
//! use chorus_domain::config::{ConfigIssue, ConfigIssueCode, Severity};
//!
//! let issue = ConfigIssue::error(
//!     ConfigIssueCode::ZeroTimeout,
//!     "dispatch.timeout_secs must be greater than zero",
//! );
//! assert!(issue.is_error());
//! ```

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: the configuration works but may not behave as expected.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// The per-provider timeout is zero.
    ZeroTimeout,
    /// No provider is enabled for dispatch.
    EmptyProviders,
    /// A string field does not name a known value.
    InvalidEnumValue {
        field: String,
        value: String,
        valid_values: Vec<String>,
    },
    /// A required string field is empty.
    EmptyValue { field: String },
}

/// A detected issue in the loaded configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.severity {
            Severity::Error => write!(f, "error: {}", self.message),
            Severity::Warning => write!(f, "warning: {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_severity() {
        let err = ConfigIssue::error(ConfigIssueCode::EmptyProviders, "none");
        let warn = ConfigIssue::warning(
            ConfigIssueCode::EmptyValue {
                field: "storage.url".to_string(),
            },
            "empty",
        );
        assert!(err.is_error());
        assert!(!warn.is_error());
        assert_eq!(warn.severity, Severity::Warning);
    }

    #[test]
    fn test_display_prefixes_severity() {
        let issue = ConfigIssue::warning(ConfigIssueCode::ZeroTimeout, "timeout is zero");
        assert_eq!(issue.to_string(), "warning: timeout is zero");
    }
}
