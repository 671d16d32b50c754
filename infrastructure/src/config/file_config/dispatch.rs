//! Dispatch configuration from TOML (`[dispatch]` section)

use chorus_application::DispatchParams;
use chorus_domain::{ConfigIssue, ConfigIssueCode, ProviderId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw dispatch configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDispatchConfig {
    /// Per-provider timeout in seconds
    pub timeout_secs: u64,
    /// Enabled providers ("claude", "gpt", "llama")
    pub providers: Vec<String>,
}

impl Default for FileDispatchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            providers: ProviderId::ALL.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl FileDispatchConfig {
    /// Parse the provider list, skipping unknown entries
    pub fn parse_providers(&self) -> (Vec<ProviderId>, Vec<ConfigIssue>) {
        let mut providers = Vec::new();
        let mut issues = Vec::new();

        for name in &self.providers {
            match name.parse::<ProviderId>() {
                Ok(p) => providers.push(p),
                Err(e) => issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "dispatch.providers".to_string(),
                        value: name.clone(),
                        valid_values: ProviderId::ALL.iter().map(|p| p.to_string()).collect(),
                    },
                    format!("dispatch.providers: {}", e),
                )),
            }
        }

        if self.providers.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::EmptyProviders,
                "dispatch.providers must name at least one provider",
            ));
        }

        (providers, issues)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Convert to application parameters, reporting any issues found
    pub fn to_dispatch_params(&self) -> (DispatchParams, Vec<ConfigIssue>) {
        let (providers, mut issues) = self.parse_providers();
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::ZeroTimeout,
                "dispatch.timeout_secs must be greater than zero",
            ));
        }

        let params = DispatchParams::default()
            .with_timeout(self.timeout())
            .with_providers(providers);
        (params, issues)
    }
}
