//! Provider configuration from TOML (`[providers.*]` sections)

use crate::providers::ProviderSettings;
use chorus_domain::{ConfigIssue, ConfigIssueCode, ProviderId};
use serde::{Deserialize, Serialize};

/// Built-in connection defaults for one provider
#[derive(Debug, Clone, Copy)]
pub struct ProviderDefaults {
    pub api_key_env: &'static str,
    pub base_url: &'static str,
    pub model: &'static str,
    pub max_tokens: u32,
}

impl ProviderDefaults {
    pub fn for_provider(provider: ProviderId) -> Self {
        match provider {
            ProviderId::Claude => Self {
                api_key_env: "ANTHROPIC_API_KEY",
                base_url: "https://api.anthropic.com",
                model: "claude-sonnet-4-20250514",
                max_tokens: 1024,
            },
            ProviderId::Gpt => Self {
                api_key_env: "OPENAI_API_KEY",
                base_url: "https://api.openai.com",
                model: "gpt-5.2",
                max_tokens: 1024,
            },
            ProviderId::Llama => Self {
                api_key_env: "TOGETHERAI_API_KEY",
                base_url: "https://api.together.xyz",
                model: "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo",
                max_tokens: 1024,
            },
        }
    }
}

/// One provider's overrides; unset fields fall back to [`ProviderDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Environment variable name for the API key.
    pub api_key_env: Option<String>,
    /// Direct API key (prefer `api_key_env`).
    pub api_key: Option<String>,
    /// Base URL for the API.
    pub base_url: Option<String>,
    /// Model identifier sent to the provider.
    pub model: Option<String>,
    /// Max tokens per response.
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProvidersConfig {
    pub claude: FileProviderConfig,
    pub gpt: FileProviderConfig,
    pub llama: FileProviderConfig,
}

impl FileProvidersConfig {
    pub fn get(&self, provider: ProviderId) -> &FileProviderConfig {
        match provider {
            ProviderId::Claude => &self.claude,
            ProviderId::Gpt => &self.gpt,
            ProviderId::Llama => &self.llama,
        }
    }

    /// Resolve settings, reading the API key from the environment
    ///
    /// A missing key is not an error here; the adapter reports it per call.
    pub fn settings(&self, provider: ProviderId) -> ProviderSettings {
        self.settings_with(provider, |name| std::env::var(name).ok())
    }

    fn settings_with(
        &self,
        provider: ProviderId,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ProviderSettings {
        let defaults = ProviderDefaults::for_provider(provider);
        let file = self.get(provider);
        let api_key_env = file
            .api_key_env
            .clone()
            .unwrap_or_else(|| defaults.api_key_env.to_string());
        let api_key = file.api_key.clone().or_else(|| lookup(&api_key_env));

        ProviderSettings {
            api_key,
            api_key_env,
            base_url: file
                .base_url
                .clone()
                .unwrap_or_else(|| defaults.base_url.to_string()),
            model: file
                .model
                .clone()
                .unwrap_or_else(|| defaults.model.to_string()),
            max_tokens: file.max_tokens.unwrap_or(defaults.max_tokens),
        }
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for provider in ProviderId::ALL {
            let file = self.get(provider);
            for (name, value) in [
                ("model", &file.model),
                ("base_url", &file.base_url),
                ("api_key_env", &file.api_key_env),
            ] {
                if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                    let field = format!("providers.{}.{}", provider, name);
                    issues.push(ConfigIssue::error(
                        ConfigIssueCode::EmptyValue {
                            field: field.clone(),
                        },
                        format!("{} cannot be empty", field),
                    ));
                }
            }
            if file.max_tokens == Some(0) {
                let field = format!("providers.{}.max_tokens", provider);
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::EmptyValue {
                        field: field.clone(),
                    },
                    format!("{} is 0; the provider will reject requests", field),
                ));
            }
        }
        issues
    }
}
