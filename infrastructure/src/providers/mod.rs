//! Provider adapters
//!
//! One [`SafetyClassifier`] per provider family. Each adapter sends the
//! shared [`prompt::SAFETY_SYSTEM_PROMPT`], maps transport and API failures
//! to a `PROVIDER_ERROR` verdict, and parses the answer text with
//! [`parse_safety_response`].

pub mod anthropic;
pub mod openai;
pub mod prompt;

pub use anthropic::AnthropicClassifier;
pub use openai::OpenAiClassifier;

use chorus_application::ports::safety_classifier::SafetyClassifier;
use chorus_domain::{ProviderId, Verdict, parse_safety_response};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failures inside a provider adapter
///
/// Never leaves the adapter: it is rendered into the verdict's error text.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("API key not set (expected in ${0})")]
    MissingApiKey(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timed out")]
    Timeout,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::InvalidResponse(e.to_string())
        } else {
            ProviderError::Connection(e.to_string())
        }
    }
}

/// Resolved connection settings for one adapter
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    /// API key, if one was found; absence fails at call time
    pub api_key: Option<String>,
    /// Name of the environment variable the key is read from (for messages)
    pub api_key_env: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
}

impl ProviderSettings {
    fn api_key(&self) -> Result<&str, ProviderError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ProviderError::MissingApiKey(self.api_key_env.clone()))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Build the verdict for a raw answer or an adapter failure
pub(crate) fn into_verdict(
    provider: ProviderId,
    result: Result<String, ProviderError>,
    latency: Duration,
) -> Verdict {
    match result {
        Ok(text) => {
            let parsed = parse_safety_response(&text);
            Verdict::ok(provider, parsed.classification, parsed.rationale, latency)
                .with_concerns(parsed.concerns)
        }
        Err(e) => Verdict::provider_error(provider, e.to_string(), latency),
    }
}

/// Create the adapter for each provider from resolved settings
pub fn build_classifiers(
    settings: impl IntoIterator<Item = (ProviderId, ProviderSettings)>,
) -> Vec<Arc<dyn SafetyClassifier>> {
    settings
        .into_iter()
        .map(|(provider, settings)| -> Arc<dyn SafetyClassifier> {
            match provider {
                ProviderId::Claude => Arc::new(AnthropicClassifier::new(settings)),
                ProviderId::Gpt | ProviderId::Llama => {
                    Arc::new(OpenAiClassifier::new(provider, settings))
                }
            }
        })
        .collect()
}
