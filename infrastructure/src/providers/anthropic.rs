//! Anthropic Messages API adapter

use super::prompt::{SAFETY_SYSTEM_PROMPT, user_message};
use super::{ProviderError, ProviderSettings, into_verdict};
use async_trait::async_trait;
use chorus_application::ports::safety_classifier::SafetyClassifier;
use chorus_domain::{ProviderId, SafetyQuery, Verdict};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessagesResponse {
    /// Concatenate the text blocks; other block types are ignored
    fn text(&self) -> String {
        self.content
            .iter()
            .filter(|b| b.kind == "text")
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Claude classifier over the Anthropic Messages API
#[derive(Debug)]
pub struct AnthropicClassifier {
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl AnthropicClassifier {
    pub fn new(settings: ProviderSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    async fn request(&self, query: &SafetyQuery, timeout: Duration) -> Result<String, ProviderError> {
        let api_key = self.settings.api_key()?;

        let body = MessagesRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            system: SAFETY_SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: user_message(query.prompt(), query.category_hint()),
            }],
        };

        let response = self
            .client
            .post(self.settings.endpoint("/v1/messages"))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let parsed: MessagesResponse = response.json().await?;
        Ok(parsed.text())
    }
}

#[async_trait]
impl SafetyClassifier for AnthropicClassifier {
    fn provider(&self) -> ProviderId {
        ProviderId::Claude
    }

    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn classify(&self, query: &SafetyQuery, timeout: Duration) -> Verdict {
        let started = Instant::now();
        let result = self.request(query, timeout).await;
        if let Err(e) = &result {
            warn!("Anthropic request failed: {}", e);
        } else {
            debug!("Anthropic answered in {}ms", started.elapsed().as_millis());
        }
        into_verdict(ProviderId::Claude, result, started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_domain::{Classification, Outcome};

    fn settings(api_key: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            api_key: api_key.map(String::from),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            max_tokens: 1024,
        }
    }

    #[test]
    fn test_response_text_skips_non_text_blocks() {
        let json = r#"{
            "id": "msg_01",
            "type": "message",
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "VERDICT: SAFE"},
                {"type": "text", "text": "Harmless question."}
            ]
        }"#;
        let response: MessagesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), "VERDICT: SAFE\nHarmless question.");
    }

    #[test]
    fn test_request_serialization() {
        let body = MessagesRequest {
            model: "claude-sonnet-4-20250514",
            max_tokens: 1024,
            system: SAFETY_SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: "hi".to_string(),
            }],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["max_tokens"], 1024);
        assert_eq!(value["messages"][0]["role"], "user");
        assert!(value["system"].as_str().unwrap().contains("VERDICT: UNSAFE"));
    }

    #[tokio::test]
    async fn test_missing_key_is_provider_error() {
        let classifier = AnthropicClassifier::new(settings(None));
        let query = SafetyQuery::new("hello").unwrap();

        let verdict = classifier.classify(&query, Duration::from_secs(1)).await;

        assert_eq!(verdict.provider(), ProviderId::Claude);
        assert_eq!(verdict.outcome(), Outcome::ProviderError);
        assert!(verdict.error().unwrap().contains("ANTHROPIC_API_KEY"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_provider_error() {
        let classifier = AnthropicClassifier::new(settings(Some("sk-ant-test")));
        let query = SafetyQuery::new("hello").unwrap();

        let verdict = classifier.classify(&query, Duration::from_secs(2)).await;

        assert_eq!(verdict.outcome(), Outcome::ProviderError);
        assert_ne!(verdict.classification(), Some(Classification::Safe));
    }
}
