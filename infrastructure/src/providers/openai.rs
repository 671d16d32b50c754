//! OpenAI-compatible Chat Completions adapter
//!
//! Serves both OpenAI (GPT) and Together (Llama), which speak the same
//! request and response format.

use super::prompt::{SAFETY_SYSTEM_PROMPT, user_message};
use super::{ProviderError, ProviderSettings, into_verdict};
use async_trait::async_trait;
use chorus_application::ports::safety_classifier::SafetyClassifier;
use chorus_domain::{ProviderId, SafetyQuery, Verdict};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    /// OpenAI's reasoning models reject `max_tokens` and take this instead
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn text(self) -> Result<String, ProviderError> {
        self.choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| ProviderError::InvalidResponse("no choices in response".to_string()))
    }
}

/// Classifier over an OpenAI-compatible chat completions endpoint
#[derive(Debug)]
pub struct OpenAiClassifier {
    provider: ProviderId,
    settings: ProviderSettings,
    client: reqwest::Client,
}

impl OpenAiClassifier {
    pub fn new(provider: ProviderId, settings: ProviderSettings) -> Self {
        Self {
            provider,
            settings,
            client: reqwest::Client::new(),
        }
    }

    fn chat_request(&self, query: &SafetyQuery) -> ChatRequest<'_> {
        let limit = Some(self.settings.max_tokens);
        let (max_tokens, max_completion_tokens) = match self.provider {
            ProviderId::Gpt => (None, limit),
            _ => (limit, None),
        };

        ChatRequest {
            model: &self.settings.model,
            messages: vec![
                Message {
                    role: "system",
                    content: SAFETY_SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user",
                    content: user_message(query.prompt(), query.category_hint()),
                },
            ],
            max_tokens,
            max_completion_tokens,
        }
    }

    async fn request(&self, query: &SafetyQuery, timeout: Duration) -> Result<String, ProviderError> {
        let api_key = self.settings.api_key()?;
        let body = self.chat_request(query);

        let response = self
            .client
            .post(self.settings.endpoint("/v1/chat/completions"))
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed.text()
    }
}

#[async_trait]
impl SafetyClassifier for OpenAiClassifier {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn classify(&self, query: &SafetyQuery, timeout: Duration) -> Verdict {
        let started = Instant::now();
        let result = self.request(query, timeout).await;
        match &result {
            Ok(_) => debug!(
                "{} answered in {}ms",
                self.provider.vendor(),
                started.elapsed().as_millis()
            ),
            Err(e) => warn!("{} request failed: {}", self.provider.vendor(), e),
        }
        into_verdict(self.provider, result, started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_domain::Outcome;

    fn settings(model: &str) -> ProviderSettings {
        ProviderSettings {
            api_key: Some("sk-test".to_string()),
            api_key_env: "TEST_KEY".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
            model: model.to_string(),
            max_tokens: 1024,
        }
    }

    #[test]
    fn test_gpt_request_uses_max_completion_tokens() {
        let classifier = OpenAiClassifier::new(ProviderId::Gpt, settings("gpt-5.2"));
        let query = SafetyQuery::new("hello").unwrap();

        let body = serde_json::to_value(classifier.chat_request(&query)).unwrap();

        assert_eq!(body["model"], "gpt-5.2");
        assert_eq!(body["max_completion_tokens"], 1024);
        assert!(body.get("max_tokens").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hello");
    }

    #[test]
    fn test_together_request_uses_max_tokens() {
        let classifier = OpenAiClassifier::new(
            ProviderId::Llama,
            settings("meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo"),
        );
        let query = SafetyQuery::new("hello").unwrap();

        let body = serde_json::to_value(classifier.chat_request(&query)).unwrap();

        assert_eq!(body["max_tokens"], 1024);
        assert!(body.get("max_completion_tokens").is_none());
    }

    #[test]
    fn test_response_first_choice() {
        let json = r#"{
            "id": "chatcmpl-1",
            "model": "gpt-5.2",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "VERDICT: UNSAFE\nWeapons."}},
                {"index": 1, "message": {"role": "assistant", "content": "VERDICT: SAFE"}}
            ]
        }"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().unwrap(), "VERDICT: UNSAFE\nWeapons.");
    }

    #[test]
    fn test_null_content_is_empty_text() {
        let json = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text().unwrap(), "");
    }

    #[test]
    fn test_no_choices_is_invalid() {
        let response: ChatResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            response.text(),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_names_env_var() {
        let classifier = OpenAiClassifier::new(
            ProviderId::Llama,
            ProviderSettings {
                api_key: None,
                api_key_env: "TOGETHERAI_API_KEY".to_string(),
                base_url: "https://api.together.xyz".to_string(),
                model: "meta-llama/Meta-Llama-3.1-70B-Instruct-Turbo".to_string(),
                max_tokens: 1024,
            },
        );
        let query = SafetyQuery::new("hello").unwrap();

        let verdict = classifier.classify(&query, Duration::from_secs(1)).await;

        assert_eq!(verdict.provider(), ProviderId::Llama);
        assert_eq!(verdict.outcome(), Outcome::ProviderError);
        assert!(verdict.error().unwrap().contains("TOGETHERAI_API_KEY"));
    }
}
