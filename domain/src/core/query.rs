//! Safety query value object

use crate::core::error::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A prompt submitted for safety classification (Value Object)
///
/// Created once per comparison request and never mutated. The same query
/// is sent to every configured provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyQuery {
    prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    category_hint: Option<String>,
    submitted_at: DateTime<Utc>,
}

impl SafetyQuery {
    /// Create a new query stamped with the current time
    ///
    /// Fails if the prompt is empty or only whitespace.
    pub fn new(prompt: impl Into<String>) -> Result<Self, DomainError> {
        Self::at(prompt, Utc::now())
    }

    /// Create a query with an explicit submission time (e.g. when restoring from storage)
    pub fn at(prompt: impl Into<String>, submitted_at: DateTime<Utc>) -> Result<Self, DomainError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(DomainError::InvalidQuery(
                "prompt cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            prompt,
            category_hint: None,
            submitted_at,
        })
    }

    /// Attach a category hint; blank hints are ignored
    pub fn with_category_hint(mut self, hint: impl Into<String>) -> Self {
        let hint = hint.into();
        self.category_hint = if hint.trim().is_empty() {
            None
        } else {
            Some(hint)
        };
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn category_hint(&self) -> Option<&str> {
        self.category_hint.as_deref()
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    /// First `max_chars` characters of the prompt, with an ellipsis if cut
    pub fn preview(&self, max_chars: usize) -> String {
        let mut chars = self.prompt.chars();
        let head: String = chars.by_ref().take(max_chars).collect();
        if chars.next().is_some() {
            format!("{}...", head)
        } else {
            head
        }
    }
}

impl std::fmt::Display for SafetyQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prompt)
    }
}
