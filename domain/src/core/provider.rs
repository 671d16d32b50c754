//! Provider identifier value object

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// One of the fixed set of safety-classification providers (Value Object)
///
/// The string key (`claude`, `gpt`, `llama`) is what appears in
/// configuration files, on the command line and in storage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Anthropic Claude
    Claude,
    /// OpenAI GPT
    Gpt,
    /// Meta Llama served by Together
    Llama,
}

impl ProviderId {
    /// Every provider, in canonical order
    pub const ALL: [ProviderId; 3] = [ProviderId::Claude, ProviderId::Gpt, ProviderId::Llama];

    /// Get the stable key for this provider
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Claude => "claude",
            ProviderId::Gpt => "gpt",
            ProviderId::Llama => "llama",
        }
    }

    /// Human-facing name used in reports
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Claude => "Claude",
            ProviderId::Gpt => "GPT",
            ProviderId::Llama => "Llama",
        }
    }

    /// Company or service hosting the model
    pub fn vendor(&self) -> &'static str {
        match self {
            ProviderId::Claude => "Anthropic",
            ProviderId::Gpt => "OpenAI",
            ProviderId::Llama => "Together",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ProviderId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(ProviderId::Claude),
            "gpt" | "openai" => Ok(ProviderId::Gpt),
            "llama" | "together" => Ok(ProviderId::Llama),
            other => Err(DomainError::UnknownProvider(other.to_string())),
        }
    }
}
