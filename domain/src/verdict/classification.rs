//! Classification and outcome tags

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Three-way safety classification shared by every provider
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Classification {
    Safe,
    Unsafe,
    Uncertain,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Safe => "SAFE",
            Classification::Unsafe => "UNSAFE",
            Classification::Uncertain => "UNCERTAIN",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Classification {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "SAFE" => Ok(Classification::Safe),
            "UNSAFE" => Ok(Classification::Unsafe),
            "UNCERTAIN" => Ok(Classification::Uncertain),
            other => Err(DomainError::UnknownClassification(other.to_string())),
        }
    }
}

/// How a provider call settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    /// The provider answered and the answer was mapped to a classification
    Ok,
    /// The provider call failed (auth, network, malformed response, quota)
    ProviderError,
    /// The call did not settle within the dispatch budget
    Timeout,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "OK",
            Outcome::ProviderError => "PROVIDER_ERROR",
            Outcome::Timeout => "TIMEOUT",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Outcome {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OK" => Ok(Outcome::Ok),
            "PROVIDER_ERROR" => Ok(Outcome::ProviderError),
            "TIMEOUT" => Ok(Outcome::Timeout),
            other => Err(DomainError::UnknownOutcome(other.to_string())),
        }
    }
}
