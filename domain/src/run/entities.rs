//! Comparison run entity

use crate::consensus::{self, ConsensusResult};
use crate::core::error::DomainError;
use crate::core::provider::ProviderId;
use crate::core::query::SafetyQuery;
use crate::verdict::{Classification, Verdict};
use serde::{Deserialize, Serialize};

/// Identifier assigned by the result store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub i64);

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RunId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().trim_start_matches('#').parse().map(RunId)
    }
}

/// One full comparison cycle for a single prompt (Entity)
///
/// Owns its query and verdicts exclusively. Verdicts are unique per
/// provider and kept in provider order; the consensus is computed once on
/// construction and never recomputed except when restoring from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RunRecord")]
pub struct ComparisonRun {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<RunId>,
    query: SafetyQuery,
    verdicts: Vec<Verdict>,
    consensus: ConsensusResult,
}

impl ComparisonRun {
    /// Build a run from settled verdicts and compute its consensus
    pub fn new(query: SafetyQuery, mut verdicts: Vec<Verdict>) -> Result<Self, DomainError> {
        verdicts.sort_by_key(|v| v.provider());
        if let Some(pair) = verdicts
            .windows(2)
            .find(|w| w[0].provider() == w[1].provider())
        {
            return Err(DomainError::DuplicateVerdict(pair[0].provider()));
        }

        let consensus = consensus::compute(&verdicts);
        Ok(Self {
            id: None,
            query,
            verdicts,
            consensus,
        })
    }

    /// Restore a persisted run, re-deriving its consensus and reapplying the stored category
    pub fn restore(
        id: RunId,
        query: SafetyQuery,
        verdicts: Vec<Verdict>,
        category: Option<String>,
    ) -> Result<Self, DomainError> {
        let mut run = Self::new(query, verdicts)?.with_id(id);
        run.reapply_category(category)?;
        Ok(run)
    }

    fn reapply_category(&mut self, category: Option<String>) -> Result<(), DomainError> {
        if let Some(category) = category {
            // Mechanical tags are already derived; only annotations need reapplying.
            if self.consensus.category.as_deref() != Some(category.as_str()) {
                self.consensus.annotate(category)?;
            }
        }
        Ok(())
    }

    /// Attach the store-assigned identifier
    pub fn with_id(mut self, id: RunId) -> Self {
        self.id = Some(id);
        self
    }

    /// Set the disagreement category (only allowed when providers disagreed)
    pub fn annotate(&mut self, category: impl Into<String>) -> Result<(), DomainError> {
        self.consensus.annotate(category)
    }

    pub fn id(&self) -> Option<RunId> {
        self.id
    }

    pub fn query(&self) -> &SafetyQuery {
        &self.query
    }

    pub fn verdicts(&self) -> &[Verdict] {
        &self.verdicts
    }

    pub fn consensus(&self) -> &ConsensusResult {
        &self.consensus
    }

    /// The verdict of a specific provider, if it was configured for this run
    pub fn verdict(&self, provider: ProviderId) -> Option<&Verdict> {
        self.verdicts.iter().find(|v| v.provider() == provider)
    }

    /// Verdicts whose outcome is OK
    pub fn voting_set(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| v.is_voting())
    }

    /// Providers that classified the prompt as UNSAFE
    pub fn flagged_by(&self) -> Vec<ProviderId> {
        self.voting_set()
            .filter(|v| v.classification() == Some(Classification::Unsafe))
            .map(|v| v.provider())
            .collect()
    }

    /// True when no provider produced a usable verdict
    pub fn all_failed(&self) -> bool {
        self.consensus.is_no_data()
    }
}

/// Serde input shape for [`ComparisonRun`], validated on the way in
#[derive(Deserialize)]
struct RunRecord {
    #[serde(default)]
    id: Option<RunId>,
    query: SafetyQuery,
    verdicts: Vec<Verdict>,
    consensus: ConsensusResult,
}

impl TryFrom<RunRecord> for ComparisonRun {
    type Error = DomainError;

    fn try_from(record: RunRecord) -> Result<Self, Self::Error> {
        let mut run = Self::new(record.query, record.verdicts)?;
        run.id = record.id;

        let stored = record.consensus;
        let derived = &run.consensus;
        if stored.agreement != derived.agreement
            || stored.majority != derived.majority
            || stored.dissenters != derived.dissenters
            || stored.voters != derived.voters
        {
            return Err(DomainError::InconsistentConsensus);
        }

        run.reapply_category(stored.category)?;
        Ok(run)
    }
}
