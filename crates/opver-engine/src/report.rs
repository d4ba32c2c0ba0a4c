use opver_core::errors::OpverError;
use opver_core::RunProvenance;
use serde::{Deserialize, Serialize};

use crate::aggregate::{ExcludedProbe, LocalAgreement, ObstructionSummary};
use crate::bound::CoincidenceBound;
use crate::complexity::ComplexityReport;
use crate::domain::{ProbeDomain, SamplingStrategy};
use crate::hash::stable_hash_string;
use crate::serde::to_canonical_json_bytes;

/// Lifecycle states of a verification run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunState {
    /// Building the probe domain.
    Sampling,
    /// Evaluating both sides at every probe.
    Evaluating,
    /// Summarising, estimating complexity and computing bounds.
    Reporting,
    /// Terminal state entered on any component error.
    Failed,
}

/// Final classification of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "outcome", content = "error")]
pub enum Verdict {
    /// The obstruction vanishes: evaluators agree on the domain.
    Confirmed,
    /// Evaluated, but the evaluators disagree.
    DiscrepancyDetected,
    /// Could not evaluate; carries the originating error.
    Failed(OpverError),
}

impl Verdict {
    /// Stable label for rendering.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Confirmed => "confirmed",
            Verdict::DiscrepancyDetected => "discrepancy detected",
            Verdict::Failed(_) => "failed",
        }
    }
}

/// Shape of the domain a run was evaluated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainDigest {
    /// Coordinates per probe.
    pub dimension: usize,
    /// Probe count asked for.
    pub requested: usize,
    /// Probe count generated.
    pub actual: usize,
    /// Grid resolution, absent for seeded domains.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_per_axis: Option<usize>,
    /// Placement strategy.
    pub strategy: SamplingStrategy,
}

impl From<&ProbeDomain> for DomainDigest {
    fn from(domain: &ProbeDomain) -> Self {
        Self {
            dimension: domain.dimension(),
            requested: domain.requested(),
            actual: domain.len(),
            points_per_axis: domain.points_per_axis(),
            strategy: domain.strategy(),
        }
    }
}

/// Immutable result of one verification run.
///
/// Stage outputs are `None` when the run failed before producing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Final classification.
    pub verdict: Verdict,
    /// Terminal state, `Reporting` or `Failed`.
    pub final_state: RunState,
    /// Every state the run passed through, in order.
    pub state_trace: Vec<RunState>,
    /// Domain the run sampled.
    pub domain: Option<DomainDigest>,
    /// Obstruction summary of the discrepancy field.
    pub summary: Option<ObstructionSummary>,
    /// Complexity estimates.
    pub complexity: Option<ComplexityReport>,
    /// Coincidence bounds.
    pub bound: Option<CoincidenceBound>,
    /// Probes excluded under the skip policy.
    #[serde(default)]
    pub excluded: Vec<ExcludedProbe>,
    /// Spot check over a seeded subset of probes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_check: Option<LocalAgreement>,
    /// Provenance of the run.
    pub provenance: RunProvenance,
}

impl VerificationReport {
    /// Whether the verdict is [`Verdict::Confirmed`].
    pub fn is_confirmed(&self) -> bool {
        self.verdict == Verdict::Confirmed
    }

    /// Originating error for failed runs.
    pub fn error(&self) -> Option<&OpverError> {
        match &self.verdict {
            Verdict::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Content hash of the canonical JSON encoding.
    pub fn digest(&self) -> Result<String, OpverError> {
        stable_hash_string(self)
    }

    /// Canonical JSON bytes of the report.
    pub fn to_bytes(&self) -> Result<Vec<u8>, OpverError> {
        to_canonical_json_bytes(self)
    }
}
