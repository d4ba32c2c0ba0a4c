//! Discrepancy aggregation and obstruction summaries.

use std::sync::atomic::{AtomicUsize, Ordering};

use opver_core::errors::{ErrorInfo, OpverError, PROBE_KEY};
use opver_core::{RngHandle, Side};
use rand::seq::index;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::ProbeDomain;
use crate::dual::{euclidean_norm, DualEvaluator, PointwiseDiscrepancy};
use crate::policies::{FailurePolicy, Tolerances};

const SPOT_CHECK_STREAM: u64 = 1;

/// Options governing the evaluation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Number of worker threads; `1` evaluates probes sequentially in order.
    pub concurrency: usize,
    /// Handling of probes where an evaluator fails.
    pub failure_policy: FailurePolicy,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            failure_policy: FailurePolicy::Fatal,
        }
    }
}

/// Discrepancy recorded for one evaluated probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEntry {
    /// Index of the probe in its [`ProbeDomain`].
    pub probe: usize,
    /// Element-wise `reference - candidate`.
    pub difference: Vec<f64>,
    /// Euclidean norm of `difference`.
    pub norm: f64,
}

/// Probe left out of aggregation under [`FailurePolicy::SkipAndContinue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcludedProbe {
    /// Index of the probe in its [`ProbeDomain`].
    pub probe: usize,
    /// Side that failed, when the failure was an evaluation error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    /// Error that caused the exclusion.
    pub error: OpverError,
}

/// Per-probe discrepancies across a domain, ordered by probe index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscrepancyField {
    entries: Vec<FieldEntry>,
    excluded: Vec<ExcludedProbe>,
    domain_size: usize,
}

impl DiscrepancyField {
    /// Builds a field from entries, sorting them by probe index.
    pub fn new(
        mut entries: Vec<FieldEntry>,
        mut excluded: Vec<ExcludedProbe>,
        domain_size: usize,
    ) -> Self {
        entries.sort_by_key(|entry| entry.probe);
        excluded.sort_by_key(|probe| probe.probe);
        Self {
            entries,
            excluded,
            domain_size,
        }
    }

    /// Evaluated entries in probe order.
    pub fn entries(&self) -> &[FieldEntry] {
        &self.entries
    }

    /// Probes excluded by the skip policy, in probe order.
    pub fn excluded(&self) -> &[ExcludedProbe] {
        &self.excluded
    }

    /// Size of the domain the field was computed over.
    pub fn domain_size(&self) -> usize {
        self.domain_size
    }

    /// Number of evaluated probes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no probe was evaluated.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for a probe index, if it was evaluated.
    pub fn entry(&self, probe: usize) -> Option<&FieldEntry> {
        self.entries
            .binary_search_by_key(&probe, |entry| entry.probe)
            .ok()
            .map(|position| &self.entries[position])
    }

    /// Per-probe norms in probe order.
    pub fn norms(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|entry| entry.norm)
    }
}

/// Magnitude bucket of a global obstruction norm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MagnitudeClass {
    /// Below the first breakpoint.
    MachinePrecision,
    /// Below the second breakpoint.
    NumericalZero,
    /// Below the third breakpoint.
    Negligible,
    /// Everything else.
    Significant,
}

impl MagnitudeClass {
    /// Classifies `norm` against ascending breakpoints.
    pub fn classify(norm: f64, breakpoints: &[f64]) -> Self {
        const ORDER: [MagnitudeClass; 3] = [
            MagnitudeClass::MachinePrecision,
            MagnitudeClass::NumericalZero,
            MagnitudeClass::Negligible,
        ];
        breakpoints
            .iter()
            .zip(ORDER)
            .find(|(bound, _)| norm < **bound)
            .map(|(_, class)| class)
            .unwrap_or(MagnitudeClass::Significant)
    }

    /// Human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            MagnitudeClass::MachinePrecision => "machine precision",
            MagnitudeClass::NumericalZero => "numerical zero",
            MagnitudeClass::Negligible => "negligible",
            MagnitudeClass::Significant => "significant",
        }
    }
}

/// Read-only summary derived from a [`DiscrepancyField`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstructionSummary {
    /// Euclidean norm of the per-probe norm sequence.
    pub global_norm: f64,
    /// Whether the obstruction vanishes under the tolerance.
    pub vanishes: bool,
    /// Tolerance used for `vanishes` and the support set.
    pub tolerance: f64,
    /// Probes whose norm exceeds the tolerance.
    pub support: Vec<usize>,
    /// Evaluated probes whose norm is within tolerance.
    pub zero_set: Vec<usize>,
    /// Largest per-probe norm, zero for an empty field.
    pub max_norm: f64,
    /// Smallest per-probe norm, zero for an empty field.
    pub min_norm: f64,
    /// Probe attaining `max_norm`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_probe: Option<usize>,
    /// Number of evaluated probes.
    pub evaluated: usize,
    /// Number of probes excluded by the skip policy.
    pub excluded: usize,
    /// Magnitude bucket of `global_norm`.
    pub magnitude: MagnitudeClass,
}

enum ProbeOutcome {
    Done(PointwiseDiscrepancy),
    Failed(OpverError),
    Cancelled,
}

fn evaluate_probe(
    evaluator: &DualEvaluator<'_>,
    index: usize,
    point: &[f64],
    policy: FailurePolicy,
    first_fatal: &AtomicUsize,
) -> ProbeOutcome {
    if index > first_fatal.load(Ordering::Relaxed) {
        return ProbeOutcome::Cancelled;
    }
    match evaluator.discrepancy_at(index, point) {
        Ok(discrepancy) => ProbeOutcome::Done(discrepancy),
        Err(err) => {
            if policy == FailurePolicy::Fatal || !matches!(err, OpverError::Evaluation(_)) {
                first_fatal.fetch_min(index, Ordering::Relaxed);
            }
            ProbeOutcome::Failed(err)
        }
    }
}

/// Evaluates both sides at every probe and collects the discrepancies.
///
/// Results are always reassembled in probe order, whatever the concurrency.
/// A fatal failure records its index in a shared watermark and every probe
/// above the watermark is skipped. Probes below it still run, so the error
/// returned is the lowest-index failing probe, as in a sequential run.
/// Shape mismatches are fatal under every policy; only evaluation errors can
/// be skipped.
pub fn aggregate(
    domain: &ProbeDomain,
    evaluator: &DualEvaluator<'_>,
    opts: &AggregateOptions,
) -> Result<DiscrepancyField, OpverError> {
    let first_fatal = AtomicUsize::new(usize::MAX);
    let outcomes: Vec<ProbeOutcome> = if opts.concurrency <= 1 {
        domain
            .iter()
            .map(|(index, point)| {
                evaluate_probe(evaluator, index, point, opts.failure_policy, &first_fatal)
            })
            .collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.concurrency)
            .build()
            .map_err(|err| {
                OpverError::Config(ErrorInfo::new("thread-pool", err.to_string()))
            })?;
        pool.install(|| {
            domain
                .points()
                .par_iter()
                .enumerate()
                .map(|(index, point)| {
                    evaluate_probe(evaluator, index, point, opts.failure_policy, &first_fatal)
                })
                .collect()
        })
    };

    let mut entries = Vec::with_capacity(outcomes.len());
    let mut excluded = Vec::new();
    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            ProbeOutcome::Done(discrepancy) => entries.push(FieldEntry {
                probe: index,
                difference: discrepancy.difference,
                norm: discrepancy.norm,
            }),
            ProbeOutcome::Failed(err) => {
                let skippable = opts.failure_policy == FailurePolicy::SkipAndContinue
                    && matches!(err, OpverError::Evaluation(_));
                if !skippable {
                    debug!(probe = index, error = %err, "aborting aggregation");
                    return Err(err);
                }
                warn!(probe = index, error = %err, "excluding probe from aggregation");
                excluded.push(ExcludedProbe {
                    probe: index,
                    side: err.side(),
                    error: err,
                });
            }
            ProbeOutcome::Cancelled => {}
        }
    }
    debug!(
        evaluated = entries.len(),
        excluded = excluded.len(),
        "aggregation complete"
    );
    Ok(DiscrepancyField::new(entries, excluded, domain.len()))
}

/// Derives the obstruction summary of a field under `tolerances`.
///
/// `vanishes` holds when the global norm is below the tolerance, and always
/// when the global norm is exactly zero.
pub fn summarize(field: &DiscrepancyField, tolerances: &Tolerances) -> ObstructionSummary {
    let tolerance = tolerances.vanish_tolerance;
    let norms: Vec<f64> = field.norms().collect();
    let global_norm = euclidean_norm(&norms);
    let vanishes = global_norm == 0.0 || global_norm < tolerance;

    let (support, zero_set): (Vec<_>, Vec<_>) = field
        .entries()
        .iter()
        .map(|entry| (entry.probe, entry.norm > tolerance))
        .partition(|(_, exceeds)| *exceeds);
    let support = support.into_iter().map(|(probe, _)| probe).collect();
    let zero_set = zero_set.into_iter().map(|(probe, _)| probe).collect();

    let max_entry = field
        .entries()
        .iter()
        .max_by(|a, b| a.norm.total_cmp(&b.norm));
    let min_norm = field
        .entries()
        .iter()
        .map(|entry| entry.norm)
        .min_by(f64::total_cmp)
        .unwrap_or(0.0);

    ObstructionSummary {
        global_norm,
        vanishes,
        tolerance,
        support,
        zero_set,
        max_norm: max_entry.map(|entry| entry.norm).unwrap_or(0.0),
        min_norm,
        max_probe: max_entry.map(|entry| entry.probe),
        evaluated: field.len(),
        excluded: field.excluded().len(),
        magnitude: MagnitudeClass::classify(global_norm, &tolerances.magnitude_breakpoints),
    }
}

/// Agreement details for a single spot-checked probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotDetail {
    /// Probe index.
    pub probe: usize,
    /// Norm of the discrepancy at the probe.
    pub error_norm: f64,
    /// Whether the norm is below the tolerance.
    pub agrees: bool,
}

/// Outcome of inspecting a subset of probes individually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalAgreement {
    /// Number of probes inspected.
    pub total_probes: usize,
    /// Probes with norm below tolerance.
    pub agreement_count: usize,
    /// Probes with norm at or above tolerance.
    pub disagreement_count: usize,
    /// Largest norm among inspected probes.
    pub max_local_error: f64,
    /// Per-probe details in the order requested.
    pub details: Vec<SpotDetail>,
}

/// Picks `min(count, field.len())` distinct evaluated probes, sorted ascending.
pub fn select_spot_probes(field: &DiscrepancyField, count: usize, seed: u64) -> Vec<usize> {
    let available = field.len();
    let amount = count.min(available);
    let mut rng = RngHandle::substream(seed, SPOT_CHECK_STREAM);
    let mut picked: Vec<usize> = index::sample(&mut rng, available, amount)
        .into_iter()
        .map(|position| field.entries()[position].probe)
        .collect();
    picked.sort_unstable();
    picked
}

/// Checks local agreement on the given probes.
pub fn local_agreement(
    field: &DiscrepancyField,
    probes: &[usize],
    tolerance: f64,
) -> Result<LocalAgreement, OpverError> {
    let mut details = Vec::with_capacity(probes.len());
    for &probe in probes {
        let entry = field.entry(probe).ok_or_else(|| {
            OpverError::Domain(
                ErrorInfo::new(
                    "probe-not-evaluated",
                    "spot check requested a probe that is not in the field",
                )
                .with_context(PROBE_KEY, probe),
            )
        })?;
        details.push(SpotDetail {
            probe,
            error_norm: entry.norm,
            agrees: entry.norm < tolerance,
        });
    }
    let agreement_count = details.iter().filter(|detail| detail.agrees).count();
    Ok(LocalAgreement {
        total_probes: details.len(),
        agreement_count,
        disagreement_count: details.len() - agreement_count,
        max_local_error: details
            .iter()
            .map(|detail| detail.error_norm)
            .fold(0.0, f64::max),
        details,
    })
}
