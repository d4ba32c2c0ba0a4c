#![deny(missing_docs)]
#![doc = "Differential-equivalence verification: probe sampling, dual evaluation, discrepancy aggregation, complexity estimates and coincidence bounds."]

/// Discrepancy aggregation, summaries and spot checks.
pub mod aggregate;
/// Coincidence probability bounds.
pub mod bound;
/// Description-length complexity estimates.
pub mod complexity;
/// Probe domain sampling.
pub mod domain;
/// Paired reference/candidate evaluation.
pub mod dual;
/// Canonical hashing helpers.
pub mod hash;
/// Run orchestration and state machine.
pub mod orchestrator;
/// Tolerance and run configuration.
pub mod policies;
/// Verification report types.
pub mod report;
/// Canonical JSON and YAML helpers.
pub mod serde;

pub use aggregate::{
    aggregate, local_agreement, select_spot_probes, summarize, AggregateOptions,
    DiscrepancyField, ExcludedProbe, FieldEntry, LocalAgreement, MagnitudeClass,
    ObstructionSummary, SpotDetail,
};
pub use bound::{
    coincidence_bound, compound, confidence, single_trial_bound, CoincidenceBound, Probability,
};
pub use complexity::{
    canonical_field_bytes, complexity_report, estimate, estimate_description, estimate_field,
    ComplexityReport, Description,
};
pub use domain::{generate, generate_seeded, sample, DomainSpec, ProbeDomain, SamplingStrategy};
pub use dual::{DualEvaluator, PointwiseDiscrepancy};
pub use hash::stable_hash_string;
pub use orchestrator::{verify, VerificationInputs, Verifier};
pub use policies::{
    load_config, FailurePolicy, SpotCheckSpec, Tolerances, VerificationConfig,
};
pub use report::{DomainDigest, RunState, Verdict, VerificationReport};
pub use crate::serde::{from_json_slice, to_canonical_json_bytes};
