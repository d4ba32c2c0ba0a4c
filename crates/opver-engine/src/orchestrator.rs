use std::collections::BTreeMap;

use opver_core::errors::{ErrorInfo, OpverError};
use opver_core::{Evaluator, RunProvenance, SchemaVersion};
use tracing::{debug, info};

use crate::aggregate::{
    aggregate, local_agreement, select_spot_probes, AggregateOptions, LocalAgreement,
};
use crate::aggregate::{summarize, DiscrepancyField, ExcludedProbe, ObstructionSummary};
use crate::bound::{coincidence_bound, CoincidenceBound};
use crate::complexity::{complexity_report, ComplexityReport, Description};
use crate::domain::{sample, SamplingStrategy};
use crate::dual::DualEvaluator;
use crate::policies::VerificationConfig;
use crate::report::{DomainDigest, RunState, Verdict, VerificationReport};

/// Caller supplied evaluators and their descriptions.
///
/// The coincidence bound assumes the two evaluators were constructed
/// independently of each other. The engine takes that on trust.
pub struct VerificationInputs<'a> {
    /// Theory side.
    pub reference: &'a dyn Evaluator,
    /// Implementation side.
    pub candidate: &'a dyn Evaluator,
    /// Description of the reference, measured for complexity.
    pub reference_description: Description,
    /// Description of the candidate, measured for complexity.
    pub candidate_description: Description,
}

impl std::fmt::Debug for VerificationInputs<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationInputs")
            .field("reference_description", &self.reference_description)
            .field("candidate_description", &self.candidate_description)
            .finish_non_exhaustive()
    }
}

struct RunMachine {
    state: RunState,
    trace: Vec<RunState>,
}

impl RunMachine {
    fn start() -> Self {
        Self {
            state: RunState::Sampling,
            trace: vec![RunState::Sampling],
        }
    }

    fn advance(&mut self, next: RunState) {
        debug!(from = ?self.state, to = ?next, "verification state transition");
        self.state = next;
        self.trace.push(next);
    }
}

#[derive(Default)]
struct Stages {
    domain: Option<DomainDigest>,
    excluded: Vec<ExcludedProbe>,
    summary: Option<ObstructionSummary>,
    complexity: Option<ComplexityReport>,
    bound: Option<CoincidenceBound>,
    spot_check: Option<LocalAgreement>,
}

/// Runs the sample → evaluate → aggregate → estimate → bound pipeline.
#[derive(Debug, Clone, Default)]
pub struct Verifier {
    config: VerificationConfig,
}

impl Verifier {
    /// Creates a verifier for the given configuration.
    pub fn new(config: VerificationConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    /// Executes one run. Component errors never escape: they end the run in
    /// [`RunState::Failed`] with [`Verdict::Failed`] carrying the error. A run
    /// whose probes were all excluded fails too, rather than vanishing.
    pub fn run(&self, inputs: &VerificationInputs<'_>) -> VerificationReport {
        let mut machine = RunMachine::start();
        let mut stages = Stages::default();
        let verdict = match self.execute(inputs, &mut machine, &mut stages) {
            Ok(verdict) => verdict,
            Err(err) => {
                info!(state = ?machine.state, error = %err, "verification failed");
                machine.advance(RunState::Failed);
                Verdict::Failed(err)
            }
        };
        if !matches!(verdict, Verdict::Failed(_)) {
            info!(verdict = verdict.label(), "verification finished");
        }
        VerificationReport {
            verdict,
            final_state: machine.state,
            state_trace: machine.trace,
            domain: stages.domain,
            summary: stages.summary,
            complexity: stages.complexity,
            bound: stages.bound,
            excluded: stages.excluded,
            spot_check: stages.spot_check,
            provenance: self.provenance(),
        }
    }

    fn execute(
        &self,
        inputs: &VerificationInputs<'_>,
        machine: &mut RunMachine,
        stages: &mut Stages,
    ) -> Result<Verdict, OpverError> {
        let config = &self.config;
        config.validate()?;
        let domain = sample(&config.domain)?;
        stages.domain = Some(DomainDigest::from(&domain));
        machine.advance(RunState::Evaluating);

        let dual = DualEvaluator::new(inputs.reference, inputs.candidate);
        let opts = AggregateOptions {
            concurrency: config.concurrency.max(1),
            failure_policy: config.failure_policy,
        };
        let field = aggregate(&domain, &dual, &opts)?;
        stages.excluded = field.excluded().to_vec();
        if field.is_empty() {
            return Err(OpverError::Evaluation(
                ErrorInfo::new("no-probes-evaluated", "every probe was excluded")
                    .with_context("excluded", field.excluded().len())
                    .with_hint("inspect the excluded probes for the evaluator errors"),
            ));
        }
        machine.advance(RunState::Reporting);

        let summary = stages
            .summary
            .insert(summarize(&field, &config.tolerances));
        let verdict = if summary.vanishes {
            Verdict::Confirmed
        } else {
            Verdict::DiscrepancyDetected
        };
        let complexity = complexity_report(
            &inputs.reference_description,
            &inputs.candidate_description,
            &field,
            summary,
        )?;
        let complexity = stages.complexity.insert(complexity);
        stages.bound = Some(coincidence_bound(
            complexity.reference_bits,
            complexity.candidate_bits,
            config.trials,
        )?);
        stages.spot_check = self.spot_check(&field)?;
        Ok(verdict)
    }

    fn spot_check(&self, field: &DiscrepancyField) -> Result<Option<LocalAgreement>, OpverError> {
        let Some(spec) = self.config.spot_checks else {
            return Ok(None);
        };
        let probes = select_spot_probes(field, spec.count, spec.seed);
        local_agreement(field, &probes, self.config.tolerances.vanish_tolerance).map(Some)
    }

    fn provenance(&self) -> RunProvenance {
        let seed = match self.config.domain.strategy {
            SamplingStrategy::Seeded { seed } => Some(seed),
            SamplingStrategy::Grid => self.config.spot_checks.map(|spec| spec.seed),
        };
        let mut tool_versions = BTreeMap::new();
        tool_versions.insert(
            "opver-engine".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
        );
        RunProvenance {
            schema_version: SchemaVersion::default(),
            config_hash: self.config.config_hash().unwrap_or_default(),
            seed,
            tool_versions,
        }
    }
}

/// Convenience wrapper around [`Verifier::run`].
pub fn verify(config: &VerificationConfig, inputs: &VerificationInputs<'_>) -> VerificationReport {
    Verifier::new(config.clone()).run(inputs)
}
