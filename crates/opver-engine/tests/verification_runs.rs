use opver_core::{pure, EvaluatorError, OpverError, Side};
use opver_engine::{
    verify, Description, DomainSpec, FailurePolicy, MagnitudeClass, RunState, SamplingStrategy,
    SpotCheckSpec, Verdict, VerificationConfig, VerificationInputs, Verifier,
};

fn config_1d(count: usize) -> VerificationConfig {
    VerificationConfig {
        domain: DomainSpec {
            dimension: 1,
            target_probe_count: count,
            strategy: SamplingStrategy::Grid,
        },
        ..VerificationConfig::default()
    }
}

fn poisoned_square(point: &[f64]) -> Result<Vec<f64>, EvaluatorError> {
    if (point[0] - 3.0 / 9.0).abs() < 1e-12 {
        return Err(EvaluatorError::NonConvergence { iterations: 50 });
    }
    Ok(vec![point[0] * point[0]])
}

#[test]
fn identical_linear_maps_are_confirmed() {
    let reference = pure(|x: &[f64]| vec![2.0 * x[0]]);
    let candidate = pure(|x: &[f64]| vec![2.0 * x[0]]);
    let inputs = VerificationInputs {
        reference: &reference,
        candidate: &candidate,
        reference_description: "f(x) = 2x".into(),
        candidate_description: "fn f(x: f64) -> f64 { 2.0 * x }".into(),
    };
    let report = verify(&config_1d(10), &inputs);

    assert_eq!(report.verdict, Verdict::Confirmed);
    assert!(report.is_confirmed());
    assert_eq!(report.final_state, RunState::Reporting);
    assert_eq!(
        report.state_trace,
        vec![RunState::Sampling, RunState::Evaluating, RunState::Reporting]
    );
    let summary = report.summary.as_ref().expect("summary");
    assert_eq!(summary.global_norm, 0.0);
    assert!(summary.support.is_empty());
    assert_eq!(summary.magnitude, MagnitudeClass::MachinePrecision);

    let complexity = report.complexity.as_ref().expect("complexity");
    assert_eq!(complexity.reference_bits, 9 * 8);
    assert_eq!(complexity.gap_size, 0);
    assert!(complexity.forced_vanishing);

    let bound = report.bound.expect("bound");
    assert_eq!(bound.single_trial.log2, -72.0);
    assert_eq!(bound.trials, 10);
}

#[test]
fn shifted_square_is_a_discrepancy() {
    let reference = pure(|x: &[f64]| vec![x[0] * x[0]]);
    let candidate = pure(|x: &[f64]| vec![x[0] * x[0] + 0.5]);
    let inputs = VerificationInputs {
        reference: &reference,
        candidate: &candidate,
        reference_description: "x^2".into(),
        candidate_description: "x^2 + 0.5".into(),
    };
    let report = Verifier::new(config_1d(10)).run(&inputs);

    assert_eq!(report.verdict, Verdict::DiscrepancyDetected);
    assert_eq!(report.final_state, RunState::Reporting);
    let summary = report.summary.as_ref().expect("summary");
    assert_eq!(summary.support.len(), 10);
    assert_eq!(summary.magnitude, MagnitudeClass::Significant);
    let complexity = report.complexity.as_ref().expect("complexity");
    assert_eq!(complexity.gap_size, 10);
    assert!((complexity.log2_gap - 10f64.log2()).abs() < 1e-12);
}

#[test]
fn fatal_failure_ends_in_failed_state() {
    let reference = pure(|x: &[f64]| vec![x[0] * x[0]]);
    let inputs = VerificationInputs {
        reference: &reference,
        candidate: &poisoned_square,
        reference_description: "x^2".into(),
        candidate_description: "x^2 with a hole".into(),
    };
    let report = verify(&config_1d(10), &inputs);

    assert_eq!(report.final_state, RunState::Failed);
    assert_eq!(
        report.state_trace,
        vec![RunState::Sampling, RunState::Evaluating, RunState::Failed]
    );
    let err = report.error().expect("error");
    assert!(matches!(err, OpverError::Evaluation(_)));
    assert_eq!(err.probe(), Some(3));
    assert_eq!(err.side(), Some(Side::Candidate));
    assert!(report.summary.is_none());
    assert!(report.bound.is_none());
    assert!(report.domain.is_some());
}

#[test]
fn skip_policy_reports_exclusions() {
    let reference = pure(|x: &[f64]| vec![x[0] * x[0]]);
    let inputs = VerificationInputs {
        reference: &reference,
        candidate: &poisoned_square,
        reference_description: "x^2".into(),
        candidate_description: "x^2 with a hole".into(),
    };
    let config = VerificationConfig {
        failure_policy: FailurePolicy::SkipAndContinue,
        ..config_1d(10)
    };
    let report = verify(&config, &inputs);

    assert_eq!(report.verdict, Verdict::Confirmed);
    assert_eq!(report.excluded.len(), 1);
    assert_eq!(report.excluded[0].probe, 3);
    let summary = report.summary.as_ref().expect("summary");
    assert_eq!(summary.evaluated, 9);
    assert_eq!(summary.excluded, 1);
}

#[test]
fn invalid_domain_fails_before_evaluation() {
    let eval = pure(|x: &[f64]| x.to_vec());
    let inputs = VerificationInputs {
        reference: &eval,
        candidate: &eval,
        reference_description: "id".into(),
        candidate_description: "id".into(),
    };
    let report = verify(&config_1d(0), &inputs);
    assert_eq!(
        report.state_trace,
        vec![RunState::Sampling, RunState::Failed]
    );
    assert!(matches!(report.error(), Some(OpverError::Domain(_))));
    assert!(report.domain.is_none());
}

#[test]
fn unreadable_description_keeps_summary() {
    let eval = pure(|x: &[f64]| x.to_vec());
    let missing = tempfile::tempdir().unwrap().path().join("absent.rs");
    let inputs = VerificationInputs {
        reference: &eval,
        candidate: &eval,
        reference_description: Description::File(missing),
        candidate_description: "id".into(),
    };
    let report = verify(&config_1d(10), &inputs);
    assert!(matches!(report.error(), Some(OpverError::Serialization(_))));
    assert_eq!(report.final_state, RunState::Failed);
    assert!(report.summary.is_some());
    assert!(report.complexity.is_none());
}

#[test]
fn reports_are_reproducible() {
    let reference = pure(|x: &[f64]| vec![x[0].sin(), x[1].cos()]);
    let candidate = pure(|x: &[f64]| vec![x[0].sin(), x[1].cos() + 1e-3 * x[0]]);
    let inputs = VerificationInputs {
        reference: &reference,
        candidate: &candidate,
        reference_description: "sin, cos".into(),
        candidate_description: "sin, cos + eps".into(),
    };
    let config = VerificationConfig {
        domain: DomainSpec {
            dimension: 2,
            target_probe_count: 64,
            strategy: SamplingStrategy::Seeded { seed: 99 },
        },
        concurrency: 3,
        spot_checks: Some(SpotCheckSpec { count: 8, seed: 5 }),
        ..VerificationConfig::default()
    };
    let first = verify(&config, &inputs);
    let second = verify(&config, &inputs);
    assert_eq!(first, second);
    assert_eq!(first.digest().unwrap(), second.digest().unwrap());
    assert_eq!(first.provenance.seed, Some(99));
    assert_eq!(first.spot_check.as_ref().unwrap().total_probes, 8);

    let decoded: opver_engine::VerificationReport =
        opver_engine::from_json_slice(&first.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded.verdict, first.verdict);
    assert_eq!(decoded.state_trace, first.state_trace);
}

#[test]
fn all_excluded_points_fail_the_run() {
    let reference = pure(|x: &[f64]| vec![x[0]]);
    let always_fails =
        |_: &[f64]| -> Result<Vec<f64>, EvaluatorError> { Err(EvaluatorError::DivisionByZero) };
    let inputs = VerificationInputs {
        reference: &reference,
        candidate: &always_fails,
        reference_description: "x".into(),
        candidate_description: "1 / 0".into(),
    };
    let config = VerificationConfig {
        failure_policy: FailurePolicy::SkipAndContinue,
        ..config_1d(10)
    };
    let report = verify(&config, &inputs);

    assert_eq!(report.final_state, RunState::Failed);
    let err = report.error().expect("error");
    assert!(matches!(err, OpverError::Evaluation(_)));
    assert_eq!(err.info().code, "no-probes-evaluated");
    assert_eq!(report.excluded.len(), 10);
    assert!(report.summary.is_none());
}

#[test]
fn huge_discrepancies_survive_the_json_round_trip() {
    let reference = pure(|_: &[f64]| vec![1e200]);
    let candidate = pure(|_: &[f64]| vec![0.0]);
    let inputs = VerificationInputs {
        reference: &reference,
        candidate: &candidate,
        reference_description: "1e200".into(),
        candidate_description: "0".into(),
    };
    let report = verify(&config_1d(10), &inputs);
    let summary = report.summary.as_ref().expect("summary");
    assert!(summary.max_norm.is_finite());
    assert!(summary.global_norm.is_finite());
    assert_eq!(report.verdict, Verdict::DiscrepancyDetected);

    let decoded: opver_engine::VerificationReport =
        opver_engine::from_json_slice(&report.to_bytes().unwrap()).unwrap();
    let restored = decoded.summary.expect("summary");
    assert!((restored.global_norm / summary.global_norm - 1.0).abs() < 1e-12);
    assert_eq!(restored.support, summary.support);
}
