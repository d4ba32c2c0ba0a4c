use opver_core::OpverError;
use opver_engine::{coincidence_bound, compound, confidence, single_trial_bound, Probability};

#[test]
fn single_trial_uses_smaller_complexity() {
    let bound = single_trial_bound(12, 20);
    assert_eq!(bound.log2, -12.0);
    assert_eq!(bound.value, 2f64.powi(-12));
    assert_eq!(single_trial_bound(20, 12), bound);
}

#[test]
fn compounding_matches_integer_powers() {
    let single = Probability::from_log2(-3.0);
    for trials in [1u32, 5, 10] {
        let compounded = compound(single, trials).unwrap();
        assert_eq!(compounded.value, single.value.powi(trials as i32));
        assert_eq!(compounded.log2, -3.0 * trials as f64);
        assert_eq!(confidence(compounded), 1.0 - compounded.value);
    }
}

#[test]
fn zero_trials_are_rejected() {
    let err = compound(Probability::from_log2(-1.0), 0).unwrap_err();
    assert!(matches!(err, OpverError::Config(_)));
    assert_eq!(err.info().code, "invalid-trials");
    assert!(coincidence_bound(4, 4, 0).is_err());
}

#[test]
fn bound_bundles_every_figure() {
    let bound = coincidence_bound(4, 6, 2).unwrap();
    assert_eq!(bound.trials, 2);
    assert_eq!(bound.single_trial.value, 1.0 / 16.0);
    assert_eq!(bound.compounded.value, 1.0 / 256.0);
    assert_eq!(bound.confidence, 255.0 / 256.0);
}

#[test]
fn trial_counts_beyond_i32_stay_probabilities() {
    let bound = coincidence_bound(8, 8, 3_000_000_000).unwrap();
    assert_eq!(bound.compounded.log2, -24_000_000_000.0);
    assert_eq!(bound.compounded.value, 0.0);
    assert_eq!(bound.confidence, 1.0);

    let certain = compound(Probability::from_log2(0.0), u32::MAX).unwrap();
    assert_eq!(certain.value, 1.0);
    assert_eq!(confidence(certain), 0.0);
}
