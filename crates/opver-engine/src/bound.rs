//! Coincidence probability bounds derived from complexity estimates.
//!
//! `2^(-min(K_ref, K_cand))` bounds the chance that two *independently
//! constructed* evaluators agree by accident. Independence is a precondition
//! the caller asserts; nothing here can check it.

use opver_core::errors::{ErrorInfo, OpverError};
use serde::{Deserialize, Serialize};

/// A probability held together with its base-2 exponent.
///
/// `value` underflows to `0.0` once `log2` drops below the smallest
/// subnormal double; `log2` stays exact so renderers keep the precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Probability {
    /// Linear probability in `[0, 1]`.
    pub value: f64,
    /// Base-2 logarithm of the probability (`<= 0`).
    pub log2: f64,
}

impl Probability {
    /// Builds a probability from its base-2 exponent.
    pub fn from_log2(log2: f64) -> Self {
        Self {
            value: log2.exp2(),
            log2,
        }
    }

    /// Base-10 exponent, convenient for `10^x` style rendering.
    pub fn log10(&self) -> f64 {
        self.log2 * std::f64::consts::LOG10_2
    }
}

/// Single-trial and compounded coincidence bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoincidenceBound {
    /// Bound for one trial.
    pub single_trial: Probability,
    /// Number of independent trials compounded.
    pub trials: u32,
    /// Bound for all trials coinciding.
    pub compounded: Probability,
    /// `1 - compounded.value`.
    pub confidence: f64,
}

/// `2^(-min(k_reference_bits, k_candidate_bits))`.
pub fn single_trial_bound(k_reference_bits: u64, k_candidate_bits: u64) -> Probability {
    let k_min = k_reference_bits.min(k_candidate_bits) as f64;
    Probability::from_log2(-k_min)
}

/// `single^trials`, with the exponent scaled in log space.
///
/// Trial counts beyond `i32::MAX` take the value from the exponent.
pub fn compound(single: Probability, trials: u32) -> Result<Probability, OpverError> {
    if trials < 1 {
        return Err(OpverError::Config(
            ErrorInfo::new("invalid-trials", "trial count must be at least 1")
                .with_context("trials", trials),
        ));
    }
    let log2 = single.log2 * trials as f64;
    let value = match i32::try_from(trials) {
        Ok(exponent) => single.value.powi(exponent),
        Err(_) => log2.exp2(),
    };
    Ok(Probability { value, log2 })
}

/// `1 - compounded`.
pub fn confidence(compounded: Probability) -> f64 {
    1.0 - compounded.value
}

/// Computes the full bound for the given complexities and trial count.
pub fn coincidence_bound(
    k_reference_bits: u64,
    k_candidate_bits: u64,
    trials: u32,
) -> Result<CoincidenceBound, OpverError> {
    let single_trial = single_trial_bound(k_reference_bits, k_candidate_bits);
    let compounded = compound(single_trial, trials)?;
    Ok(CoincidenceBound {
        single_trial,
        trials,
        compounded,
        confidence: confidence(compounded),
    })
}
