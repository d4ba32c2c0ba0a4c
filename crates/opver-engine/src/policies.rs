use std::fs;
use std::path::Path;

use opver_core::errors::{ErrorInfo, OpverError};
use serde::{Deserialize, Serialize};

use crate::domain::DomainSpec;
use crate::hash::stable_hash_string;
use crate::serde::from_yaml_slice;

fn config_error(code: &str, message: impl Into<String>) -> OpverError {
    OpverError::Config(ErrorInfo::new(code, message.into()))
}

/// Tolerance configuration used when summarising a discrepancy field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tolerances {
    /// Global norm below which the obstruction is considered to vanish; also
    /// the per-probe threshold for the support set.
    #[serde(default = "Tolerances::default_vanish_tolerance")]
    pub vanish_tolerance: f64,
    /// Ascending breakpoints `[machine, numerical_zero, negligible]` for
    /// the magnitude classification.
    #[serde(default = "Tolerances::default_breakpoints")]
    pub magnitude_breakpoints: Vec<f64>,
}

impl Tolerances {
    fn default_vanish_tolerance() -> f64 {
        1e-6
    }

    fn default_breakpoints() -> Vec<f64> {
        vec![1e-9, 1e-6, 1e-3]
    }

    /// Checks the tolerance and breakpoints for consistency.
    pub fn validate(&self) -> Result<(), OpverError> {
        if !self.vanish_tolerance.is_finite() || self.vanish_tolerance < 0.0 {
            return Err(config_error(
                "invalid-tolerance",
                format!(
                    "vanish tolerance must be finite and non-negative, got {}",
                    self.vanish_tolerance
                ),
            ));
        }
        if self.magnitude_breakpoints.len() != 3 {
            return Err(OpverError::Config(
                ErrorInfo::new(
                    "invalid-breakpoints",
                    format!(
                        "expected 3 magnitude breakpoints, got {}",
                        self.magnitude_breakpoints.len()
                    ),
                )
                .with_hint("list machine precision, numerical zero and negligible bounds"),
            ));
        }
        if self
            .magnitude_breakpoints
            .iter()
            .any(|value| !value.is_finite() || *value <= 0.0)
        {
            return Err(config_error(
                "invalid-breakpoints",
                "magnitude breakpoints must be finite and positive",
            ));
        }
        if self
            .magnitude_breakpoints
            .windows(2)
            .any(|pair| pair[0] >= pair[1])
        {
            return Err(config_error(
                "invalid-breakpoints",
                "magnitude breakpoints must be strictly increasing",
            ));
        }
        Ok(())
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            vanish_tolerance: Self::default_vanish_tolerance(),
            magnitude_breakpoints: Self::default_breakpoints(),
        }
    }
}

/// What to do when an evaluator fails at a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the run on the first failing probe.
    #[default]
    Fatal,
    /// Exclude failing probes from aggregation and list them in the report.
    SkipAndContinue,
}

/// Seeded subset of probes inspected individually after aggregation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SpotCheckSpec {
    /// Number of probes to inspect (capped at the number evaluated).
    pub count: usize,
    /// Seed for the probe selection.
    pub seed: u64,
}

/// Full configuration for one verification run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationConfig {
    /// Domain descriptor.
    #[serde(default)]
    pub domain: DomainSpec,
    /// Summary tolerances.
    #[serde(default)]
    pub tolerances: Tolerances,
    /// Independent trials used to compound the coincidence bound.
    #[serde(default = "VerificationConfig::default_trials")]
    pub trials: u32,
    /// Probe failure handling.
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    /// Worker threads for probe evaluation.
    #[serde(default = "VerificationConfig::default_concurrency")]
    pub concurrency: usize,
    /// Optional spot check over evaluated probes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_checks: Option<SpotCheckSpec>,
}

impl VerificationConfig {
    const fn default_trials() -> u32 {
        10
    }

    const fn default_concurrency() -> usize {
        1
    }

    /// Validates every knob that can be checked before sampling.
    pub fn validate(&self) -> Result<(), OpverError> {
        self.tolerances.validate()?;
        if self.trials < 1 {
            return Err(config_error(
                "invalid-trials",
                "trial count must be at least 1",
            ));
        }
        Ok(())
    }

    /// Stable hash of the configuration, recorded in report provenance.
    pub fn config_hash(&self) -> Result<String, OpverError> {
        stable_hash_string(self)
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            domain: DomainSpec::default(),
            tolerances: Tolerances::default(),
            trials: Self::default_trials(),
            failure_policy: FailurePolicy::Fatal,
            concurrency: Self::default_concurrency(),
            spot_checks: None,
        }
    }
}

/// Loads and validates a YAML configuration file.
pub fn load_config(path: &Path) -> Result<VerificationConfig, OpverError> {
    let bytes = fs::read(path).map_err(|err| {
        OpverError::Config(
            ErrorInfo::new("config-read", err.to_string())
                .with_context("path", path.display()),
        )
    })?;
    let config: VerificationConfig = from_yaml_slice(&bytes)?;
    config.validate()?;
    Ok(config)
}
