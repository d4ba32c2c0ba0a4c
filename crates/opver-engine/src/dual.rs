use opver_core::errors::{ErrorInfo, OpverError, PROBE_KEY};
use opver_core::{Evaluator, Side};
use serde::{Deserialize, Serialize};

/// Difference between reference and candidate at one probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointwiseDiscrepancy {
    /// Element-wise `reference - candidate`.
    pub difference: Vec<f64>,
    /// Euclidean norm of `difference`.
    pub norm: f64,
}

impl PointwiseDiscrepancy {
    /// Wraps a difference vector and computes its norm.
    pub fn from_difference(difference: Vec<f64>) -> Self {
        let norm = euclidean_norm(&difference);
        Self { difference, norm }
    }
}

/// Euclidean norm of a slice.
///
/// Accumulated with `hypot`, so finite inputs above `sqrt(f64::MAX)` keep a
/// finite norm instead of overflowing through their squares.
pub fn euclidean_norm(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc: f64, value| acc.hypot(*value))
}

/// Pair of evaluators compared probe by probe.
#[derive(Clone, Copy)]
pub struct DualEvaluator<'a> {
    reference: &'a dyn Evaluator,
    candidate: &'a dyn Evaluator,
}

impl std::fmt::Debug for DualEvaluator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DualEvaluator").finish_non_exhaustive()
    }
}

impl<'a> DualEvaluator<'a> {
    /// Pairs a reference and a candidate evaluator.
    pub fn new(reference: &'a dyn Evaluator, candidate: &'a dyn Evaluator) -> Self {
        Self {
            reference,
            candidate,
        }
    }

    fn evaluate_side(&self, side: Side, probe: usize, point: &[f64]) -> Result<Vec<f64>, OpverError> {
        let evaluator = match side {
            Side::Reference => self.reference,
            Side::Candidate => self.candidate,
        };
        let output = evaluator
            .evaluate(point)
            .map_err(|err| OpverError::evaluation(side, probe, err.to_string()))?;
        if let Some(position) = output.iter().position(|value| !value.is_finite()) {
            return Err(OpverError::evaluation(
                side,
                probe,
                format!(
                    "non-finite output {} at component {position}",
                    output[position]
                ),
            ));
        }
        Ok(output)
    }

    /// Computes `reference(point) - candidate(point)` for probe `probe`.
    ///
    /// The probe index is only used to tag errors. Both outputs must have the
    /// same length and contain finite values only.
    pub fn difference_at(&self, probe: usize, point: &[f64]) -> Result<Vec<f64>, OpverError> {
        let reference = self.evaluate_side(Side::Reference, probe, point)?;
        let candidate = self.evaluate_side(Side::Candidate, probe, point)?;
        if reference.len() != candidate.len() {
            return Err(OpverError::Shape(
                ErrorInfo::new(
                    "output-length-mismatch",
                    format!(
                        "reference returned {} components but candidate returned {}",
                        reference.len(),
                        candidate.len()
                    ),
                )
                .with_context(PROBE_KEY, probe)
                .with_context("reference_len", reference.len())
                .with_context("candidate_len", candidate.len()),
            ));
        }
        let difference: Vec<f64> = reference
            .iter()
            .zip(candidate.iter())
            .map(|(lhs, rhs)| lhs - rhs)
            .collect();
        if let Some(position) = difference.iter().position(|value| !value.is_finite()) {
            return Err(OpverError::Evaluation(
                ErrorInfo::new(
                    "difference-overflow",
                    format!("difference overflows at component {position}"),
                )
                .with_context(PROBE_KEY, probe),
            ));
        }
        Ok(difference)
    }

    /// Same as [`DualEvaluator::difference_at`], paired with the norm.
    pub fn discrepancy_at(
        &self,
        probe: usize,
        point: &[f64],
    ) -> Result<PointwiseDiscrepancy, OpverError> {
        self.difference_at(probe, point)
            .map(PointwiseDiscrepancy::from_difference)
    }
}
