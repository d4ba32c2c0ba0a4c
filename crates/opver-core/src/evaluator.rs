//! The evaluator capability compared by the engine.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure signalled by an evaluator while computing its output at a probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum EvaluatorError {
    /// A division by zero (or by a vanishing derivative) was attempted.
    #[error("division by zero")]
    DivisionByZero,
    /// An iterative scheme did not settle within its iteration budget.
    #[error("no convergence after {iterations} iterations")]
    NonConvergence {
        /// Iterations spent before giving up.
        iterations: u32,
    },
    /// The probe lies outside the evaluator's domain of definition.
    #[error("probe outside evaluator domain: {0}")]
    OutOfDomain(String),
    /// Any other evaluator specific failure.
    #[error("{0}")]
    Other(String),
}

/// Capability: given a probe point, return a numeric vector.
///
/// Implementations are treated as pure functions of their input for the
/// duration of a run. The engine may call them from several worker threads at
/// once, hence the `Send + Sync` bound.
pub trait Evaluator: Send + Sync {
    /// Evaluates the function at `point`.
    fn evaluate(&self, point: &[f64]) -> Result<Vec<f64>, EvaluatorError>;
}

impl<F> Evaluator for F
where
    F: Fn(&[f64]) -> Result<Vec<f64>, EvaluatorError> + Send + Sync,
{
    fn evaluate(&self, point: &[f64]) -> Result<Vec<f64>, EvaluatorError> {
        self(point)
    }
}

/// Lifts an infallible closure into an [`Evaluator`].
pub fn pure<F>(f: F) -> impl Evaluator
where
    F: Fn(&[f64]) -> Vec<f64> + Send + Sync,
{
    move |point: &[f64]| -> Result<Vec<f64>, EvaluatorError> { Ok(f(point)) }
}
