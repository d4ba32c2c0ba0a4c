//! Built-in reference/candidate pairs.
//!
//! Every evaluator here reads as many coordinates as the probe carries, so a
//! configuration file may change the domain dimension freely.

use nalgebra::{DMatrix, DVector};
use opver_core::{Evaluator, EvaluatorError};
use opver_engine::{DomainSpec, SamplingStrategy, VerificationConfig, VerificationInputs};

/// Names accepted by `opver run --scenario`.
pub const NAMES: [&str; 3] = ["newton-sqrt", "largest-eigenvalue", "shifted-square"];

const NEWTON_TOLERANCE: f64 = 1e-10;
const NEWTON_MAX_ITER: u32 = 100;
const POWER_TOLERANCE: f64 = 1e-14;
const POWER_MAX_ITER: u32 = 100_000;

/// A reference/candidate pair with its descriptions and default domain.
pub struct Scenario {
    pub name: &'static str,
    pub summary: &'static str,
    reference: Box<dyn Evaluator>,
    candidate: Box<dyn Evaluator>,
    reference_description: &'static str,
    candidate_description: &'static str,
    domain: DomainSpec,
}

impl Scenario {
    pub fn lookup(name: &str) -> Option<Self> {
        match name {
            "newton-sqrt" => Some(Self {
                name: "newton-sqrt",
                summary: "Newton-Raphson written from the recurrence and as a loop",
                reference: Box::new(newton_theory),
                candidate: Box::new(newton_implementation),
                reference_description: NEWTON_THEORY,
                candidate_description: NEWTON_IMPLEMENTATION,
                domain: grid(1, 50),
            }),
            "largest-eigenvalue" => Some(Self {
                name: "largest-eigenvalue",
                summary: "spectral decomposition of x x^T + I against power iteration",
                reference: Box::new(spectral_largest),
                candidate: Box::new(power_iteration_largest),
                reference_description: SPECTRAL_THEORY,
                candidate_description: POWER_ITERATION,
                domain: grid(2, 625),
            }),
            "shifted-square" => Some(Self {
                name: "shifted-square",
                summary: "x^2 against x^2 + 0.5, a deliberate discrepancy",
                reference: Box::new(|x: &[f64]| -> Result<Vec<f64>, EvaluatorError> {
                    Ok(x.iter().map(|value| value * value).collect())
                }),
                candidate: Box::new(|x: &[f64]| -> Result<Vec<f64>, EvaluatorError> {
                    Ok(x.iter().map(|value| value * value + 0.5).collect())
                }),
                reference_description: "f(x) = x^2",
                candidate_description: "fn f(x: f64) -> f64 { x * x + 0.5 }",
                domain: grid(1, 10),
            }),
            _ => None,
        }
    }

    pub fn default_config(&self) -> VerificationConfig {
        VerificationConfig {
            domain: self.domain,
            ..VerificationConfig::default()
        }
    }

    pub fn inputs(&self) -> VerificationInputs<'_> {
        VerificationInputs {
            reference: self.reference.as_ref(),
            candidate: self.candidate.as_ref(),
            reference_description: self.reference_description.into(),
            candidate_description: self.candidate_description.into(),
        }
    }
}

fn grid(dimension: usize, target_probe_count: usize) -> DomainSpec {
    DomainSpec {
        dimension,
        target_probe_count,
        strategy: SamplingStrategy::Grid,
    }
}

const NEWTON_THEORY: &str = "\
x_{n+1} = x_n - f(x_n) / f'(x_n), stopping once |f(x_n)| < 1e-10.
Roots of y^2 - a, y^3 - y - a, cos(y) - a y and e^y - 2a with a = 1 + 3 * x0.";

const NEWTON_IMPLEMENTATION: &str = "\
current = initial
repeat up to 100 times:
    value = func(current); if |value| < tolerance: stop
    current -= value / derivative(current)";

const SPECTRAL_THEORY: &str = "\
Largest eigenvalue of the symmetric matrix A = x (x)^T + I:
lambda_max = max { lambda : det(A - lambda I) = 0 }, via spectral decomposition.";

const POWER_ITERATION: &str = "\
Power iteration: v_{k+1} = A v_k / ||A v_k||,
lambda ~ v^T A v once successive estimates agree.";

fn newton_targets(point: &[f64]) -> f64 {
    1.0 + 3.0 * point[0]
}

fn newton_step<F, D>(f: F, df: D, x0: f64) -> Result<f64, EvaluatorError>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    let mut x = x0;
    for _ in 0..NEWTON_MAX_ITER {
        if f(x).abs() < NEWTON_TOLERANCE {
            return Ok(x);
        }
        let slope = df(x);
        if slope == 0.0 {
            return Err(EvaluatorError::DivisionByZero);
        }
        x -= f(x) / slope;
    }
    Err(EvaluatorError::NonConvergence {
        iterations: NEWTON_MAX_ITER,
    })
}

fn newton_theory(point: &[f64]) -> Result<Vec<f64>, EvaluatorError> {
    let a = newton_targets(point);
    let square = newton_step(|y| y * y - a, |y| 2.0 * y, 1.0)?;
    let cubic = newton_step(|y| y * y * y - y - a, |y| 3.0 * y * y - 1.0, 1.5)?;
    let transcendental = newton_step(|y| y.cos() - a * y, |y| -y.sin() - a, 0.5)?;
    let exponential = newton_step(|y| y.exp() - 2.0 * a, |y| y.exp(), 0.5)?;
    Ok(vec![square, cubic, transcendental, exponential])
}

fn newton_implementation(point: &[f64]) -> Result<Vec<f64>, EvaluatorError> {
    let target = newton_targets(point);
    let solve = |func: &dyn Fn(f64) -> f64, derivative: &dyn Fn(f64) -> f64, initial: f64| {
        let mut current = initial;
        let mut iterations = 0;
        loop {
            let value = func(current);
            if value.abs() < NEWTON_TOLERANCE {
                break Ok(current);
            }
            if iterations == NEWTON_MAX_ITER {
                break Err(EvaluatorError::NonConvergence { iterations });
            }
            let slope = derivative(current);
            if slope == 0.0 {
                break Err(EvaluatorError::DivisionByZero);
            }
            current -= value / slope;
            iterations += 1;
        }
    };
    Ok(vec![
        solve(&|y: f64| y * y - target, &|y: f64| 2.0 * y, 1.0)?,
        solve(&|y: f64| y * y * y - y - target, &|y: f64| 3.0 * y * y - 1.0, 1.5)?,
        solve(&|y: f64| y.cos() - target * y, &|y: f64| -y.sin() - target, 0.5)?,
        solve(&|y: f64| y.exp() - 2.0 * target, &|y: f64| y.exp(), 0.5)?,
    ])
}

fn outer_plus_identity(point: &[f64]) -> DMatrix<f64> {
    let n = point.len();
    DMatrix::from_fn(n, n, |i, j| {
        point[i] * point[j] + if i == j { 1.0 } else { 0.0 }
    })
}

fn spectral_largest(point: &[f64]) -> Result<Vec<f64>, EvaluatorError> {
    let eigen = outer_plus_identity(point).symmetric_eigen();
    let largest = eigen
        .eigenvalues
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);
    Ok(vec![largest])
}

fn power_iteration_largest(point: &[f64]) -> Result<Vec<f64>, EvaluatorError> {
    let matrix = outer_plus_identity(point);
    let n = point.len();
    let mut vector = DVector::from_element(n, 1.0 / (n as f64).sqrt());
    let mut estimate = vector.dot(&(&matrix * &vector));
    for _ in 0..POWER_MAX_ITER {
        let next = &matrix * &vector;
        let norm = next.norm();
        if norm == 0.0 {
            return Err(EvaluatorError::DivisionByZero);
        }
        vector = next / norm;
        let refined = vector.dot(&(&matrix * &vector));
        if (refined - estimate).abs() < POWER_TOLERANCE {
            return Ok(vec![refined]);
        }
        estimate = refined;
    }
    Err(EvaluatorError::NonConvergence {
        iterations: POWER_MAX_ITER,
    })
}
