use opver_core::errors::{ErrorInfo, OpverError};
use opver_core::RngHandle;
use serde::{Deserialize, Serialize};
use tracing::warn;

const SAMPLING_STREAM: u64 = 0;

fn domain_error(code: &str, message: impl Into<String>) -> OpverError {
    OpverError::Domain(ErrorInfo::new(code, message.into()))
}

/// How probe points are placed in the unit hypercube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum SamplingStrategy {
    /// Evenly spaced Cartesian grid, rounded down per axis.
    #[default]
    Grid,
    /// Exactly the requested number of uniform draws from a seeded stream.
    Seeded {
        /// Seed for the draw sequence.
        seed: u64,
    },
}

/// Domain descriptor supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSpec {
    /// Number of input coordinates per probe.
    pub dimension: usize,
    /// Requested number of probes.
    pub target_probe_count: usize,
    /// Placement strategy.
    #[serde(default)]
    pub strategy: SamplingStrategy,
}

impl Default for DomainSpec {
    fn default() -> Self {
        Self {
            dimension: 1,
            target_probe_count: 10,
            strategy: SamplingStrategy::Grid,
        }
    }
}

/// Ordered, immutable set of probe points in `[0, 1]^dimension`.
///
/// For grid domains `len()` is `points_per_axis^dimension`, which is smaller
/// than `requested` whenever the request is not a perfect power. Callers must
/// read the size from the domain rather than assume the request was honoured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeDomain {
    dimension: usize,
    requested: usize,
    points_per_axis: Option<usize>,
    strategy: SamplingStrategy,
    points: Vec<Vec<f64>>,
}

impl ProbeDomain {
    /// Number of coordinates per probe.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Probe count the caller asked for.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Grid resolution, `None` for seeded domains.
    pub fn points_per_axis(&self) -> Option<usize> {
        self.points_per_axis
    }

    /// Strategy used to build the domain.
    pub fn strategy(&self) -> SamplingStrategy {
        self.strategy
    }

    /// Actual number of probes.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the domain holds no probes. Never true for a constructed domain.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Probe point by index.
    pub fn point(&self, index: usize) -> Option<&[f64]> {
        self.points.get(index).map(Vec::as_slice)
    }

    /// All probes in order.
    pub fn points(&self) -> &[Vec<f64>] {
        &self.points
    }

    /// Iterates `(index, point)` pairs in probe order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f64])> + '_ {
        self.points
            .iter()
            .enumerate()
            .map(|(index, point)| (index, point.as_slice()))
    }
}

fn validate(dimension: usize, target_count: usize) -> Result<(), OpverError> {
    if dimension < 1 {
        return Err(domain_error(
            "non-positive-dimension",
            "probe domain dimension must be at least 1",
        ));
    }
    if target_count < 1 {
        return Err(domain_error(
            "non-positive-count",
            "target probe count must be at least 1",
        ));
    }
    Ok(())
}

/// Largest `k` with `k^dimension <= count`.
///
/// Computed on integers so perfect powers are not lost to floating-point
/// truncation of `count^(1/dimension)`.
pub fn points_per_axis(dimension: usize, count: usize) -> usize {
    if dimension == 0 || count == 0 {
        return 0;
    }
    if dimension == 1 {
        return count;
    }
    let fits = |k: usize| -> bool {
        let mut acc: usize = 1;
        for _ in 0..dimension {
            acc = match acc.checked_mul(k) {
                Some(value) if value <= count => value,
                _ => return false,
            };
        }
        true
    };
    let mut k = (count as f64).powf(1.0 / dimension as f64).floor() as usize;
    while k > 0 && !fits(k) {
        k -= 1;
    }
    while fits(k + 1) {
        k += 1;
    }
    k
}

fn axis_values(points_per_axis: usize) -> Vec<f64> {
    if points_per_axis == 1 {
        return vec![0.0];
    }
    let last = (points_per_axis - 1) as f64;
    (0..points_per_axis).map(|idx| idx as f64 / last).collect()
}

/// Axes from slowest to fastest varying: Cartesian (`xy`) meshgrid order,
/// which is row-major with the first two axes swapped.
fn axis_order(dimension: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..dimension).collect();
    if dimension >= 2 {
        order.swap(0, 1);
    }
    order
}

/// Builds the evenly spaced grid domain for `(dimension, target_count)`.
///
/// Points follow Cartesian meshgrid order: in two dimensions the first axis
/// varies fastest; from three dimensions on the last axis varies fastest and
/// the second axis slowest. The result is a pure function of the arguments.
pub fn generate(dimension: usize, target_count: usize) -> Result<ProbeDomain, OpverError> {
    validate(dimension, target_count)?;
    let per_axis = points_per_axis(dimension, target_count);
    if per_axis < 1 {
        return Err(domain_error(
            "empty-grid",
            format!("cannot place a grid of {target_count} probes in {dimension} dimensions"),
        ));
    }
    let axis = axis_values(per_axis);
    let total = per_axis.pow(dimension as u32);
    let mut points: Vec<Vec<f64>> = Vec::with_capacity(total);
    let order = axis_order(dimension);
    let mut digits = vec![0usize; dimension];
    for _ in 0..total {
        points.push(digits.iter().map(|&digit| axis[digit]).collect());
        for &slot in order.iter().rev() {
            digits[slot] += 1;
            if digits[slot] < per_axis {
                break;
            }
            digits[slot] = 0;
        }
    }
    if total < target_count {
        warn!(
            dimension,
            requested = target_count,
            actual = total,
            points_per_axis = per_axis,
            "grid rounded down per axis; probe count below request"
        );
    }
    Ok(ProbeDomain {
        dimension,
        requested: target_count,
        points_per_axis: Some(per_axis),
        strategy: SamplingStrategy::Grid,
        points,
    })
}

/// Draws exactly `target_count` uniform probes from `[0, 1)^dimension`.
pub fn generate_seeded(
    dimension: usize,
    target_count: usize,
    seed: u64,
) -> Result<ProbeDomain, OpverError> {
    validate(dimension, target_count)?;
    let mut rng = RngHandle::substream(seed, SAMPLING_STREAM);
    let points: Vec<Vec<f64>> = (0..target_count)
        .map(|_| (0..dimension).map(|_| rng.unit()).collect())
        .collect();
    Ok(ProbeDomain {
        dimension,
        requested: target_count,
        points_per_axis: None,
        strategy: SamplingStrategy::Seeded { seed },
        points,
    })
}

/// Builds a domain according to the descriptor's strategy.
pub fn sample(spec: &DomainSpec) -> Result<ProbeDomain, OpverError> {
    match spec.strategy {
        SamplingStrategy::Grid => generate(spec.dimension, spec.target_probe_count),
        SamplingStrategy::Seeded { seed } => {
            generate_seeded(spec.dimension, spec.target_probe_count, seed)
        }
    }
}
