//! Description-length complexity estimates.
//!
//! True algorithmic complexity is uncomputable. Every figure produced here is
//! `8 * byte_length` of some serialisation, which upper-bounds descriptive
//! complexity up to an additive constant and nothing more. Callers must not
//! read these numbers as measurements.

use std::fs;
use std::path::PathBuf;

use opver_core::errors::{ErrorInfo, OpverError};
use serde::{Deserialize, Serialize};

use crate::aggregate::{DiscrepancyField, ObstructionSummary};

/// Margin by which `K_ref` must exceed `log2 |gap|` for `forced_vanishing`.
pub const FORCED_VANISHING_FACTOR: f64 = 10.0;

/// Source of a textual or serialized evaluator description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "value")]
pub enum Description {
    /// Inline UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// File read at estimation time, e.g. the candidate's own source.
    File(PathBuf),
}

impl Description {
    /// Converts the description into the bytes being measured.
    pub fn to_bytes(&self) -> Result<Vec<u8>, OpverError> {
        match self {
            Description::Text(text) => Ok(text.as_bytes().to_vec()),
            Description::Bytes(bytes) => Ok(bytes.clone()),
            Description::File(path) => {
                let bytes = fs::read(path).map_err(|err| {
                    OpverError::Serialization(
                        ErrorInfo::new("description-read", err.to_string())
                            .with_context("path", path.display()),
                    )
                })?;
                if bytes.is_empty() {
                    return Err(OpverError::Serialization(
                        ErrorInfo::new("description-empty", "description file is empty")
                            .with_context("path", path.display()),
                    ));
                }
                Ok(bytes)
            }
        }
    }
}

impl From<&str> for Description {
    fn from(text: &str) -> Self {
        Description::Text(text.to_string())
    }
}

impl From<String> for Description {
    fn from(text: String) -> Self {
        Description::Text(text)
    }
}

/// Bit-length estimate for raw bytes: `len * 8`.
pub fn estimate(bytes: &[u8]) -> u64 {
    bytes.len() as u64 * 8
}

/// Bit-length estimate for a description.
pub fn estimate_description(description: &Description) -> Result<u64, OpverError> {
    description.to_bytes().map(|bytes| estimate(&bytes))
}

/// Canonical byte form of a field: every difference component in probe order,
/// each as an 8-byte little-endian IEEE 754 double.
pub fn canonical_field_bytes(field: &DiscrepancyField) -> Vec<u8> {
    let width: usize = field.entries().iter().map(|entry| entry.difference.len()).sum();
    let mut bytes = Vec::with_capacity(width * 8);
    for entry in field.entries() {
        for value in &entry.difference {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
    }
    bytes
}

/// Bit-length estimate of a discrepancy field.
pub fn estimate_field(field: &DiscrepancyField) -> u64 {
    estimate(&canonical_field_bytes(field))
}

/// Complexity figures for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityReport {
    /// Estimated bits of the reference description.
    pub reference_bits: u64,
    /// Estimated bits of the candidate description.
    pub candidate_bits: u64,
    /// Estimated bits of the discrepancy field.
    pub field_bits: u64,
    /// Number of probes that were evaluated.
    pub space_size: usize,
    /// Size of the support set.
    pub gap_size: usize,
    /// `log2(gap_size)`, zero for an empty gap.
    pub log2_gap: f64,
    /// `reference_bits > log2_gap`.
    pub complexity_condition: bool,
    /// `reference_bits > 10 * log2_gap`.
    pub forced_vanishing: bool,
}

/// Builds the complexity report from descriptions and the summarised field.
pub fn complexity_report(
    reference: &Description,
    candidate: &Description,
    field: &DiscrepancyField,
    summary: &ObstructionSummary,
) -> Result<ComplexityReport, OpverError> {
    let reference_bits = estimate_description(reference)?;
    let candidate_bits = estimate_description(candidate)?;
    let gap_size = summary.support.len();
    let log2_gap = if gap_size > 0 {
        (gap_size as f64).log2()
    } else {
        0.0
    };
    let k_ref = reference_bits as f64;
    Ok(ComplexityReport {
        reference_bits,
        candidate_bits,
        field_bits: estimate_field(field),
        space_size: field.len(),
        gap_size,
        log2_gap,
        complexity_condition: k_ref > log2_gap,
        forced_vanishing: k_ref > FORCED_VANISHING_FACTOR * log2_gap,
    })
}
