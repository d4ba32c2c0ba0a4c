//! Structured error types shared across opver crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::side::Side;

/// Context key holding the offending probe index.
pub const PROBE_KEY: &str = "probe";
/// Context key holding the evaluator side that failed.
pub const SIDE_KEY: &str = "side";

/// Structured payload attached to every [`OpverError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (probe indices, lengths, sides, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Canonical error type for the opver engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum OpverError {
    /// Malformed domain descriptor; raised before any evaluation happens.
    #[error("invalid domain: {0}")]
    Domain(ErrorInfo),
    /// Reference and candidate disagree on output length for the same probe.
    #[error("shape mismatch: {0}")]
    Shape(ErrorInfo),
    /// An evaluator failed internally at a probe.
    #[error("evaluation error: {0}")]
    Evaluation(ErrorInfo),
    /// A description or artefact could not be turned into bytes.
    #[error("serialization error: {0}")]
    Serialization(ErrorInfo),
    /// Invalid tolerance, trial or file configuration.
    #[error("config error: {0}")]
    Config(ErrorInfo),
}

impl OpverError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            OpverError::Domain(info)
            | OpverError::Shape(info)
            | OpverError::Evaluation(info)
            | OpverError::Serialization(info)
            | OpverError::Config(info) => info,
        }
    }

    /// Short lowercase family label, stable across releases.
    pub fn family(&self) -> &'static str {
        match self {
            OpverError::Domain(_) => "domain",
            OpverError::Shape(_) => "shape",
            OpverError::Evaluation(_) => "evaluation",
            OpverError::Serialization(_) => "serialization",
            OpverError::Config(_) => "config",
        }
    }

    /// Probe index recorded in the error context, if any.
    pub fn probe(&self) -> Option<usize> {
        self.info()
            .context
            .get(PROBE_KEY)
            .and_then(|raw| raw.parse().ok())
    }

    /// Evaluator side recorded in the error context, if any.
    pub fn side(&self) -> Option<Side> {
        self.info()
            .context
            .get(SIDE_KEY)
            .and_then(|raw| raw.parse().ok())
    }

    /// Builds an evaluation error tagged with the failing side and probe.
    pub fn evaluation(side: Side, probe: usize, message: impl Into<String>) -> Self {
        OpverError::Evaluation(
            ErrorInfo::new("evaluator-failed", message)
                .with_context(SIDE_KEY, side)
                .with_context(PROBE_KEY, probe),
        )
    }
}
