use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which of the two evaluators under comparison a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Side {
    /// The theory evaluator; differences are taken as `reference - candidate`.
    Reference,
    /// The implementation evaluator.
    Candidate,
}

impl Side {
    /// Stable label used in error contexts and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Reference => "reference",
            Side::Candidate => "candidate",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "reference" => Ok(Side::Reference),
            "candidate" => Ok(Side::Candidate),
            other => Err(format!("unknown evaluator side `{other}`")),
        }
    }
}
