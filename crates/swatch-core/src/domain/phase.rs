use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SwatchError;

/// Which side of the transform a blob belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlobPhase {
    /// Uploaded input, waiting to be transformed.
    Working,
    /// Transform output.
    Finished,
}

impl BlobPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            BlobPhase::Working => "working",
            BlobPhase::Finished => "finished",
        }
    }
}

impl fmt::Display for BlobPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlobPhase {
    type Err = SwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "working" => Ok(BlobPhase::Working),
            "finished" => Ok(BlobPhase::Finished),
            other => Err(SwatchError::MalformedInput(format!(
                "phase {other:?} (expected working or finished)"
            ))),
        }
    }
}
