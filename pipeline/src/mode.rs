//! Retrieval mode selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Retrieval strategy for a query.
///
/// A closed, mutually exclusive selector with no inferred default. Mode
/// interpretation belongs entirely to the retrieval engine; the orchestrator
/// forwards the selector untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    /// Plain vector retrieval over passages.
    Naive,
    /// Entity-centric retrieval around the query's local neighborhood.
    Local,
    /// Theme-centric retrieval over the corpus as a whole.
    Global,
    /// Combination of local and global retrieval.
    Hybrid,
}

impl QueryMode {
    /// All modes, in dispatch order.
    pub const ALL: [QueryMode; 4] = [
        QueryMode::Naive,
        QueryMode::Local,
        QueryMode::Global,
        QueryMode::Hybrid,
    ];

    /// The wire name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryMode::Naive => "naive",
            QueryMode::Local => "local",
            QueryMode::Global => "global",
            QueryMode::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMode {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "naive" => Ok(QueryMode::Naive),
            "local" => Ok(QueryMode::Local),
            "global" => Ok(QueryMode::Global),
            "hybrid" => Ok(QueryMode::Hybrid),
            other => Err(PipelineError::UnknownMode(other.to_string())),
        }
    }
}
