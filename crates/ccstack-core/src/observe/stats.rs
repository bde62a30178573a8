//! Decode run statistics.

use crate::types::DecodeOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of a decoder's counters at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodeStats {
    /// How the run ended
    pub outcome: DecodeOutcome,
    /// Path metric of the decoded message (success only)
    pub score: Option<f32>,
    /// Best path metric still in the frontier
    pub stack_score: Option<f32>,
    /// Materialized nodes, root included
    pub node_count: usize,
    /// Nodes left in the frontier
    pub stack_size: usize,
    /// Deepest message position reached
    pub max_depth: Option<usize>,
}

impl DecodeStats {
    /// One comma separated line: `_RES ok,score,stack_score,nodes,stack_size,max_depth`.
    ///
    /// Missing values are printed as `NaN` (scores) or `-1` (depth) so the
    /// line always has the same number of fields.
    pub fn summary(&self) -> String {
        format!(
            "_RES {},{},{},{},{},{}",
            u8::from(self.outcome.is_success()),
            self.score.unwrap_or(f32::NAN),
            self.stack_score.unwrap_or(f32::NAN),
            self.node_count,
            self.stack_size,
            self.max_depth.map_or(-1, |d| d as i64)
        )
    }
}

impl fmt::Display for DecodeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "score = {} stack_score = {} #nodes = {} stack_size = {} max depth = {}",
            self.score.unwrap_or(f32::NAN),
            self.stack_score.unwrap_or(f32::NAN),
            self.node_count,
            self.stack_size,
            self.max_depth.map_or(-1, |d| d as i64)
        )
    }
}
