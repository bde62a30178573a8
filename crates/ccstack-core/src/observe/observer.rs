//! Decoder observers
//!
//! The decoder itself has no side effects beyond its own state. Callers that
//! want to watch a run plug a [`DecodeObserver`] in; it is invoked after
//! every node expansion and once when the run terminates.

use super::stats::DecodeStats;
use crate::fec::stack::{CodeTree, Frontier, NodeId};
use crate::types::InputSymbol;

/// Everything known about one node expansion.
#[derive(Debug, Clone, Copy)]
pub struct ExpansionEvent<'a> {
    /// The node that was expanded
    pub node: NodeId,
    /// Message position of the created children
    pub forward_depth: usize,
    /// Children materialized by this expansion
    pub children: &'a [NodeId],
    /// Hypotheses dropped by the metric floor
    pub pruned: usize,
    /// Frontier after the expanded node left it
    pub frontier: &'a Frontier,
    /// Whole decode tree so far
    pub tree: &'a CodeTree,
}

/// Hooks invoked by the stack decoder.
pub trait DecodeObserver {
    /// A node was expanded and its children entered the frontier.
    fn node_expanded(&mut self, _event: &ExpansionEvent<'_>) {}

    /// The run ended, successfully or not.
    fn run_terminated(&mut self, _stats: &DecodeStats) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl DecodeObserver for NoopObserver {}

/// Observer that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl DecodeObserver for TracingObserver {
    fn node_expanded(&mut self, event: &ExpansionEvent<'_>) {
        let metric = event.tree.node(event.node).path_metric();
        tracing::trace!(
            node = event.node.0,
            depth = event.forward_depth,
            metric,
            children = event.children.len(),
            pruned = event.pruned,
            stack_size = event.frontier.len(),
            "node expanded"
        );
    }

    fn run_terminated(&mut self, stats: &DecodeStats) {
        tracing::info!(
            outcome = %stats.outcome,
            nodes = stats.node_count,
            stack_size = stats.stack_size,
            "{}",
            stats
        );
    }
}

/// Observer that keeps what it saw, for inspection after a run.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    /// Expanded nodes, in expansion order
    pub expanded: Vec<NodeId>,
    /// Best frontier metric after each expansion
    pub best_scores: Vec<Option<f32>>,
    /// Input symbols of the created children, with their depth
    pub created: Vec<(usize, InputSymbol)>,
    /// Total hypotheses dropped by the metric floor
    pub pruned: usize,
    /// Statistics of each finished run
    pub runs: Vec<DecodeStats>,
}

impl DecodeObserver for RecordingObserver {
    fn node_expanded(&mut self, event: &ExpansionEvent<'_>) {
        self.expanded.push(event.node);
        self.best_scores.push(event.frontier.best_score());
        self.created.extend(
            event
                .children
                .iter()
                .map(|&c| (event.forward_depth, event.tree.node(c).symbol())),
        );
        self.pruned += event.pruned;
    }

    fn run_terminated(&mut self, stats: &DecodeStats) {
        self.runs.push(stats.clone());
    }
}

impl<O: DecodeObserver + ?Sized> DecodeObserver for &mut O {
    fn node_expanded(&mut self, event: &ExpansionEvent<'_>) {
        (**self).node_expanded(event);
    }

    fn run_terminated(&mut self, stats: &DecodeStats) {
        (**self).run_terminated(stats);
    }
}

impl<O: DecodeObserver + ?Sized> DecodeObserver for Box<O> {
    fn node_expanded(&mut self, event: &ExpansionEvent<'_>) {
        (**self).node_expanded(event);
    }

    fn run_terminated(&mut self, stats: &DecodeStats) {
        (**self).run_terminated(stats);
    }
}
