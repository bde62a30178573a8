//! Stack (Zigangirov-Jelinek) decoder
//!
//! Best-first search over the code tree. The frontier holds the current
//! leaves ordered by path metric; the best one is expanded over every input
//! symbol hypothesis until the best leaf sits at the last message position.
//!
//! ## Metric
//!
//! ```text
//! edge metric  = log2(reliability(output symbol, position)) - edge_bias
//! path metric  = sum of edge metrics from the root
//! ```
//!
//! The bias compensates for the metric decreasing with depth; without it
//! short paths would always look better than long ones and the search
//! would degrade to breadth-first.
//!
//! ## Run
//!
//! ```text
//! Init ──▶ Expanding ──▶ Success            best leaf at depth L-1
//!                     ├─▶ NodeLimitExceeded  node_count > node_budget
//!                     └─▶ NoViablePath       metric floor emptied the frontier
//! ```
//!
//! ## Example
//!
//! ```rust
//! use ccstack_core::fec::{CodeConfig, ConvolutionalEncoder, ReliabilityMatrix};
//! use ccstack_core::fec::stack::{DecoderConfig, StackDecoder};
//!
//! let config = CodeConfig::simple_k3();
//! let mut encoder = ConvolutionalEncoder::new(config.clone()).unwrap();
//! let data = vec![1, 0, 1, 1, 0, 0, 1, 0];
//! let sent = encoder.encode_terminated(&data);
//!
//! let relmat = ReliabilityMatrix::from_symbols(2, &sent, 0.97).unwrap();
//! let decoder_config = DecoderConfig { zero_tail: true, edge_bias: 0.5, ..Default::default() };
//! let mut decoder = StackDecoder::new(encoder, decoder_config);
//!
//! let mut decoded = Vec::new();
//! assert!(decoder.decode(&relmat, &mut decoded).unwrap());
//! assert_eq!(&decoded[..data.len()], &data[..]);
//! ```

use super::frontier::Frontier;
use super::tree::{CodeTree, NodeId};
use crate::fec::convolutional::{EncoderModel, MAX_SYMBOL_BITS};
use crate::fec::reliability::ReliabilitySource;
use crate::observe::{DecodeObserver, DecodeStats, ExpansionEvent, NoopObserver};
use crate::types::{alphabet_size, DecodeError, DecodeOutcome, DecodeResult, InputSymbol};
use serde::{Deserialize, Serialize};

/// Search bounds and metric settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Give up once more nodes than this were materialized (root included)
    pub node_budget: Option<usize>,
    /// Drop hypotheses whose path metric is not above this value
    pub metric_floor: Option<f32>,
    /// Only try the all-zero input symbol over the last `m` positions
    pub zero_tail: bool,
    /// Subtracted from every edge metric
    pub edge_bias: f32,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            node_budget: None,
            metric_floor: None,
            zero_tail: false,
            edge_bias: 0.0,
        }
    }
}

/// Clamp applied before `log2` so a zero reliability stays finite.
const MIN_RELIABILITY: f32 = f32::MIN_POSITIVE;

#[inline]
fn log2_reliability(p: f32) -> f32 {
    p.max(MIN_RELIABILITY).log2()
}

/// Stack algorithm decoder.
///
/// One instance runs one decode at a time; the encoder it owns is stepped in
/// place during the search. Give each concurrent decode its own instance.
#[derive(Debug)]
pub struct StackDecoder<E: EncoderModel, O: DecodeObserver = NoopObserver> {
    encoder: E,
    config: DecoderConfig,
    observer: O,
    tree: CodeTree,
    frontier: Frontier,
    /// Depth of the last expansion's children
    cur_depth: Option<usize>,
    max_depth: Option<usize>,
    score: Option<f32>,
    outcome: Option<DecodeOutcome>,
    /// Best terminal node of the last successful run
    terminal: Option<NodeId>,
    /// Scratch list of children created by one expansion
    created: Vec<NodeId>,
}

impl<E: EncoderModel> StackDecoder<E> {
    /// Create a decoder around an encoder model.
    pub fn new(encoder: E, config: DecoderConfig) -> Self {
        Self::with_observer(encoder, config, NoopObserver)
    }
}

impl<E: EncoderModel, O: DecodeObserver> StackDecoder<E, O> {
    /// Create a decoder that reports to `observer`.
    pub fn with_observer(encoder: E, config: DecoderConfig, observer: O) -> Self {
        // Wider encoders are rejected by decode()
        let fanout = alphabet_size(encoder.k().min(MAX_SYMBOL_BITS));
        Self {
            encoder,
            config,
            observer,
            tree: CodeTree::new(fanout),
            frontier: Frontier::new(),
            cur_depth: None,
            max_depth: None,
            score: None,
            outcome: None,
            terminal: None,
            created: Vec::with_capacity(fanout),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Change the search settings; takes effect at the next decode.
    pub fn set_config(&mut self, config: DecoderConfig) {
        self.config = config;
    }

    pub fn set_node_budget(&mut self, budget: Option<usize>) {
        self.config.node_budget = budget;
    }

    pub fn set_metric_floor(&mut self, floor: Option<f32>) {
        self.config.metric_floor = floor;
    }

    pub fn set_zero_tail(&mut self, zero_tail: bool) {
        self.config.zero_tail = zero_tail;
    }

    pub fn set_edge_bias(&mut self, edge_bias: f32) {
        self.config.edge_bias = edge_bias;
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Decode tree of the last run.
    pub fn tree(&self) -> &CodeTree {
        &self.tree
    }

    /// Frontier of the last run.
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// Forget the previous run: tree, frontier, counters and encoder state.
    pub fn reset(&mut self) {
        self.encoder.reset();
        self.tree.clear();
        self.frontier.clear();
        self.cur_depth = None;
        self.max_depth = None;
        self.score = None;
        self.outcome = None;
        self.terminal = None;
    }

    /// Best path metric in the frontier.
    pub fn best_frontier_score(&self) -> DecodeResult<f32> {
        self.frontier.best_score().ok_or(DecodeError::EmptyFrontier)
    }

    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Path metric of the last decoded message.
    pub fn score(&self) -> Option<f32> {
        self.score
    }

    /// Materialized nodes in the last run, root included.
    pub fn node_count(&self) -> usize {
        self.tree.len()
    }

    /// Deepest message position reached in the last run.
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Depth of the children of the last expanded node.
    pub fn current_depth(&self) -> Option<usize> {
        self.cur_depth
    }

    pub fn outcome(&self) -> Option<DecodeOutcome> {
        self.outcome
    }

    /// Terminal node the last successful run backtracked from.
    pub fn terminal_node(&self) -> Option<NodeId> {
        self.terminal
    }

    pub fn stats(&self) -> Option<DecodeStats> {
        self.outcome.map(|outcome| DecodeStats {
            outcome,
            score: self.score,
            stack_score: self.frontier.best_score(),
            node_count: self.node_count(),
            stack_size: self.frontier.len(),
            max_depth: self.max_depth,
        })
    }

    /// Write the decode tree in Graphviz dot format, with the decoded path
    /// highlighted.
    pub fn write_dot<W: std::io::Write>(&self, out: &mut W) -> std::io::Result<()> {
        self.tree.write_dot(out, self.terminal)
    }

    /// Decode the message described by `relmat` into `decoded_message`.
    ///
    /// Returns `Ok(true)` when a message was found, `Ok(false)` when the node
    /// budget or the metric floor stopped the search (see [`Self::outcome`]),
    /// and an error without touching any state when the reliability source
    /// does not fit the code or the encoder is wider than
    /// [`MAX_SYMBOL_BITS`] input bits.
    pub fn decode<R>(&mut self, relmat: &R, decoded_message: &mut Vec<InputSymbol>) -> DecodeResult<bool>
    where
        R: ReliabilitySource + ?Sized,
    {
        let message_length = relmat.message_length();
        let memory = self.encoder.m();
        if message_length < memory || message_length == 0 {
            return Err(DecodeError::MessageTooShort {
                length: message_length,
                memory,
            });
        }

        if self.encoder.k() > MAX_SYMBOL_BITS {
            return Err(DecodeError::InvalidCode(format!(
                "k = {} exceeds {} input bits",
                self.encoder.k(),
                MAX_SYMBOL_BITS
            )));
        }

        if relmat.symbols_log2() != self.encoder.n() {
            return Err(DecodeError::AlphabetMismatch {
                expected: self.encoder.n(),
                actual: relmat.symbols_log2(),
            });
        }

        self.reset();
        let _span = tracing::debug_span!("stack_decode", message_length).entered();
        tracing::debug!(
            node_budget = ?self.config.node_budget,
            metric_floor = ?self.config.metric_floor,
            zero_tail = self.config.zero_tail,
            edge_bias = self.config.edge_bias,
            "stack decoding started"
        );

        let root = self.tree.init_root(self.encoder.registers());
        let outcome = if self.budget_exceeded() {
            DecodeOutcome::NodeLimitExceeded
        } else {
            self.expand(root, relmat);
            self.search(relmat)
        };

        decoded_message.clear();
        if outcome.is_success() {
            if let Some(best) = self.frontier.peek_best() {
                decoded_message.extend(self.tree.back_track(best.node));
                self.score = Some(best.metric);
                self.terminal = Some(best.node);
            }
        }

        match outcome {
            DecodeOutcome::Success => tracing::debug!(
                score = ?self.score,
                nodes = self.tree.len(),
                "stack decoding succeeded"
            ),
            DecodeOutcome::NodeLimitExceeded => tracing::warn!(
                nodes = self.tree.len(),
                budget = ?self.config.node_budget,
                "node limit exhausted"
            ),
            DecodeOutcome::NoViablePath => tracing::warn!(
                floor = ?self.config.metric_floor,
                "metric limit encountered"
            ),
        }

        self.outcome = Some(outcome);
        if let Some(stats) = self.stats() {
            self.observer.run_terminated(&stats);
        }
        Ok(outcome.is_success())
    }

    /// Expand the best leaf until it is terminal or a bound stops the run.
    ///
    /// The budget is checked after each expansion in the loop, so children
    /// of the root that are already terminal still win under a tight budget.
    fn search<R>(&mut self, relmat: &R) -> DecodeOutcome
    where
        R: ReliabilitySource + ?Sized,
    {
        let last_position = relmat.message_length() - 1;
        loop {
            let best = match self.frontier.peek_best() {
                Some(best) => best,
                None => return DecodeOutcome::NoViablePath,
            };

            if self.tree.node(best.node).forward_depth() > last_position {
                return DecodeOutcome::Success;
            }

            self.expand(best.node, relmat);
            if self.budget_exceeded() {
                return DecodeOutcome::NodeLimitExceeded;
            }
        }
    }

    fn budget_exceeded(&self) -> bool {
        self.config
            .node_budget
            .map_or(false, |budget| self.tree.len() > budget)
    }

    /// Create the children of `node_id` for the next message position and
    /// move `node_id` out of the frontier.
    fn expand<R>(&mut self, node_id: NodeId, relmat: &R)
    where
        R: ReliabilitySource + ?Sized,
    {
        let (forward_depth, parent_metric, is_root) = {
            let node = self.tree.node(node_id);
            (node.forward_depth(), node.path_metric(), node.is_root())
        };

        // The root decodes from the encoder's reset state
        if !is_root {
            self.encoder.set_registers(self.tree.node(node_id).registers());
        }

        let tail_start = relmat.message_length() - self.encoder.m();
        let end_symbol: InputSymbol = if self.config.zero_tail && forward_depth >= tail_start {
            1
        } else {
            1 << self.encoder.k()
        };

        self.created.clear();
        let mut pruned = 0;
        for in_symbol in 0..end_symbol {
            // Shift once per position, later candidates replace the new bits
            let out_symbol = self.encoder.encode(in_symbol, in_symbol == 0);
            let edge_metric =
                log2_reliability(relmat.reliability(out_symbol, forward_depth)) - self.config.edge_bias;
            let path_metric = parent_metric + edge_metric;

            let keep = self
                .config
                .metric_floor
                .map_or(true, |floor| path_metric > floor);
            if keep {
                let child = self
                    .tree
                    .add_child(node_id, in_symbol, edge_metric, self.encoder.registers());
                let inserted = self.frontier.insert(child, self.tree.node(child).path_metric());
                debug_assert!(inserted, "fresh node {} already in frontier", child);
                self.created.push(child);
            } else {
                pruned += 1;
            }
        }

        self.cur_depth = Some(forward_depth);
        if self.max_depth.map_or(true, |d| forward_depth > d) {
            self.max_depth = Some(forward_depth);
        }

        if !is_root {
            self.frontier.remove(node_id);
        }

        let event = ExpansionEvent {
            node: node_id,
            forward_depth,
            children: &self.created,
            pruned,
            frontier: &self.frontier,
            tree: &self.tree,
        };
        self.observer.node_expanded(&event);
    }
}
