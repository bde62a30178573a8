//! Frontier (the "stack" of the stack algorithm)
//!
//! Ordered set of the leaves of the code tree that are waiting to be
//! expanded. The best entry is the one with the greatest path metric; among
//! equal metrics the node created first wins, so runs are reproducible even
//! when floating-point metrics tie exactly.
//!
//! Entries are kept in a `BTreeSet` ordered best-first, with a side index
//! from node id to metric so an arbitrary node can be located and removed in
//! O(log n).

use super::tree::NodeId;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Ordering key of a frontier entry.
#[derive(Debug, Clone, Copy)]
pub struct FrontierEntry {
    pub metric: f32,
    pub node: NodeId,
}

impl FrontierEntry {
    fn new(node: NodeId, metric: f32) -> Self {
        // Fold -0.0 into 0.0 so both compare equal under total_cmp
        Self {
            metric: metric + 0.0,
            node,
        }
    }
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    /// Best first: greater metric, then smaller id.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .metric
            .total_cmp(&self.metric)
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Metric-ordered set of expandable nodes.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    ordered: BTreeSet<FrontierEntry>,
    index: HashMap<NodeId, f32>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Returns `false` and leaves the frontier unchanged if the
    /// node is already present.
    pub fn insert(&mut self, node: NodeId, metric: f32) -> bool {
        if self.index.contains_key(&node) {
            return false;
        }
        let entry = FrontierEntry::new(node, metric);
        self.index.insert(node, entry.metric);
        self.ordered.insert(entry);
        true
    }

    /// Entry with the greatest metric, earliest node on ties.
    pub fn peek_best(&self) -> Option<FrontierEntry> {
        self.ordered.first().copied()
    }

    /// Metric of the best entry.
    pub fn best_score(&self) -> Option<f32> {
        self.peek_best().map(|e| e.metric)
    }

    /// Remove a node wherever it sits. Returns `false` if it was absent.
    pub fn remove(&mut self, node: NodeId) -> bool {
        match self.index.remove(&node) {
            Some(metric) => self.ordered.remove(&FrontierEntry { metric, node }),
            None => false,
        }
    }

    /// Remove and return the best entry.
    pub fn pop_best(&mut self) -> Option<FrontierEntry> {
        let entry = self.ordered.pop_first()?;
        self.index.remove(&entry.node);
        Some(entry)
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.index.contains_key(&node)
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    pub fn clear(&mut self) {
        self.ordered.clear();
        self.index.clear();
    }

    /// Entries in best-first order.
    pub fn iter(&self) -> impl Iterator<Item = &FrontierEntry> {
        self.ordered.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_best_is_greatest_metric() {
        let mut frontier = Frontier::new();
        frontier.insert(NodeId(1), -3.0);
        frontier.insert(NodeId(2), -0.5);
        frontier.insert(NodeId(3), -7.25);

        let best = frontier.peek_best().unwrap();
        assert_eq!(best.node, NodeId(2));
        assert_eq!(frontier.best_score(), Some(-0.5));
        assert_eq!(frontier.len(), 3);
    }

    #[test]
    fn test_ties_go_to_earliest_node() {
        let mut frontier = Frontier::new();
        frontier.insert(NodeId(9), -1.0);
        frontier.insert(NodeId(4), -1.0);
        frontier.insert(NodeId(6), -1.0);

        let order: Vec<NodeId> = std::iter::from_fn(|| frontier.pop_best().map(|e| e.node)).collect();
        assert_eq!(order, vec![NodeId(4), NodeId(6), NodeId(9)]);
    }

    #[test]
    fn test_negative_zero_ties_with_zero() {
        let mut frontier = Frontier::new();
        frontier.insert(NodeId(2), 0.0);
        frontier.insert(NodeId(1), -0.0);
        assert_eq!(frontier.peek_best().unwrap().node, NodeId(1));
    }

    #[test]
    fn test_remove_arbitrary_node() {
        let mut frontier = Frontier::new();
        frontier.insert(NodeId(1), -1.0);
        frontier.insert(NodeId(2), -2.0);
        frontier.insert(NodeId(3), -3.0);

        assert!(frontier.remove(NodeId(2)));
        assert!(!frontier.contains(NodeId(2)));
        assert!(!frontier.remove(NodeId(2)));
        assert_eq!(frontier.len(), 2);

        assert!(frontier.remove(NodeId(1)));
        assert_eq!(frontier.peek_best().unwrap().node, NodeId(3));
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let mut frontier = Frontier::new();
        assert!(frontier.insert(NodeId(1), -1.0));
        assert!(!frontier.insert(NodeId(1), 5.0));
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.best_score(), Some(-1.0));
    }

    #[test]
    fn test_empty() {
        let mut frontier = Frontier::new();
        assert!(frontier.peek_best().is_none());
        assert!(frontier.best_score().is_none());
        assert!(frontier.pop_best().is_none());
        frontier.insert(NodeId(0), 1.0);
        frontier.clear();
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_random_operations_keep_best_score() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut frontier = Frontier::new();
        let mut live: Vec<(NodeId, f32)> = Vec::new();

        for i in 0..2000 {
            if live.is_empty() || rng.gen_bool(0.6) {
                // Coarse metrics so ties happen often
                let metric = -(rng.gen_range(0..40) as f32) * 0.25;
                frontier.insert(NodeId(i), metric);
                live.push((NodeId(i), metric));
            } else {
                let victim = live.swap_remove(rng.gen_range(0..live.len()));
                assert!(frontier.remove(victim.0));
            }

            let expected = live
                .iter()
                .copied()
                .max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)));
            let best = frontier.peek_best();
            assert_eq!(best.map(|e| e.node), expected.map(|e| e.0));
            assert_eq!(frontier.best_score(), expected.map(|e| e.1));
            assert_eq!(frontier.len(), live.len());
        }
    }
}
