//! Code tree arena
//!
//! Every hypothesis the decoder materializes lives in one arena, indexed by
//! its creation order. Parents and children refer to each other by
//! [`NodeId`], so backtracking never has to follow owning pointers and the
//! whole tree stays valid until it is cleared.
//!
//! ```text
//!                  root (depth None)
//!                 /                \
//!          #1 sym 0, d0        #2 sym 1, d0
//!           /       \              ...
//!   #3 sym 0, d1  #4 sym 1, d1
//! ```

use crate::types::{InputSymbol, Register};
use std::fmt;
use std::io::{self, Write};

/// Stable identifier of a tree node, equal to its creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// Index of the node in the arena.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One vertex of the code tree.
#[derive(Debug, Clone)]
pub struct TreeNode {
    id: NodeId,
    parent: Option<NodeId>,
    /// Message position of this node, `None` for the root
    depth: Option<usize>,
    symbol: InputSymbol,
    edge_metric: f32,
    path_metric: f32,
    /// Encoder registers after this node's transition
    registers: Vec<Register>,
    /// One slot per possible input symbol
    children: Vec<Option<NodeId>>,
}

impl TreeNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn depth(&self) -> Option<usize> {
        self.depth
    }

    /// Depth of this node's children.
    pub fn forward_depth(&self) -> usize {
        self.depth.map_or(0, |d| d + 1)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Input symbol on the incoming edge (0 for the root).
    pub fn symbol(&self) -> InputSymbol {
        self.symbol
    }

    pub fn edge_metric(&self) -> f32 {
        self.edge_metric
    }

    pub fn path_metric(&self) -> f32 {
        self.path_metric
    }

    pub fn registers(&self) -> &[Register] {
        &self.registers
    }

    /// Child reached with input `symbol`, if it was materialized.
    pub fn child(&self, symbol: InputSymbol) -> Option<NodeId> {
        self.children.get(symbol as usize).copied().flatten()
    }

    /// Materialized children in input symbol order.
    pub fn children(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().filter_map(|c| *c)
    }
}

/// Arena owning every node of one decode.
#[derive(Debug, Clone, Default)]
pub struct CodeTree {
    nodes: Vec<TreeNode>,
    fanout: usize,
}

impl CodeTree {
    /// Empty tree whose nodes have `fanout` child slots (2^k).
    pub fn new(fanout: usize) -> Self {
        Self {
            nodes: Vec::new(),
            fanout,
        }
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Number of materialized nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.nodes.first().map(|n| n.id)
    }

    /// Id the next materialized node will receive.
    pub fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len())
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        self.nodes.iter()
    }

    /// Clear the tree and create the root with zero path metric.
    pub fn init_root(&mut self, registers: &[Register]) -> NodeId {
        self.nodes.clear();
        self.push(None, None, 0, 0.0, 0.0, registers)
    }

    /// Materialize the child of `parent` reached with input `symbol`.
    ///
    /// The path metric is the parent's plus `edge_metric`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        symbol: InputSymbol,
        edge_metric: f32,
        registers: &[Register],
    ) -> NodeId {
        let (depth, path_metric) = {
            let p = self.node(parent);
            (p.forward_depth(), p.path_metric + edge_metric)
        };
        let id = self.push(Some(parent), Some(depth), symbol, edge_metric, path_metric, registers);
        self.nodes[parent.index()].children[symbol as usize] = Some(id);
        id
    }

    fn push(
        &mut self,
        parent: Option<NodeId>,
        depth: Option<usize>,
        symbol: InputSymbol,
        edge_metric: f32,
        path_metric: f32,
        registers: &[Register],
    ) -> NodeId {
        let id = self.next_id();
        self.nodes.push(TreeNode {
            id,
            parent,
            depth,
            symbol,
            edge_metric,
            path_metric,
            registers: registers.to_vec(),
            children: vec![None; self.fanout],
        });
        id
    }

    /// Input symbols from the root down to `node`, in message order.
    pub fn back_track(&self, node: NodeId) -> Vec<InputSymbol> {
        let mut symbols = Vec::with_capacity(self.node(node).forward_depth());
        let mut current = self.node(node);
        while let Some(parent) = current.parent {
            symbols.push(current.symbol);
            current = self.node(parent);
        }
        symbols.reverse();
        symbols
    }

    /// Write the tree in Graphviz dot format.
    ///
    /// Nodes on the path to `highlight` are drawn in red.
    pub fn write_dot<W: Write>(&self, out: &mut W, highlight: Option<NodeId>) -> io::Result<()> {
        let mut on_path = vec![false; self.nodes.len()];
        let mut cursor = highlight.and_then(|id| self.get(id));
        while let Some(node) = cursor {
            on_path[node.id.index()] = true;
            cursor = node.parent.map(|p| self.node(p));
        }

        writeln!(out, "digraph codetree {{")?;
        for node in &self.nodes {
            let color = if on_path[node.id.index()] { ", color=red" } else { "" };
            writeln!(
                out,
                "    n{} [label=\"{}\\n{:.2}\"{}];",
                node.id.0, node.id.0, node.path_metric, color
            )?;
        }
        for node in &self.nodes {
            if let Some(parent) = node.parent {
                writeln!(
                    out,
                    "    n{} -> n{} [label=\"{}:{:.2}\"];",
                    parent.0, node.id.0, node.symbol, node.edge_metric
                )?;
            }
        }
        writeln!(out, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_tree() -> (CodeTree, NodeId) {
        let mut tree = CodeTree::new(2);
        let root = tree.init_root(&[0]);
        let a = tree.add_child(root, 0, -0.5, &[0]);
        let b = tree.add_child(root, 1, -1.0, &[1]);
        let _ = tree.add_child(a, 1, -2.0, &[1]);
        let leaf = tree.add_child(b, 0, -0.25, &[2]);
        (tree, leaf)
    }

    #[test]
    fn test_ids_follow_creation_order() {
        let (tree, leaf) = small_tree();
        assert_eq!(tree.len(), 5);
        assert_eq!(leaf, NodeId(4));
        assert_eq!(tree.root(), Some(NodeId(0)));
        assert_eq!(tree.next_id(), NodeId(5));
        assert!(tree.node(NodeId(0)).is_root());
        assert_eq!(tree.node(NodeId(0)).depth(), None);
    }

    #[test]
    fn test_metrics_accumulate() {
        let (tree, leaf) = small_tree();
        let node = tree.node(leaf);
        assert_eq!(node.depth(), Some(1));
        assert_eq!(node.edge_metric(), -0.25);
        assert_eq!(node.path_metric(), -1.25);
        assert_eq!(node.registers(), &[2]);
    }

    #[test]
    fn test_child_slots() {
        let (tree, _) = small_tree();
        let root = tree.node(NodeId(0));
        assert_eq!(root.child(0), Some(NodeId(1)));
        assert_eq!(root.child(1), Some(NodeId(2)));
        assert_eq!(root.children().count(), 2);
        assert_eq!(tree.node(NodeId(1)).child(0), None);
        assert_eq!(tree.node(NodeId(1)).child(1), Some(NodeId(3)));
        assert_eq!(tree.node(NodeId(1)).child(7), None);
    }

    #[test]
    fn test_back_track() {
        let (tree, leaf) = small_tree();
        assert_eq!(tree.back_track(leaf), vec![1, 0]);
        assert_eq!(tree.back_track(NodeId(3)), vec![0, 1]);
        assert!(tree.back_track(NodeId(0)).is_empty());
        // Backtracking leaves the tree untouched
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn test_write_dot() {
        let (tree, leaf) = small_tree();
        let mut out = Vec::new();
        tree.write_dot(&mut out, Some(leaf)).unwrap();
        let dot = String::from_utf8(out).unwrap();

        assert!(dot.starts_with("digraph codetree {"));
        assert!(dot.contains("n2 -> n4 [label=\"0:-0.25\"];"));
        assert!(dot.contains("n4 [label=\"4\\n-1.25\", color=red];"));
        assert!(dot.contains("n3 [label=\"3\\n-2.50\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn test_init_root_clears() {
        let (mut tree, _) = small_tree();
        let root = tree.init_root(&[0]);
        assert_eq!(root, NodeId(0));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.node(root).path_metric(), 0.0);
    }
}
