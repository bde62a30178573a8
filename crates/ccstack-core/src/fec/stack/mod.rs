//! Stack (Zigangirov-Jelinek) sequential decoding
//!
//! - [`tree`]: arena of code tree nodes, addressed by [`NodeId`]
//! - [`frontier`]: metric-ordered set of expandable leaves
//! - [`decoder`]: the search driver, [`StackDecoder`]

pub mod decoder;
pub mod frontier;
pub mod tree;

pub use decoder::{DecoderConfig, StackDecoder};
pub use frontier::{Frontier, FrontierEntry};
pub use tree::{CodeTree, NodeId, TreeNode};
