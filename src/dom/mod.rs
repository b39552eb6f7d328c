//! Retained tree: slotmap-backed node arena, sibling matcher, collaborators.

pub mod matcher;
pub mod node;
pub mod tree;

pub use matcher::ChildMatcher;
pub use node::{Invalidation, Node, NodeId, Rendered};
pub use tree::Tree;
