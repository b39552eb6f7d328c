//! Node lifecycle: mount, render, unmount tracking.
//!
//! The `LifecycleTracker` records which nodes are currently mounted, counts
//! how many times each one did render work, and accumulates lifecycle events
//! that the application (or a test) can drain after a frame.

use std::collections::{HashMap, HashSet};

use crate::dom::node::NodeId;

// ---------------------------------------------------------------------------
// LifecycleEvent
// ---------------------------------------------------------------------------

/// Events that occur as the tree reconciles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// First render of a node (`recursive_render`).
    Mount { node_id: NodeId },
    /// A `rerender` that did render work (flags were set).
    Render { node_id: NodeId },
    /// The node was removed from the tree; its listeners are gone.
    Unmount { node_id: NodeId },
}

// ---------------------------------------------------------------------------
// LifecycleTracker
// ---------------------------------------------------------------------------

/// Mounted-set, per-node render counts, and a pending event queue.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    mounted: HashSet<NodeId>,
    renders: HashMap<NodeId, usize>,
    pending: Vec<LifecycleEvent>,
}

impl LifecycleTracker {
    /// Create a new, empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a first render. Counts as one render of the node.
    ///
    /// A node that is already mounted produces no second `Mount` event.
    pub fn on_mount(&mut self, id: NodeId) {
        *self.renders.entry(id).or_default() += 1;
        if self.mounted.insert(id) {
            self.pending.push(LifecycleEvent::Mount { node_id: id });
        }
    }

    /// Record a re-render that did work. Ignored for nodes that are not mounted.
    pub fn on_render(&mut self, id: NodeId) {
        if self.mounted.contains(&id) {
            *self.renders.entry(id).or_default() += 1;
            self.pending.push(LifecycleEvent::Render { node_id: id });
        }
    }

    /// Record removal from the tree.
    ///
    /// Nodes that never mounted (adopted, then dropped before their first pass)
    /// produce no event.
    pub fn on_unmount(&mut self, id: NodeId) {
        self.renders.remove(&id);
        if self.mounted.remove(&id) {
            self.pending.push(LifecycleEvent::Unmount { node_id: id });
        }
    }

    /// Whether a node is currently mounted.
    pub fn is_mounted(&self, id: NodeId) -> bool {
        self.mounted.contains(&id)
    }

    /// How many times a mounted node has rendered, mount included.
    pub fn renders(&self, id: NodeId) -> usize {
        self.renders.get(&id).copied().unwrap_or(0)
    }

    /// The number of currently mounted nodes.
    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    /// Drain and return all pending events, oldest first.
    pub fn drain(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Whether there are any pending events.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
