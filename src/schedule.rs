//! Scheduler contract and the default coalescing frame queue.
//!
//! Scheduling hooks only record *that* a node needs work; the tree walk happens
//! later, when the frame driver calls [`Tree::process_frame`]. The queue keeps
//! each node at most once per pass and preserves first-request order.
//!
//! [`Tree::process_frame`]: crate::dom::Tree::process_frame

use std::any::Any;
use std::collections::HashSet;

use crate::dom::node::NodeId;

/// The three traversal entry points a scheduler can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    /// Time-driven per-frame hook (`recursive_update`).
    Update,
    /// Content or state change (`rerender`).
    Render,
    /// Position-only change (`recursive_move`).
    Move,
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// The frame-scheduler collaborator.
pub trait Scheduler {
    /// A node's content or state changed.
    fn schedule_render(&mut self, id: NodeId);

    /// A node wants its per-frame update hook called.
    fn schedule_update(&mut self, id: NodeId);

    /// A node's position changed without needing a render.
    fn schedule_move(&mut self, id: NodeId);

    /// Drain the distinct nodes requested for `pass`, in request order.
    fn take(&mut self, pass: Pass) -> Vec<NodeId>;

    /// Whether any pass has pending work.
    fn has_pending(&self) -> bool;

    /// Downcast to `&dyn Any` for inspecting a concrete scheduler.
    fn as_any(&self) -> &dyn Any;
}

// ---------------------------------------------------------------------------
// FrameQueue
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct PassQueue {
    order: Vec<NodeId>,
    seen: HashSet<NodeId>,
}

impl PassQueue {
    fn push(&mut self, id: NodeId) {
        if self.seen.insert(id) {
            self.order.push(id);
        }
    }

    fn take(&mut self) -> Vec<NodeId> {
        self.seen.clear();
        std::mem::take(&mut self.order)
    }
}

/// Coalescing per-pass queue; the default [`Scheduler`].
#[derive(Debug, Default)]
pub struct FrameQueue {
    update: PassQueue,
    render: PassQueue,
    moved: PassQueue,
}

impl FrameQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending node ids for `pass` without draining them.
    pub fn pending(&self, pass: Pass) -> &[NodeId] {
        &self.queue(pass).order
    }

    fn queue(&self, pass: Pass) -> &PassQueue {
        match pass {
            Pass::Update => &self.update,
            Pass::Render => &self.render,
            Pass::Move => &self.moved,
        }
    }

    fn queue_mut(&mut self, pass: Pass) -> &mut PassQueue {
        match pass {
            Pass::Update => &mut self.update,
            Pass::Render => &mut self.render,
            Pass::Move => &mut self.moved,
        }
    }
}

impl Scheduler for FrameQueue {
    fn schedule_render(&mut self, id: NodeId) {
        self.render.push(id);
    }

    fn schedule_update(&mut self, id: NodeId) {
        self.update.push(id);
    }

    fn schedule_move(&mut self, id: NodeId) {
        self.moved.push(id);
    }

    fn take(&mut self, pass: Pass) -> Vec<NodeId> {
        self.queue_mut(pass).take()
    }

    fn has_pending(&self) -> bool {
        !(self.update.order.is_empty() && self.render.order.is_empty() && self.moved.order.is_empty())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
