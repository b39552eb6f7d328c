//! Geometry propagation: parent links, size inheritance, screen positions.
//!
//! A node's screen position is its local offset plus its parent's screen
//! position, recomputed whenever the node is (re)attached. Undeclared sizes are
//! copied from the parent at attach time, so a parent's size change reaches its
//! children on the next propagation, not the current one.

use crate::dom::node::{Node, NodeId};
use crate::dom::Tree;
use crate::error::{ReconcileError, Result};
use crate::geometry::{Point, Size};

impl Tree {
    /// Attach `id` under `parent` and resolve its geometry.
    ///
    /// The parent must already have a screen position.
    pub fn set_parent(&mut self, id: NodeId, parent: NodeId) -> Result<()> {
        let (parent_screen, parent_w, parent_h) = {
            let p = self.node(parent)?;
            (p.screen.ok_or(ReconcileError::MissingGeometry(parent))?, p.w, p.h)
        };

        let node = self.node_mut(id)?;
        node.parent = Some(parent);
        pull_position(node);
        if node.declared_size.0.is_none() {
            node.w = parent_w;
        }
        if node.declared_size.1.is_none() {
            node.h = parent_h;
        }
        let screen = parent_screen + node.local();
        node.screen = Some(screen);

        tracing::trace!(?id, ?parent, x = screen.x, y = screen.y, w = ?node.w, h = ?node.h, "set_parent");
        Ok(())
    }

    /// Position a parentless node at the tree origin with a viewport size.
    ///
    /// Declared sizes win over `viewport`.
    pub fn place_root(&mut self, id: NodeId, viewport: Size) -> Result<()> {
        let origin = self.origin;
        let node = self.node_mut(id)?;
        node.parent = None;
        pull_position(node);
        if node.declared_size.0.is_none() {
            node.w = Some(viewport.width);
        }
        if node.declared_size.1.is_none() {
            node.h = Some(viewport.height);
        }
        node.screen = Some(origin + node.local());
        tracing::debug!(?id, w = viewport.width, h = viewport.height, "placed root");
        Ok(())
    }

    /// Move pass: re-propagate geometry through the subtree under `id`
    /// without rendering anything.
    pub fn recursive_move(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.destroyed {
            return Ok(());
        }
        node.flags.take_moved();
        let parent = node.parent;
        match parent {
            Some(parent) => self.set_parent(id, parent)?,
            None => {
                let origin = self.origin;
                let node = self.node_mut(id)?;
                pull_position(node);
                node.screen = Some(origin + node.local());
            }
        }
        self.propagate(id)
    }

    fn propagate(&mut self, id: NodeId) -> Result<()> {
        for child in self.node(id)?.traversal_children() {
            self.set_parent(child, id)?;
            self.node_mut(child)?.flags.take_moved();
            self.propagate(child)?;
        }
        Ok(())
    }

    /// Absolute screen position of `id`, once propagated.
    pub fn screen_position(&self, id: NodeId) -> Result<Point> {
        self.node(id)?.screen.ok_or(ReconcileError::MissingGeometry(id))
    }
}

/// Let a component's live position override its props.
fn pull_position(node: &mut Node) {
    let live = node.instance.as_ref().and_then(|instance| instance.component.position());
    if let Some(position) = live {
        node.x = position.x;
        node.y = position.y;
    }
}

// ===========================================================================
// Tests
// ===========================================================================
