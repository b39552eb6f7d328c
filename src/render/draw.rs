//! The draw traversal.
//!
//! Every node draws inside its own save/restore scope, translated by its local
//! offset, so children paint relative to their parent and canvas state never
//! leaks between siblings.

use super::canvas::{Canvas, Saved};
use crate::dom::node::{NodeId, Rendered};
use crate::dom::Tree;
use crate::error::{ReconcileError, Result};

impl Tree {
    /// Paint the subtree under `id` onto `canvas`.
    ///
    /// Destroyed nodes are skipped with their subtrees. A node without a
    /// screen position or without render output is an error; the canvas is
    /// left balanced either way.
    pub fn draw(&self, id: NodeId, canvas: &mut dyn Canvas) -> Result<()> {
        let node = self.node(id)?;
        if node.destroyed {
            return Ok(());
        }
        if node.screen.is_none() {
            return Err(ReconcileError::MissingGeometry(id));
        }
        let rendered = node.rendered.as_ref().ok_or(ReconcileError::NotRendered(id))?;

        let mut scoped = Saved::new(canvas);
        scoped.translate(node.x, node.y);
        match rendered {
            Rendered::Node(child) => self.draw(*child, &mut *scoped)?,
            Rendered::Draw(paint) => {
                paint.call(&mut *scoped);
                for &child in node.children().unwrap_or(&[]) {
                    self.draw(child, &mut *scoped)?;
                }
            }
        }
        Ok(())
    }
}
