//! Screen: owns the canvas, the tree root and the frame loop entry points.
//!
//! [`Screen`] attaches a root element to a canvas, drives one frame at a time
//! (scheduled passes, then a full draw), and answers geometric queries through
//! a pluggable [`HitTest`].

use std::time::Duration;

use crate::dom::node::NodeId;
use crate::dom::Tree;
use crate::element::Element;
use crate::error::{ReconcileError, Result};
use crate::geometry::{Point, Region, Size};
use crate::reconcile::FrameStats;
use crate::render::canvas::{Canvas, Saved};

// ---------------------------------------------------------------------------
// ScreenConfig
// ---------------------------------------------------------------------------

/// Configuration for a screen.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenConfig {
    /// Viewport width handed to the root.
    pub width: f64,
    /// Viewport height handed to the root.
    pub height: f64,
    /// Canvas offset of the root.
    pub origin: Point,
    /// Target frames per second; sets the update delta.
    pub fps: u32,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            origin: Point::ORIGIN,
            fps: 60,
        }
    }
}

impl ScreenConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the viewport size (builder).
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the root offset (builder).
    pub fn with_origin(mut self, x: f64, y: f64) -> Self {
        self.origin = Point::new(x, y);
        self
    }

    /// Set the target FPS (builder).
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    pub fn viewport(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Time step passed to update hooks each frame. Zero FPS is treated as one.
    pub fn frame_delta(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

// ---------------------------------------------------------------------------
// HitTest
// ---------------------------------------------------------------------------

/// Geometric queries over a mounted tree.
pub trait HitTest {
    /// Interactive nodes whose area overlaps `id`'s, in draw order.
    fn intersections(&self, tree: &Tree, root: NodeId, id: NodeId) -> Vec<NodeId>;
}

/// Axis-aligned bounds test on screen position and resolved size.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundsHitTest;

impl BoundsHitTest {
    /// A node's screen-space box, if it has been positioned and sized.
    pub fn bounds(tree: &Tree, id: NodeId) -> Option<Region> {
        let node = tree.get(id)?;
        Some(node.size()?.at(node.screen()?))
    }
}

impl HitTest for BoundsHitTest {
    fn intersections(&self, tree: &Tree, root: NodeId, id: NodeId) -> Vec<NodeId> {
        let Some(target) = Self::bounds(tree, id) else {
            return Vec::new();
        };
        tree.walk_depth_first(root)
            .into_iter()
            .filter(|&other| other != id)
            .filter(|&other| {
                tree.get(other)
                    .is_some_and(|node| node.node_type().is_interactive() && !node.is_destroyed())
            })
            .filter(|&other| Self::bounds(tree, other).is_some_and(|b| b.overlaps(target)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Screen
// ---------------------------------------------------------------------------

/// A canvas with one attached tree.
pub struct Screen<C: Canvas> {
    tree: Tree,
    root: Option<NodeId>,
    canvas: Option<C>,
    config: ScreenConfig,
    hit_test: Box<dyn HitTest>,
}

impl<C: Canvas> Screen<C> {
    /// A screen with a fresh [`Tree`].
    pub fn new(config: ScreenConfig) -> Self {
        Self::with_tree(Tree::new(), config)
    }

    /// A screen around a pre-configured tree (custom collaborators, primitives).
    pub fn with_tree(mut tree: Tree, config: ScreenConfig) -> Self {
        tree.set_origin(config.origin);
        Self {
            tree,
            root: None,
            canvas: None,
            config,
            hit_test: Box::new(BoundsHitTest),
        }
    }

    /// Replace the hit-test strategy (builder).
    pub fn with_hit_test(mut self, hit_test: impl HitTest + 'static) -> Self {
        self.hit_test = Box::new(hit_test);
        self
    }

    /// Mount `root` onto `canvas`, replacing whatever was attached before.
    pub fn attach(&mut self, root: Element, canvas: C) -> Result<NodeId> {
        self.detach();
        let id = self.tree.insert(root)?;
        self.tree.place_root(id, self.config.viewport())?;
        if let Err(err) = self.tree.recursive_render(id) {
            self.tree.discard(id);
            return Err(err);
        }
        self.root = Some(id);
        self.canvas = Some(canvas);
        tracing::debug!(?id, nodes = self.tree.len(), "attached");
        Ok(id)
    }

    /// Run the scheduled passes, then redraw the whole tree.
    pub fn frame(&mut self) -> Result<FrameStats> {
        let stats = self.tree.process_frame(self.config.frame_delta())?;
        self.draw()?;
        Ok(stats)
    }

    /// Redraw without processing scheduled work. No-op when detached.
    pub fn draw(&mut self) -> Result<()> {
        let (Some(root), Some(canvas)) = (self.root, self.canvas.as_mut()) else {
            return Ok(());
        };
        let mut scoped = Saved::new(canvas);
        scoped.translate(self.config.origin.x, self.config.origin.y);
        self.tree.draw(root, &mut *scoped)
    }

    /// Unmount the tree, releasing every listener, and hand the canvas back.
    pub fn detach(&mut self) -> Option<C> {
        if let Some(root) = self.root.take() {
            self.tree.discard(root);
            tracing::debug!(?root, "detached");
        }
        self.canvas.take()
    }

    /// Interactive nodes overlapping `id`.
    pub fn intersections(&self, id: NodeId) -> Result<Vec<NodeId>> {
        let root = self.root.ok_or(ReconcileError::UnknownNode(id))?;
        self.tree.node(id)?;
        Ok(self.hit_test.intersections(&self.tree, root, id))
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn canvas(&self) -> Option<&C> {
        self.canvas.as_ref()
    }

    pub fn canvas_mut(&mut self) -> Option<&mut C> {
        self.canvas.as_mut()
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }
}

// ===========================================================================
// Tests
// ===========================================================================
