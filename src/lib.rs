//! # cute-tree
//!
//! A retained scene-graph reconciler for canvas-drawn component trees.
//!
//! Components declare their output as [`Element`] descriptors or as drawing
//! closures. The [`Tree`] keeps one retained node per declared element and, on
//! each frame, reconciles freshly rendered descriptors against what it already
//! holds: nodes whose identity (`key ?? type`) still matches are kept along with
//! their component state, the rest are mounted fresh or discarded. Three
//! independent invalidation flags keep the per-frame walk cheap: untouched
//! subtrees only receive geometry, moved subtrees skip rendering entirely.
//!
//! ## Core Systems
//!
//! - **[`element`]** — Element descriptors, component and primitive types, identity keys
//! - **[`component`]** — Component trait, state, per-frame invalidation requests
//! - **[`dom`]** — Slotmap-backed node arena, sibling matcher, scheduling hooks, destroy
//! - **[`reconcile`]** — Render, mount, prop diffing, re-render, geometry propagation
//! - **[`render`]** — Canvas contract and the save/translate/restore draw traversal
//! - **[`event`]** — Dispatch contract and an in-memory listener registry
//! - **[`schedule`]** — Scheduler contract and the default coalescing frame queue
//! - **[`screen`]** — Canvas ownership, frame driving, hit-testing
//! - **[`lifecycle`]** — Mount, render and unmount tracking
//! - **[`testing`]** — Recording canvas, fixtures, snapshot helpers
//!
//! ## Example
//!
//! ```
//! use cute_tree::screen::{Screen, ScreenConfig};
//! use cute_tree::testing::fixtures::{GROUP, RECT};
//! use cute_tree::testing::RecordingCanvas;
//! use cute_tree::Element;
//!
//! let mut screen = Screen::new(ScreenConfig::new().with_size(800.0, 600.0));
//! let root = screen
//!     .attach(
//!         Element::primitive(GROUP).with_child(Element::primitive(RECT).at(10.0, 5.0)),
//!         RecordingCanvas::new(),
//!     )
//!     .unwrap();
//! screen.frame().unwrap();
//!
//! let child = screen.tree().node(root).unwrap().declared_children()[0];
//! assert_eq!(screen.tree().screen_position(child).unwrap().x, 10.0);
//! ```

// Foundation
pub mod error;
pub mod geometry;
pub mod props;

// Declarations
pub mod component;
pub mod element;

// Core systems
pub mod dom;
pub mod lifecycle;
pub mod reconcile;
pub mod schedule;

// Events and drawing
pub mod event;
pub mod render;

// Application
pub mod screen;

// Test support
pub mod testing;

pub use component::{Component, Construct, Invalidate, Render, RenderCx, State};
pub use dom::{NodeId, Tree};
pub use element::{create_element, ComponentType, Element, Primitive};
pub use error::{ReconcileError, Result};
pub use props::{Key, PropValue, Props};
pub use render::{Canvas, DrawFn};
