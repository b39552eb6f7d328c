//! Component trait: interactive, stateful tree units.
//!
//! An interactive component is constructed once per node, on that node's first
//! render, and lives as long as the node does. Re-renders of the same node call
//! [`Component::render`] on the same instance; a new node always gets a fresh
//! instance. Primitives, by contrast, are plain functions (see
//! [`Primitive`](crate::element::Primitive)).

use std::any::Any;
use std::time::Duration;

use bitflags::bitflags;

use crate::dom::node::NodeId;
use crate::element::Element;
use crate::geometry::{Point, Size};
use crate::props::{PropValue, Props};
use crate::render::canvas::DrawFn;

// ---------------------------------------------------------------------------
// Render
// ---------------------------------------------------------------------------

/// The output of a render: a nested element or a drawing closure.
#[derive(Debug)]
pub enum Render {
    /// Composite output, reconciled as this node's single rendered child.
    Element(Element),
    /// Leaf output, drawn directly.
    Draw(DrawFn),
}

impl From<Element> for Render {
    fn from(element: Element) -> Self {
        Render::Element(element)
    }
}

impl From<DrawFn> for Render {
    fn from(draw: DrawFn) -> Self {
        Render::Draw(draw)
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Internal component state plus its update flag.
///
/// The flag is raised by [`Tree::set_state`] and cleared once the owning node
/// has re-rendered. State is never deep-compared.
///
/// [`Tree::set_state`]: crate::dom::Tree::set_state
#[derive(Debug, Clone, Default)]
pub struct State {
    values: Props,
    updated: bool,
}

impl State {
    /// State seeded with initial values.
    pub fn new(values: Props) -> Self {
        Self { values, updated: false }
    }

    /// Read a state value.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.values.get(key)
    }

    /// Numeric state lookup.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.values.number(key)
    }

    /// Text state lookup.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.values.text(key)
    }

    /// All values.
    pub fn values(&self) -> &Props {
        &self.values
    }

    /// Whether the state changed since the last render.
    pub fn is_updated(&self) -> bool {
        self.updated
    }

    pub(crate) fn set(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        self.values.insert(key, value);
        self.updated = true;
    }

    pub(crate) fn clear_updated(&mut self) {
        self.updated = false;
    }
}

// ---------------------------------------------------------------------------
// RenderCx
// ---------------------------------------------------------------------------

/// What a component sees while rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderCx<'a> {
    /// The node that owns the component.
    pub node: NodeId,
    /// Current props, with the node's resolved `w`/`h` injected when undeclared.
    pub props: &'a Props,
    /// Current state.
    pub state: &'a State,
}

impl RenderCx<'_> {
    /// The `w`/`h` props as a size; unset dimensions read as zero.
    pub fn size(&self) -> Size {
        Size::new(
            self.props.number("w").unwrap_or(0.0),
            self.props.number("h").unwrap_or(0.0),
        )
    }
}

// ---------------------------------------------------------------------------
// Invalidate
// ---------------------------------------------------------------------------

bitflags! {
    /// Work requested by [`Component::update`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Invalidate: u8 {
        /// Content changed; schedule a render.
        const RENDER = 0b01;
        /// Position changed; schedule a move.
        const MOVE = 0b10;
        /// Keep calling `update` on the next frame too.
        const UPDATE = 0b100;
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// An interactive component.
///
/// Object-safe: constructors live on [`Construct`], which is only needed where
/// the concrete type is known.
pub trait Component: Any {
    /// Produce this frame's output.
    fn render(&self, cx: &RenderCx<'_>) -> Render;

    /// Pre-render hook: the parent supplied props that differ from the last frame.
    fn receive_props(&mut self, _props: &Props) {}

    /// Live position, for components whose `x`/`y` are driven by input or
    /// animation rather than by props. Pulled on every geometry propagation.
    fn position(&self) -> Option<Point> {
        None
    }

    /// Time-driven per-frame hook. Called once per scheduled update; return
    /// [`Invalidate::UPDATE`] to be called again next frame.
    fn update(&mut self, _dt: Duration) -> Invalidate {
        Invalidate::empty()
    }

    /// Downcast to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Downcast to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Construction half of an interactive component.
pub trait Construct: Component + Sized {
    /// Build the instance from the props of its first render.
    fn construct(props: &Props) -> Self;

    /// Initial state values. Empty by default.
    fn initial_state(_props: &Props) -> Props {
        Props::new()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
