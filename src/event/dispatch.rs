//! Dispatch contract: how the tree hands listeners to the event subsystem.
//!
//! Listeners are owned by interactive nodes and keyed by their [`NodeId`]. The
//! tree never decides which listener runs for an input; it only registers and
//! releases them so that a discarded or destroyed component cannot keep
//! receiving events.

use std::any::Any;

use crate::dom::node::NodeId;
use crate::geometry::Point;

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// An input event as delivered to listeners.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event type, e.g. `"click"` or `"mousemoveG"`.
    pub kind: String,
    /// Canvas-space pointer position, if the event carries one.
    pub position: Option<Point>,
}

impl Event {
    /// Create an event with no position.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            position: None,
        }
    }

    /// Create a pointer event at canvas coordinates.
    pub fn at(kind: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            kind: kind.into(),
            position: Some(Point::new(x, y)),
        }
    }
}

/// A registered listener callback.
pub type Handler = Box<dyn FnMut(&Event)>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// The event-dispatch collaborator.
///
/// Ordinary listeners are released together by [`remove_event_listeners`];
/// persistent listeners survive that call and are released one event type at a
/// time.
///
/// [`remove_event_listeners`]: Dispatch::remove_event_listeners
pub trait Dispatch {
    /// Register an ordinary listener for `owner`.
    fn add_event_listener(&mut self, owner: NodeId, event: &str, handler: Handler);

    /// Release every ordinary listener owned by `owner`.
    fn remove_event_listeners(&mut self, owner: NodeId);

    /// Register a listener that survives [`Dispatch::remove_event_listeners`].
    fn add_persistent_listener(&mut self, owner: NodeId, event: &str, handler: Handler);

    /// Release the persistent listener `owner` holds for `event`.
    fn remove_persistent_listener(&mut self, owner: NodeId, event: &str);

    /// Downcast to `&dyn Any` for inspecting a concrete dispatcher.
    fn as_any(&self) -> &dyn Any;

    /// Downcast to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
