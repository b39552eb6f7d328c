//! In-memory listener registry.
//!
//! [`ListenerRegistry`] is the default [`Dispatch`] implementation. It keeps
//! listeners in registration order and fires every listener whose event type
//! matches. Routing by hit-test (which component was clicked) belongs to the
//! screen; the registry only filters by type and owner.

use std::any::Any;

use super::dispatch::{Dispatch, Event, Handler};
use crate::dom::node::NodeId;

struct Listener {
    owner: NodeId,
    event: String,
    persistent: bool,
    handler: Handler,
}

// ---------------------------------------------------------------------------
// ListenerRegistry
// ---------------------------------------------------------------------------

/// Ordered listener storage keyed by owning node.
#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Vec<Listener>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke every listener registered for `event.kind`, in registration order.
    ///
    /// Returns the number of handlers invoked.
    pub fn fire(&mut self, event: &Event) -> usize {
        let mut fired = 0;
        for listener in self.listeners.iter_mut().filter(|l| l.event == event.kind) {
            (listener.handler)(event);
            fired += 1;
        }
        fired
    }

    /// Invoke only the listeners `owner` holds for `event.kind`.
    pub fn fire_for(&mut self, owner: NodeId, event: &Event) -> usize {
        let mut fired = 0;
        for listener in self
            .listeners
            .iter_mut()
            .filter(|l| l.owner == owner && l.event == event.kind)
        {
            (listener.handler)(event);
            fired += 1;
        }
        fired
    }

    /// Number of listeners (ordinary and persistent) owned by `owner`.
    pub fn count_for(&self, owner: NodeId) -> usize {
        self.listeners.iter().filter(|l| l.owner == owner).count()
    }

    /// Number of persistent listeners owned by `owner`.
    pub fn persistent_count_for(&self, owner: NodeId) -> usize {
        self.listeners
            .iter()
            .filter(|l| l.owner == owner && l.persistent)
            .count()
    }

    /// Total number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listeners are registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    fn push(&mut self, owner: NodeId, event: &str, handler: Handler, persistent: bool) {
        self.listeners.push(Listener {
            owner,
            event: event.to_owned(),
            persistent,
            handler,
        });
    }
}

impl Dispatch for ListenerRegistry {
    fn add_event_listener(&mut self, owner: NodeId, event: &str, handler: Handler) {
        self.push(owner, event, handler, false);
    }

    fn remove_event_listeners(&mut self, owner: NodeId) {
        self.listeners.retain(|l| l.owner != owner || l.persistent);
    }

    fn add_persistent_listener(&mut self, owner: NodeId, event: &str, handler: Handler) {
        // One persistent listener per (owner, type).
        self.remove_persistent_listener(owner, event);
        self.push(owner, event, handler, true);
    }

    fn remove_persistent_listener(&mut self, owner: NodeId, event: &str) {
        self.listeners
            .retain(|l| !(l.owner == owner && l.persistent && l.event == event));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
