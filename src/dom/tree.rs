//! The retained tree: node arena, collaborators, scheduling hooks, destroy.
//!
//! Reconciliation (`render`, `rerender`, `receive_props`), geometry
//! propagation and drawing are further `impl Tree` blocks in
//! [`crate::reconcile`] and [`crate::render::draw`].

use std::collections::HashSet;

use slotmap::SlotMap;

use super::node::{resolve_type, Node, NodeId, Rendered};
use crate::component::Component;
use crate::element::{Element, ElementType, IdentityKey, NodeType, Primitive, PrimitiveRegistry};
use crate::error::{ReconcileError, Result};
use crate::event::{Dispatch, Handler, ListenerRegistry};
use crate::geometry::Point;
use crate::lifecycle::LifecycleTracker;
use crate::props::{structural_eq, PropValue, PropsEq};
use crate::schedule::{FrameQueue, Scheduler};

/// The retained scene graph.
///
/// All nodes live in one `SlotMap`. Ownership is expressed through node ids:
/// a node owns its rendered child and its declared children; the parent link
/// is a plain id and never keeps anything alive.
pub struct Tree {
    pub(crate) nodes: SlotMap<NodeId, Node>,
    pub(crate) scheduler: Box<dyn Scheduler>,
    pub(crate) dispatch: Box<dyn Dispatch>,
    pub(crate) primitives: PrimitiveRegistry,
    pub(crate) props_eq: PropsEq,
    pub(crate) lifecycle: LifecycleTracker,
    /// Canvas offset of parentless nodes.
    pub(crate) origin: Point,
}

impl Tree {
    /// An empty tree with the default [`FrameQueue`] and [`ListenerRegistry`].
    pub fn new() -> Self {
        Self::with_collaborators(Box::new(FrameQueue::new()), Box::new(ListenerRegistry::new()))
    }

    /// An empty tree with caller-supplied scheduler and dispatcher.
    pub fn with_collaborators(scheduler: Box<dyn Scheduler>, dispatch: Box<dyn Dispatch>) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            scheduler,
            dispatch,
            primitives: PrimitiveRegistry::new(),
            props_eq: structural_eq,
            lifecycle: LifecycleTracker::new(),
            origin: Point::ORIGIN,
        }
    }

    /// Register a primitive so elements can name it by tag.
    pub fn register_primitive(&mut self, primitive: Primitive) {
        self.primitives.register(primitive);
    }

    /// Replace the props comparison used by `receive_props`.
    pub fn set_props_eq(&mut self, props_eq: PropsEq) {
        self.props_eq = props_eq;
    }

    /// Set the canvas offset applied to parentless nodes.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    // -----------------------------------------------------------------------
    // Collaborators
    // -----------------------------------------------------------------------

    pub fn scheduler(&self) -> &dyn Scheduler {
        self.scheduler.as_ref()
    }

    pub fn scheduler_mut(&mut self) -> &mut dyn Scheduler {
        self.scheduler.as_mut()
    }

    pub fn dispatch(&self) -> &dyn Dispatch {
        self.dispatch.as_ref()
    }

    pub fn dispatch_mut(&mut self) -> &mut dyn Dispatch {
        self.dispatch.as_mut()
    }

    /// The dispatcher as its concrete type, if it is a `D`.
    pub fn dispatch_as<D: Dispatch + 'static>(&self) -> Option<&D> {
        self.dispatch.as_any().downcast_ref::<D>()
    }

    /// Mutable concrete dispatcher, if it is a `D`.
    pub fn dispatch_as_mut<D: Dispatch + 'static>(&mut self) -> Option<&mut D> {
        self.dispatch.as_any_mut().downcast_mut::<D>()
    }

    /// The scheduler as its concrete type, if it is an `S`.
    pub fn scheduler_as<S: Scheduler + 'static>(&self) -> Option<&S> {
        self.scheduler.as_any().downcast_ref::<S>()
    }

    pub fn lifecycle(&self) -> &LifecycleTracker {
        &self.lifecycle
    }

    pub fn lifecycle_mut(&mut self) -> &mut LifecycleTracker {
        &mut self.lifecycle
    }

    // -----------------------------------------------------------------------
    // Arena
    // -----------------------------------------------------------------------

    /// Adopt a detached element (and its declared children) into the arena.
    ///
    /// The node is not mounted; attach it with
    /// [`place_root`](Tree::place_root) and [`recursive_render`](Tree::recursive_render),
    /// or let a parent adopt it during reconciliation.
    pub fn insert(&mut self, element: Element) -> Result<NodeId> {
        self.adopt(element, None)
    }

    /// Adopt `element`, attributing resolution failures to `owner`.
    pub(crate) fn adopt(&mut self, element: Element, owner: Option<NodeId>) -> Result<NodeId> {
        let Element { ty, key, props, children, ref_hook } = element;
        let ty = self.resolve(&ty, owner)?;

        let mut declared = Vec::with_capacity(children.len());
        for child in children {
            match self.adopt(child, owner) {
                Ok(id) => declared.push(id),
                Err(err) => {
                    for id in declared {
                        self.discard(id);
                    }
                    return Err(err);
                }
            }
        }

        let mut node = Node::new(ty, key, props, ref_hook);
        if !declared.is_empty() {
            node.declared = Some(declared);
        }
        Ok(self.nodes.insert(node))
    }

    /// Resolve an element type against the primitive registry.
    pub(crate) fn resolve(&self, ty: &ElementType, owner: Option<NodeId>) -> Result<NodeType> {
        resolve_type(ty, |tag| self.primitives.lookup(tag).map(NodeType::Primitive)).map_err(|detail| {
            let parent = owner
                .and_then(|id| self.nodes.get(id))
                .map_or("root", |node| node.ty.name());
            ReconcileError::Shape { parent: parent.to_owned(), detail }
        })
    }

    /// The identity an element would match under.
    pub(crate) fn identity_of(&self, element: &Element, owner: Option<NodeId>) -> Result<(NodeType, IdentityKey)> {
        let ty = self.resolve(&element.ty, owner)?;
        Ok((ty, IdentityKey::of(element.key.as_ref(), &ty)))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Like [`get`](Tree::get), but a missing node is an error.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(id).ok_or(ReconcileError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(id).ok_or(ReconcileError::UnknownNode(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of nodes in the arena, mounted or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    /// Every node `id` owns: its rendered child, declared children and
    /// mounted children, without duplicates, in that order.
    fn owned(&self, id: NodeId) -> Vec<NodeId> {
        let Some(node) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut owned: Vec<NodeId> = node.rendered.as_ref().and_then(Rendered::node).into_iter().collect();
        for &child in node.declared_children().iter().chain(node.children().unwrap_or(&[])) {
            if !owned.contains(&child) {
                owned.push(child);
            }
        }
        owned
    }

    /// Pre-order walk of the drawn subtree under `start` (what draw visits).
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            result.push(current);
            // Reverse so the first child is visited first.
            for child in node.traversal_children().into_iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Remove `id` and everything it owns from the arena, releasing every
    /// listener the subtree held.
    pub(crate) fn discard(&mut self, id: NodeId) {
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            stack.extend(self.owned(current));
            self.release_listeners(current);
            if self.nodes.remove(current).is_some() {
                self.lifecycle.on_unmount(current);
            }
        }
        tracing::debug!(?id, removed = seen.len(), "discarded subtree");
    }

    /// Deregister every listener `id` holds, ordinary and persistent.
    fn release_listeners(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if !node.ty.is_interactive() {
            return;
        }
        let persistent = std::mem::take(&mut node.persistent);
        self.dispatch.remove_event_listeners(id);
        for event in persistent {
            self.dispatch.remove_persistent_listener(id, &event);
        }
    }

    /// Drop a destroyed node: unlink it from its parent, then discard it.
    ///
    /// Returns the parent when the node was that parent's composite output.
    /// The parent is left unrendered and flagged; the caller renders it again.
    pub(crate) fn reap(&mut self, id: NodeId) -> Result<Option<NodeId>> {
        let mut orphaned = None;
        if let Some(parent) = self.parent(id) {
            if let Some(node) = self.nodes.get_mut(parent) {
                if let Some(declared) = node.declared.as_mut() {
                    declared.retain(|&child| child != id);
                    if declared.is_empty() {
                        node.declared = None;
                    }
                }
                if let Some(children) = node.children.as_mut() {
                    children.retain(|&child| child != id);
                }
                if matches!(node.rendered, Some(Rendered::Node(child)) if child == id) {
                    node.rendered = None;
                    node.flags.is_updated = true;
                    orphaned = Some(parent);
                }
            }
        }
        self.discard(id);
        tracing::debug!(?id, ?orphaned, "reaped destroyed node");
        Ok(orphaned)
    }

    // -----------------------------------------------------------------------
    // Scheduling hooks
    // -----------------------------------------------------------------------

    /// Mark `id` for a full re-render and ask the scheduler for a render pass.
    pub fn schedule_render(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.flags.is_updated = true;
        self.scheduler.schedule_render(id);
        Ok(())
    }

    /// Ask the scheduler to call `id`'s per-frame update hook.
    pub fn schedule_update(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        self.scheduler.schedule_update(id);
        Ok(())
    }

    /// Mark `id` as moved and ask the scheduler for a move pass.
    pub fn schedule_move(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.flags.is_moved = true;
        self.scheduler.schedule_move(id);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Components and state
    // -----------------------------------------------------------------------

    /// Update a component state value and schedule a render of its node.
    pub fn set_state(&mut self, id: NodeId, key: &str, value: impl Into<PropValue>) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.destroyed {
            tracing::warn!(?id, key, "set_state on a destroyed node");
        }
        let instance = node.instance.as_mut().ok_or(ReconcileError::NotInteractive(id))?;
        instance.state.set(key, value);
        self.schedule_render(id)
    }

    /// The component instance of `id`, downcast to `C`.
    pub fn component<C: Component>(&self, id: NodeId) -> Option<&C> {
        let instance = self.nodes.get(id)?.instance.as_ref()?;
        instance.component.as_any().downcast_ref::<C>()
    }

    /// Mutable component instance of `id`, downcast to `C`.
    pub fn component_mut<C: Component>(&mut self, id: NodeId) -> Option<&mut C> {
        let instance = self.nodes.get_mut(id)?.instance.as_mut()?;
        instance.component.as_any_mut().downcast_mut::<C>()
    }

    // -----------------------------------------------------------------------
    // Listeners
    // -----------------------------------------------------------------------

    fn interactive(&self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if !node.ty.is_interactive() {
            return Err(ReconcileError::NotInteractive(id));
        }
        if node.destroyed {
            tracing::warn!(?id, "listener operation on a destroyed node");
        }
        Ok(())
    }

    /// Register an ordinary listener owned by `id`.
    pub fn add_event_listener(&mut self, id: NodeId, event: &str, handler: Handler) -> Result<()> {
        self.interactive(id)?;
        self.dispatch.add_event_listener(id, event, handler);
        Ok(())
    }

    /// Drop every ordinary listener owned by `id`.
    pub fn remove_event_listeners(&mut self, id: NodeId) -> Result<()> {
        self.interactive(id)?;
        self.dispatch.remove_event_listeners(id);
        Ok(())
    }

    /// Register a persistent listener: it survives `remove_event_listeners`
    /// and is only released by `destroy` or by removal from the tree.
    pub fn add_persistent_listener(&mut self, id: NodeId, event: &str, handler: Handler) -> Result<()> {
        self.interactive(id)?;
        let node = self.node_mut(id)?;
        if !node.persistent.iter().any(|e| e == event) {
            node.persistent.push(event.to_owned());
        }
        self.dispatch.add_persistent_listener(id, event, handler);
        Ok(())
    }

    pub fn remove_persistent_listener(&mut self, id: NodeId, event: &str) -> Result<()> {
        self.interactive(id)?;
        self.node_mut(id)?.persistent.retain(|e| e != event);
        self.dispatch.remove_persistent_listener(id, event);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Destroy
    // -----------------------------------------------------------------------

    /// Release every listener under `id` and schedule one final render, on
    /// which the node is unlinked from its parent and dropped.
    ///
    /// Destroyed nodes are skipped by draw and by sibling matching, so a
    /// parent re-render before the final pass mounts a fresh replacement.
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if seen.insert(current) {
                stack.extend(self.owned(current));
                self.release_listeners(current);
            }
        }
        self.node_mut(id)?.destroyed = true;
        self.scheduler.schedule_render(id);
        tracing::debug!(?id, released = seen.len(), "destroy");
        Ok(())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Tree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tree")
            .field("nodes", &self.nodes.len())
            .field("primitives", &self.primitives.len())
            .field("origin", &self.origin)
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::schedule::Pass;
    use crate::testing::fixtures::{Toggle, GROUP, RECT};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting_handler(hits: &Rc<Cell<u32>>) -> Handler {
        let hits = Rc::clone(hits);
        Box::new(move |_: &Event| hits.set(hits.get() + 1))
    }

    #[test]
    fn insert_adopts_declared_children() {
        let mut tree = Tree::new();
        let id = tree
            .insert(Element::primitive(GROUP).with_children([Element::primitive(RECT), Element::primitive(RECT)]))
            .unwrap();
        assert_eq!(tree.len(), 3);
        let node = tree.node(id).unwrap();
        assert_eq!(node.declared_children().len(), 2);
        assert!(!node.is_mounted());
    }

    #[test]
    fn insert_resolves_registered_tags() {
        let mut tree = Tree::new();
        tree.register_primitive(RECT);
        let id = tree.insert(Element::tag("rect")).unwrap();
        assert_eq!(tree.node(id).unwrap().node_type(), &NodeType::Primitive(RECT));
    }

    #[test]
    fn unknown_tag_is_a_shape_error_and_leaks_nothing() {
        let mut tree = Tree::new();
        let err = tree
            .insert(Element::primitive(GROUP).with_children([Element::primitive(RECT), Element::tag("blob")]))
            .unwrap_err();
        assert_eq!(
            err,
            ReconcileError::Shape {
                parent: "root".into(),
                detail: "unknown primitive `blob`".into(),
            }
        );
        assert!(tree.is_empty());
    }

    #[test]
    fn unknown_node_is_an_error() {
        let mut tree = Tree::new();
        let id = tree.insert(Element::primitive(RECT)).unwrap();
        tree.discard(id);
        assert_eq!(tree.node(id).unwrap_err(), ReconcileError::UnknownNode(id));
        assert_eq!(tree.schedule_render(id), Err(ReconcileError::UnknownNode(id)));
    }

    #[test]
    fn scheduling_hooks_set_flags_and_queue() {
        let mut tree = Tree::new();
        let id = tree.insert(Element::primitive(RECT)).unwrap();

        tree.schedule_render(id).unwrap();
        tree.schedule_move(id).unwrap();
        tree.schedule_update(id).unwrap();

        let flags = tree.node(id).unwrap().flags();
        assert!(flags.is_updated);
        assert!(flags.is_moved);
        assert!(!flags.props_updated);

        let queue = tree.scheduler_as::<FrameQueue>().unwrap();
        assert_eq!(queue.pending(Pass::Render), &[id]);
        assert_eq!(queue.pending(Pass::Move), &[id]);
        assert_eq!(queue.pending(Pass::Update), &[id]);
    }

    #[test]
    fn listeners_require_an_interactive_node() {
        let mut tree = Tree::new();
        let id = tree.insert(Element::primitive(RECT)).unwrap();
        let hits = Rc::new(Cell::new(0));
        assert_eq!(
            tree.add_event_listener(id, "click", counting_handler(&hits)),
            Err(ReconcileError::NotInteractive(id))
        );
    }

    #[test]
    fn persistent_listeners_are_tracked_per_node() {
        let mut tree = Tree::new();
        let id = tree.insert(Element::component::<Toggle>()).unwrap();
        let hits = Rc::new(Cell::new(0));

        tree.add_event_listener(id, "click", counting_handler(&hits)).unwrap();
        tree.add_persistent_listener(id, "keydown", counting_handler(&hits)).unwrap();
        tree.add_persistent_listener(id, "keydown", counting_handler(&hits)).unwrap();
        assert_eq!(tree.node(id).unwrap().persistent, vec!["keydown".to_string()]);

        tree.remove_event_listeners(id).unwrap();
        let registry = tree.dispatch_as::<ListenerRegistry>().unwrap();
        assert_eq!(registry.count_for(id), 1);
        assert_eq!(registry.persistent_count_for(id), 1);

        tree.remove_persistent_listener(id, "keydown").unwrap();
        assert!(tree.dispatch_as::<ListenerRegistry>().unwrap().is_empty());
    }

    #[test]
    fn destroy_releases_all_listeners_and_schedules_final_render() {
        let mut tree = Tree::new();
        let id = tree.insert(Element::component::<Toggle>()).unwrap();
        let hits = Rc::new(Cell::new(0));
        tree.add_event_listener(id, "click", counting_handler(&hits)).unwrap();
        tree.add_persistent_listener(id, "keydown", counting_handler(&hits)).unwrap();

        tree.destroy(id).unwrap();

        assert!(tree.node(id).unwrap().is_destroyed());
        assert!(tree.dispatch_as::<ListenerRegistry>().unwrap().is_empty());
        assert_eq!(tree.scheduler_as::<FrameQueue>().unwrap().pending(Pass::Render), &[id]);

        // Dispatching after destroy reaches nothing.
        let fired = tree
            .dispatch_as_mut::<ListenerRegistry>()
            .unwrap()
            .fire(&Event::new("keydown"));
        assert_eq!(fired, 0);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn discard_removes_owned_subtree() {
        let mut tree = Tree::new();
        let root = tree
            .insert(Element::primitive(GROUP).with_child(Element::primitive(GROUP).with_child(Element::primitive(RECT))))
            .unwrap();
        let other = tree.insert(Element::primitive(RECT)).unwrap();
        assert_eq!(tree.len(), 4);

        tree.discard(root);
        assert_eq!(tree.len(), 1);
        assert!(tree.contains(other));
    }

    #[test]
    fn reap_unlinks_from_parent() {
        let mut tree = Tree::new();
        let root = tree
            .insert(Element::primitive(GROUP).with_children([Element::primitive(RECT), Element::primitive(RECT)]))
            .unwrap();
        let first = tree.node(root).unwrap().declared_children()[0];
        tree.node_mut(first).unwrap().parent = Some(root);

        assert_eq!(tree.reap(first).unwrap(), None);
        assert!(!tree.contains(first));
        assert_eq!(tree.node(root).unwrap().declared_children().len(), 1);
    }

    #[test]
    fn set_state_requires_a_constructed_component() {
        let mut tree = Tree::new();
        let id = tree.insert(Element::component::<Toggle>()).unwrap();
        // Not rendered yet: no instance.
        assert_eq!(tree.set_state(id, "on", true), Err(ReconcileError::NotInteractive(id)));
    }
}
