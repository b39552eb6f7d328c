//! Reconciliation: render, mount, prop diffing, incremental re-render.
//!
//! A node renders either a single nested element (composite output, retained
//! as one child node) or a drawing closure (leaf output, whose declared
//! children become its mounted children). `recursive_render` mounts a subtree
//! for the first time; `rerender` walks a mounted subtree and does render work
//! only where invalidation flags say so; `receive_props` diffs one node and its
//! declared children against a freshly rendered element, reusing nodes whose
//! identity (`key ?? type`) still matches.

pub mod geometry;

use std::collections::HashSet;
use std::time::Duration;

use crate::component::{Invalidate, Render, RenderCx};
use crate::dom::matcher::ChildMatcher;
use crate::dom::node::{Instance, NodeId, Rendered};
use crate::dom::Tree;
use crate::element::{Element, NodeType};
use crate::error::Result;
use crate::schedule::Pass;

/// Work done by one [`Tree::process_frame`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Update roots processed.
    pub updated: usize,
    /// Render roots processed.
    pub rendered: usize,
    /// Move roots processed.
    pub moved: usize,
    /// Scheduled ids that no longer exist.
    pub stale: usize,
}

impl Tree {
    /// Invoke a node's render function.
    ///
    /// Interactive nodes construct their component on the first call (running
    /// the ref hook, if any) and reuse it afterwards. Primitives are called
    /// with the node's props.
    pub fn render(&mut self, id: NodeId) -> Result<Render> {
        let node = self.node_mut(id)?;
        let props = node.render_props();

        if let Some(instance) = &node.instance {
            let cx = RenderCx { node: id, props: &props, state: &instance.state };
            return Ok(instance.component.render(&cx));
        }

        match node.ty {
            NodeType::Component(ty) => {
                let (mut component, state) = ty.construct(&props);
                if let Some(hook) = node.ref_hook.take() {
                    hook(id, component.as_mut());
                }
                let output = component.render(&RenderCx { node: id, props: &props, state: &state });
                node.instance = Some(Instance { component, state });
                tracing::debug!(?id, ty = ty.name(), "constructed component");
                Ok(output)
            }
            NodeType::Primitive(primitive) => Ok(primitive.render(&props)),
        }
    }

    /// First render of `id` and, depth-first, of everything it produces.
    ///
    /// Composite output is adopted as the node's rendered child; leaf output
    /// mounts the declared children. Every child is positioned before it
    /// renders, so `id` itself must already be positioned.
    pub fn recursive_render(&mut self, id: NodeId) -> Result<()> {
        let output = self.render(id)?;
        self.lifecycle.on_mount(id);

        match output {
            Render::Element(element) => self.mount_output(id, element)?,
            Render::Draw(draw) => {
                let node = self.node_mut(id)?;
                node.rendered = Some(Rendered::Draw(draw));
                let declared = node.declared.clone().unwrap_or_default();
                node.children = Some(declared.clone());
                for child in declared {
                    self.set_parent(child, id)?;
                    self.recursive_render(child)?;
                }
            }
        }
        self.clear_render_flags(id)
    }

    /// Adopt `element` as the rendered child of `id` and mount it.
    fn mount_output(&mut self, id: NodeId, element: Element) -> Result<()> {
        let child = self.adopt(element, Some(id))?;
        let node = self.node_mut(id)?;
        node.rendered = Some(Rendered::Node(child));
        node.children = None;
        self.set_parent(child, id)?;
        self.recursive_render(child)
    }

    /// Diff `element` into the existing node `id` and its declared children.
    ///
    /// Children are matched by identity, first come first served within an
    /// identity; matched children are diffed recursively, unmatched new
    /// children are adopted fresh, and unmatched old children are discarded
    /// with their listeners. A keyed match whose type changed is treated as
    /// new. Returns whether the node or anything below it changed, which is
    /// also recorded in `props_updated`.
    pub fn receive_props(&mut self, id: NodeId, element: Element) -> Result<bool> {
        let Element { key, props, children, .. } = element;
        let previous = self.node(id)?.declared.clone().unwrap_or_default();

        let mut matcher = ChildMatcher::new(previous.iter().filter_map(|&child| {
            let node = self.nodes.get(child).filter(|node| !node.destroyed)?;
            Some((node.identity(), child))
        }));

        let mut reconciled = Vec::with_capacity(children.len());
        let mut child_updated = false;
        for child in children {
            let (ty, identity) = self.identity_of(&child, Some(id))?;
            match matcher.claim(&identity) {
                Some(old) if self.nodes.get(old).is_some_and(|node| node.ty == ty) => {
                    child_updated |= self.receive_props(old, child)?;
                    reconciled.push(old);
                }
                Some(old) => {
                    tracing::debug!(?old, new = ty.name(), "keyed sibling changed type; remounting");
                    self.discard(old);
                    reconciled.push(self.adopt(child, Some(id))?);
                }
                None => reconciled.push(self.adopt(child, Some(id))?),
            }
        }
        for dropped in matcher.remainder() {
            self.discard(dropped);
        }

        let props_eq = self.props_eq;
        let node = self.node_mut(id)?;
        let updated = child_updated
            || previous != reconciled
            || !props_eq(&node.props, &props)
            || node.instance.as_ref().is_some_and(|instance| instance.state.is_updated());

        node.apply_props(props);
        node.key = key;
        node.declared = if reconciled.is_empty() { None } else { Some(reconciled) };
        if updated {
            node.flags.props_updated = true;
            if let Some(instance) = node.instance.as_mut() {
                instance.component.receive_props(&node.props);
            }
        }
        Ok(updated)
    }

    /// Incremental re-render of a mounted subtree.
    ///
    /// Nodes whose flags are clear skip render work and only pass geometry
    /// down. Flagged nodes render again: same-type composite output is diffed
    /// into the existing child, a type change replaces the child subtree, and
    /// leaf output re-mounts its declared children (re-rendering the ones
    /// already mounted).
    pub fn rerender(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.destroyed {
            // A composite that lost its output renders again in this pass so
            // it stays drawable.
            if let Some(parent) = self.reap(id)? {
                self.rerender(parent)?;
            }
            return Ok(());
        }
        if node.rendered.is_none() {
            if node.screen.is_none() {
                // Not attached yet; its parent mounts it.
                return Ok(());
            }
            return self.recursive_render(id);
        }

        let props_updated = node.flags.take_props_updated();
        if !node.flags.is_updated && !props_updated {
            for child in node.traversal_children() {
                self.set_parent(child, id)?;
                self.rerender(child)?;
            }
            return Ok(());
        }

        self.lifecycle.on_render(id);
        match self.render(id)? {
            Render::Draw(draw) => {
                let node = self.node_mut(id)?;
                let previous = node.rendered.replace(Rendered::Draw(draw));
                let declared = node.declared.clone().unwrap_or_default();
                node.children = Some(declared.clone());
                if let Some(old) = previous.as_ref().and_then(Rendered::node) {
                    self.discard(old);
                }
                for child in declared {
                    self.set_parent(child, id)?;
                    if self.node(child)?.is_mounted() {
                        self.rerender(child)?;
                    } else {
                        self.recursive_render(child)?;
                    }
                }
            }
            Render::Element(element) => {
                let previous = self.node(id)?.rendered.as_ref().and_then(Rendered::node);
                let (ty, _) = self.identity_of(&element, Some(id))?;
                match previous {
                    Some(old) if self.nodes.get(old).is_some_and(|node| node.ty == ty && !node.destroyed) => {
                        self.receive_props(old, element)?;
                        self.set_parent(old, id)?;
                        self.rerender(old)?;
                    }
                    _ => {
                        if let Some(old) = previous {
                            tracing::debug!(?id, ?old, new = ty.name(), "rendered type changed; replacing subtree");
                            self.discard(old);
                        }
                        self.mount_output(id, element)?;
                    }
                }
            }
        }
        self.clear_render_flags(id)
    }

    /// A render pass consumed this node's invalidation.
    fn clear_render_flags(&mut self, id: NodeId) -> Result<()> {
        let node = self.node_mut(id)?;
        node.flags.is_updated = false;
        node.flags.props_updated = false;
        if let Some(instance) = node.instance.as_mut() {
            instance.state.clear_updated();
        }
        Ok(())
    }

    /// Call the per-frame update hook of every component under `id`, turning
    /// the requested invalidation into scheduled work.
    pub fn recursive_update(&mut self, id: NodeId, dt: Duration) -> Result<()> {
        self.update_subtree(id, dt, &mut HashSet::new())
    }

    /// Update walk that skips nodes already in `visited`, so nested update
    /// roots in one frame call each hook once.
    fn update_subtree(&mut self, id: NodeId, dt: Duration, visited: &mut HashSet<NodeId>) -> Result<()> {
        if !visited.insert(id) {
            return Ok(());
        }
        let node = self.node_mut(id)?;
        if node.destroyed {
            return Ok(());
        }
        let requested = node
            .instance
            .as_mut()
            .map(|instance| instance.component.update(dt))
            .unwrap_or_default();
        let children = node.traversal_children();

        if requested.contains(Invalidate::RENDER) {
            self.schedule_render(id)?;
        }
        if requested.contains(Invalidate::MOVE) {
            self.schedule_move(id)?;
        }
        if requested.contains(Invalidate::UPDATE) {
            self.schedule_update(id)?;
        }
        for child in children {
            self.update_subtree(child, dt, visited)?;
        }
        Ok(())
    }

    /// Drain the scheduler: update pass, then render pass, then move pass.
    ///
    /// Work scheduled while a pass runs lands in the scheduler for a later
    /// pass (renders requested by updates run this frame) or the next frame.
    pub fn process_frame(&mut self, dt: Duration) -> Result<FrameStats> {
        let mut stats = FrameStats::default();

        let mut visited = HashSet::new();
        for id in self.scheduler.take(Pass::Update) {
            if self.live(id, Pass::Update, &mut stats) {
                self.update_subtree(id, dt, &mut visited)?;
                stats.updated += 1;
            }
        }
        for id in self.scheduler.take(Pass::Render) {
            if self.live(id, Pass::Render, &mut stats) {
                self.rerender(id)?;
                stats.rendered += 1;
            }
        }
        for id in self.scheduler.take(Pass::Move) {
            if self.live(id, Pass::Move, &mut stats) {
                self.recursive_move(id)?;
                stats.moved += 1;
            }
        }

        tracing::debug!(?dt, ?stats, "frame processed");
        Ok(stats)
    }

    fn live(&self, id: NodeId, pass: Pass, stats: &mut FrameStats) -> bool {
        if self.contains(id) {
            return true;
        }
        tracing::warn!(?id, ?pass, "scheduled node no longer exists");
        stats.stale += 1;
        false
    }
}

// ===========================================================================
// Tests
// ===========================================================================
