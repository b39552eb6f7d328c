//! Integration tests for cute-tree.
//!
//! These tests exercise the public API from outside the crate: mounting through
//! a screen, driving frames, and checking what survives reconciliation.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use cute_tree::event::{Event, ListenerRegistry};
use cute_tree::geometry::{Point, Region, Size};
use cute_tree::lifecycle::LifecycleEvent;
use cute_tree::screen::{Screen, ScreenConfig};
use cute_tree::testing::fixtures::{Toggle, GROUP, RECT};
use cute_tree::testing::{tree_to_string, CanvasOp, RecordingCanvas};
use cute_tree::{Component, Construct, Element, Invalidate, NodeId, Props, Render, RenderCx, Tree};
use pretty_assertions::assert_eq;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Renders `count` toggles (state, default 2) inside a group, all sharing
/// one key.
struct Panel;

impl Component for Panel {
    fn render(&self, cx: &RenderCx<'_>) -> Render {
        let count = cx.state.number("count").unwrap_or(2.0) as usize;
        let toggles = (0..count).map(|i| {
            Element::component::<Toggle>()
                .with_key("k")
                .at(i as f64 * 20.0, 0.0)
                .sized(10.0, 10.0)
        });
        Element::primitive(GROUP).with_children(toggles).into()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Construct for Panel {
    fn construct(_props: &Props) -> Self {
        Panel
    }
}

/// Drifts right by `speed` units per second while its update hook runs.
struct Drifter {
    x: f64,
    speed: f64,
}

impl Component for Drifter {
    fn render(&self, _cx: &RenderCx<'_>) -> Render {
        Element::primitive(RECT).sized(2.0, 2.0).into()
    }
    fn position(&self) -> Option<Point> {
        Some(Point::new(self.x, 0.0))
    }
    fn update(&mut self, dt: Duration) -> Invalidate {
        self.x += self.speed * dt.as_secs_f64();
        Invalidate::MOVE
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Construct for Drifter {
    fn construct(props: &Props) -> Self {
        Drifter {
            x: props.number("x").unwrap_or(0.0),
            speed: props.number("speed").unwrap_or(0.0),
        }
    }
}

/// Renders a single toggle as its composite output.
struct Wrapper;

impl Component for Wrapper {
    fn render(&self, _cx: &RenderCx<'_>) -> Render {
        Element::component::<Toggle>().sized(10.0, 10.0).into()
    }
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Construct for Wrapper {
    fn construct(_props: &Props) -> Self {
        Wrapper
    }
}

fn screen() -> Screen<RecordingCanvas> {
    Screen::new(ScreenConfig::new().with_size(800.0, 600.0).with_fps(10))
}

fn declared(tree: &Tree, id: NodeId) -> Vec<NodeId> {
    tree.node(id).unwrap().declared_children().to_vec()
}

fn rendered_child(tree: &Tree, id: NodeId) -> NodeId {
    tree.node(id).unwrap().rendered().and_then(|r| r.node()).unwrap()
}

fn toggle_ptr(tree: &Tree, id: NodeId) -> *const Toggle {
    tree.component::<Toggle>(id).unwrap() as *const Toggle
}

// ---------------------------------------------------------------------------
// Reconciliation properties
// ---------------------------------------------------------------------------

#[test]
fn identical_rerender_keeps_component_instances() {
    let mut screen = screen();
    let root = screen.attach(Element::component::<Panel>(), RecordingCanvas::new()).unwrap();
    let tree = screen.tree_mut();
    let group = rendered_child(tree, root);
    let before = declared(tree, group);
    let pointers: Vec<_> = before.iter().map(|&id| toggle_ptr(tree, id)).collect();

    tree.set_state(before[1], "on", true).unwrap();
    tree.schedule_render(root).unwrap();
    screen.frame().unwrap();

    let tree = screen.tree();
    assert_eq!(rendered_child(tree, root), group);
    assert_eq!(declared(tree, group), before);
    let after: Vec<_> = before.iter().map(|&id| toggle_ptr(tree, id)).collect();
    assert_eq!(after, pointers);
    let on = tree.node(before[1]).unwrap().state().and_then(|s| s.get("on")).and_then(|v| v.as_bool());
    assert_eq!(on, Some(true));
}

#[test]
fn second_rerender_without_scheduling_does_no_work() {
    let mut screen = screen();
    let root = screen.attach(Element::component::<Panel>(), RecordingCanvas::new()).unwrap();
    let tree = screen.tree_mut();
    tree.schedule_render(root).unwrap();
    tree.process_frame(Duration::ZERO).unwrap();
    tree.lifecycle_mut().drain();

    tree.rerender(root).unwrap();
    assert!(tree.lifecycle_mut().drain().is_empty());
    assert_eq!(tree.screen_position(root).unwrap(), Point::ORIGIN);
}

#[test]
fn colliding_keys_match_first_come_first_served() {
    let mut screen = screen();
    let root = screen.attach(Element::component::<Panel>(), RecordingCanvas::new()).unwrap();
    let tree = screen.tree_mut();
    let group = rendered_child(tree, root);
    let old = declared(tree, group);
    tree.set_state(old[0], "on", true).unwrap();
    tree.process_frame(Duration::ZERO).unwrap();

    let keyed = || Element::component::<Toggle>().with_key("k").sized(10.0, 10.0);
    tree.receive_props(group, Element::primitive(GROUP).with_children([keyed(), keyed()])).unwrap();

    let new = declared(tree, group);
    assert_eq!(new, old);
    let on = |id| tree.node(id).unwrap().state().and_then(|s| s.get("on")).and_then(|v| v.as_bool());
    assert_eq!((on(new[0]), on(new[1])), (Some(true), Some(false)));
}

#[test]
fn type_change_mounts_fresh_and_releases_old_listeners() {
    let mut screen = screen();
    let root = screen
        .attach(
            Element::primitive(GROUP).with_child(Element::component::<Toggle>().with_key("slot")),
            RecordingCanvas::new(),
        )
        .unwrap();
    let tree = screen.tree_mut();
    let old = declared(tree, root)[0];
    let hits = Rc::new(Cell::new(0));
    let (a, b) = (Rc::clone(&hits), Rc::clone(&hits));
    tree.add_event_listener(old, "click", Box::new(move |_: &Event| a.set(a.get() + 1))).unwrap();
    tree.add_persistent_listener(old, "keydown", Box::new(move |_: &Event| b.set(b.get() + 1))).unwrap();

    tree.receive_props(root, Element::primitive(GROUP).with_child(Element::component::<Panel>().with_key("slot")))
        .unwrap();
    tree.schedule_render(root).unwrap();
    screen.frame().unwrap();

    let tree = screen.tree_mut();
    let new = declared(tree, root)[0];
    assert_ne!(new, old);
    assert!(!tree.contains(old));
    assert!(tree.component::<Panel>(new).is_some());

    let registry = tree.dispatch_as_mut::<ListenerRegistry>().unwrap();
    assert_eq!(registry.count_for(old), 0);
    registry.fire(&Event::new("click"));
    registry.fire(&Event::new("keydown"));
    assert_eq!(hits.get(), 0);
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[test]
fn child_inherits_root_size_and_offsets_from_root() {
    let mut screen = screen();
    let root = screen
        .attach(
            Element::primitive(GROUP).with_child(Element::primitive(RECT).at(10.0, 5.0)),
            RecordingCanvas::new(),
        )
        .unwrap();
    let tree = screen.tree();
    let child = declared(tree, root)[0];

    assert_eq!(tree.node(root).unwrap().size(), Some(Size::new(800.0, 600.0)));
    assert_eq!(tree.node(child).unwrap().size(), Some(Size::new(800.0, 600.0)));
    assert_eq!(tree.screen_position(root).unwrap(), Point::new(0.0, 0.0));
    assert_eq!(tree.screen_position(child).unwrap(), Point::new(10.0, 5.0));
}

#[test]
fn unattached_node_has_no_inherited_size() {
    let mut tree = Tree::new();
    let id = tree.insert(Element::primitive(RECT)).unwrap();
    assert_eq!(tree.node(id).unwrap().w(), None);
    assert_eq!(tree.node(id).unwrap().h(), None);
}

#[test]
fn move_pass_repositions_without_touching_render_output() {
    let mut screen = screen();
    let root = screen
        .attach(
            Element::primitive(GROUP).with_child(Element::component::<Drifter>().with_prop("speed", 50.0)),
            RecordingCanvas::new(),
        )
        .unwrap();
    let tree = screen.tree_mut();
    let drifter = declared(tree, root)[0];
    let rect = rendered_child(tree, drifter);
    tree.schedule_update(drifter).unwrap();

    let stats = screen.frame().unwrap();
    assert_eq!((stats.updated, stats.moved, stats.rendered), (1, 1, 0));

    let tree = screen.tree();
    // 50 units/s at 10 fps.
    assert_eq!(tree.screen_position(drifter).unwrap(), Point::new(5.0, 0.0));
    assert_eq!(tree.screen_position(rect).unwrap(), Point::new(5.0, 0.0));
    assert_eq!(rendered_child(tree, drifter), rect);
    assert_eq!(tree.lifecycle().renders(drifter), 1);
    assert_eq!(screen.canvas().unwrap().rects(), &[Region::new(5.0, 0.0, 2.0, 2.0)]);
}

// ---------------------------------------------------------------------------
// Destroy and detach
// ---------------------------------------------------------------------------

#[test]
fn destroy_releases_listeners_and_stops_drawing() {
    let mut screen = screen();
    let root = screen
        .attach(
            Element::primitive(GROUP).with_children([
                Element::component::<Toggle>().sized(10.0, 10.0),
                Element::primitive(RECT).at(50.0, 0.0).sized(1.0, 1.0),
            ]),
            RecordingCanvas::new(),
        )
        .unwrap();
    let tree = screen.tree_mut();
    let toggle = declared(tree, root)[0];
    let hits = Rc::new(Cell::new(0));
    let (a, b) = (Rc::clone(&hits), Rc::clone(&hits));
    tree.add_event_listener(toggle, "click", Box::new(move |_: &Event| a.set(a.get() + 1))).unwrap();
    tree.add_persistent_listener(toggle, "keydown", Box::new(move |_: &Event| b.set(b.get() + 1))).unwrap();

    tree.destroy(toggle).unwrap();
    assert!(tree.dispatch_as::<ListenerRegistry>().unwrap().is_empty());

    screen.frame().unwrap();
    let tree = screen.tree();
    assert!(!tree.contains(toggle));
    assert!(tree.lifecycle().is_mounted(root));
    let canvas = screen.canvas().unwrap();
    assert_eq!(canvas.rects(), &[Region::new(50.0, 0.0, 1.0, 1.0)]);
    assert!(!canvas.ops().contains(&CanvasOp::Fill("gray".into())));
}

#[test]
fn destroying_composite_output_keeps_the_owner_drawable() {
    let mut screen = screen();
    let root = screen
        .attach(
            Element::primitive(GROUP).with_child(Element::component::<Wrapper>().at(30.0, 0.0)),
            RecordingCanvas::new(),
        )
        .unwrap();
    let wrapper = declared(screen.tree(), root)[0];
    let toggle = rendered_child(screen.tree(), wrapper);

    screen.tree_mut().destroy(toggle).unwrap();
    screen.frame().unwrap();

    let tree = screen.tree();
    assert!(!tree.contains(toggle));
    let replacement = rendered_child(tree, wrapper);
    assert_ne!(replacement, toggle);
    assert!(tree.lifecycle().is_mounted(replacement));
    assert_eq!(screen.canvas().unwrap().rects(), &[Region::new(30.0, 0.0, 10.0, 10.0)]);
}

#[test]
fn detach_unmounts_everything() {
    let mut screen = screen();
    let root = screen.attach(Element::component::<Panel>(), RecordingCanvas::new()).unwrap();
    screen.tree_mut().lifecycle_mut().drain();

    let canvas = screen.detach().unwrap();
    assert!(canvas.ops().is_empty());
    let events = screen.tree_mut().lifecycle_mut().drain();
    assert!(events.contains(&LifecycleEvent::Unmount { node_id: root }));
    assert!(events.iter().all(|e| matches!(e, LifecycleEvent::Unmount { .. })));
    assert_eq!(screen.tree().lifecycle().mounted_count(), 0);
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

#[test]
fn growing_panel_outline() {
    let mut screen = screen();
    let root = screen.attach(Element::component::<Panel>(), RecordingCanvas::new()).unwrap();
    screen.tree_mut().set_state(root, "count", 3).unwrap();
    screen.frame().unwrap();

    insta::assert_snapshot!(tree_to_string(screen.tree(), root), @r"
    Panel @(0, 0) 800x600
      > group @(0, 0) 800x600
        - Toggle #k @(0, 0) 10x10
          > rect @(0, 0) 10x10
        - Toggle #k @(20, 0) 10x10
          > rect @(20, 0) 10x10
        - Toggle #k @(40, 0) 10x10
          > rect @(40, 0) 10x10
    ");
}
