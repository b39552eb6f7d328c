//! Node types: NodeId, Node, invalidation flags, rendered output.

use slotmap::new_key_type;

use crate::component::{Component, State};
use crate::element::{ElementType, IdentityKey, NodeType, RefHook};
use crate::geometry::{Point, Size};
use crate::props::{Key, Props};
use crate::render::canvas::DrawFn;

new_key_type! {
    /// Unique identifier for a retained node. Copy, lightweight (u64).
    pub struct NodeId;
}

// ---------------------------------------------------------------------------
// Invalidation
// ---------------------------------------------------------------------------

/// The three independent invalidation channels.
///
/// Each is consumed separately: a render pass reads `is_updated` and
/// `props_updated`, a move pass reads `is_moved`. Reading through the `take_*`
/// methods clears the flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Invalidation {
    /// Content or state changed; needs a full re-render.
    pub is_updated: bool,
    /// The parent supplied structurally different props.
    pub props_updated: bool,
    /// Position changed; needs propagation only.
    pub is_moved: bool,
}

impl Invalidation {
    /// Read and clear `props_updated`.
    pub fn take_props_updated(&mut self) -> bool {
        std::mem::take(&mut self.props_updated)
    }

    /// Read and clear `is_moved`.
    pub fn take_moved(&mut self) -> bool {
        std::mem::take(&mut self.is_moved)
    }

    /// Whether a render pass has work at this node.
    pub fn needs_render(&self) -> bool {
        self.is_updated || self.props_updated
    }
}

// ---------------------------------------------------------------------------
// Rendered
// ---------------------------------------------------------------------------

/// The stored result of a node's most recent render.
#[derive(Debug, Clone)]
pub enum Rendered {
    /// Composite output: a single child node.
    Node(NodeId),
    /// Leaf output: a drawing closure.
    Draw(DrawFn),
}

impl Rendered {
    /// The rendered child, if the output is composite.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Rendered::Node(id) => Some(*id),
            Rendered::Draw(_) => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Instance
// ---------------------------------------------------------------------------

/// A live interactive component and its state.
pub(crate) struct Instance {
    pub(crate) component: Box<dyn Component>,
    pub(crate) state: State,
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A retained tree unit.
pub struct Node {
    pub(crate) ty: NodeType,
    pub(crate) key: Option<Key>,
    pub(crate) props: Props,
    /// Declared children (`props.children`), reconciled in place.
    pub(crate) declared: Option<Vec<NodeId>>,
    pub(crate) x: f64,
    pub(crate) y: f64,
    /// Size declared in props; `None` means inherit from the parent.
    pub(crate) declared_size: (Option<f64>, Option<f64>),
    /// Resolved size; unset until declared or first attached.
    pub(crate) w: Option<f64>,
    pub(crate) h: Option<f64>,
    pub(crate) screen: Option<Point>,
    pub(crate) instance: Option<Instance>,
    pub(crate) rendered: Option<Rendered>,
    /// Mounted children, present only when `rendered` is a drawing closure.
    pub(crate) children: Option<Vec<NodeId>>,
    pub(crate) flags: Invalidation,
    pub(crate) parent: Option<NodeId>,
    pub(crate) ref_hook: Option<RefHook>,
    /// Event types this node's component holds persistent listeners for.
    pub(crate) persistent: Vec<String>,
    pub(crate) destroyed: bool,
}

impl Node {
    pub(crate) fn new(ty: NodeType, key: Option<Key>, props: Props, ref_hook: Option<RefHook>) -> Self {
        let mut node = Self {
            ty,
            key,
            props: Props::new(),
            declared: None,
            x: 0.0,
            y: 0.0,
            declared_size: (None, None),
            w: None,
            h: None,
            screen: None,
            instance: None,
            rendered: None,
            children: None,
            flags: Invalidation::default(),
            parent: None,
            ref_hook,
            persistent: Vec::new(),
            destroyed: false,
        };
        node.apply_props(props);
        node
    }

    /// Store props and re-derive local geometry from them.
    pub(crate) fn apply_props(&mut self, props: Props) {
        self.x = props.number("x").unwrap_or(0.0);
        self.y = props.number("y").unwrap_or(0.0);
        let w = props.number("w");
        let h = props.number("h");
        self.declared_size = (w, h);
        if w.is_some() {
            self.w = w;
        }
        if h.is_some() {
            self.h = h;
        }
        self.props = props;
    }

    /// Props as handed to a render: undeclared `w`/`h` filled from the node.
    pub(crate) fn render_props(&self) -> Props {
        let mut props = self.props.clone();
        if !props.contains("w") {
            if let Some(w) = self.w {
                props.insert("w", w);
            }
        }
        if !props.contains("h") {
            if let Some(h) = self.h {
                props.insert("h", h);
            }
        }
        props
    }

    /// Matching identity: explicit key, else type.
    pub fn identity(&self) -> IdentityKey {
        IdentityKey::of(self.key.as_ref(), &self.ty)
    }

    /// The node's type.
    pub fn node_type(&self) -> &NodeType {
        &self.ty
    }

    /// The explicit key, if any.
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Stored props.
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Declared children, as reconciled by the last `receive_props`.
    pub fn declared_children(&self) -> &[NodeId] {
        self.declared.as_deref().unwrap_or(&[])
    }

    /// Mounted children (leaf-output nodes only).
    pub fn children(&self) -> Option<&[NodeId]> {
        self.children.as_deref()
    }

    /// Local offset.
    pub fn local(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Resolved width, unset until declared or inherited.
    pub fn w(&self) -> Option<f64> {
        self.w
    }

    /// Resolved height, unset until declared or inherited.
    pub fn h(&self) -> Option<f64> {
        self.h
    }

    /// Resolved size, if both dimensions are known.
    pub fn size(&self) -> Option<Size> {
        Some(Size::new(self.w?, self.h?))
    }

    /// Absolute position, unset until propagated.
    pub fn screen(&self) -> Option<Point> {
        self.screen
    }

    /// Most recent render output.
    pub fn rendered(&self) -> Option<&Rendered> {
        self.rendered.as_ref()
    }

    /// Current invalidation flags.
    pub fn flags(&self) -> Invalidation {
        self.flags
    }

    /// Non-owning parent link.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Whether the node owns a component instance.
    pub fn has_component(&self) -> bool {
        self.instance.is_some()
    }

    /// Component state, for interactive nodes that have rendered.
    pub fn state(&self) -> Option<&State> {
        self.instance.as_ref().map(|i| &i.state)
    }

    /// Whether `destroy` has been called and the node awaits its final render.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether the node has been mounted (rendered at least once).
    pub fn is_mounted(&self) -> bool {
        self.rendered.is_some()
    }

    /// Mounted descendants reached by the traversals, in draw order.
    pub(crate) fn traversal_children(&self) -> Vec<NodeId> {
        match &self.rendered {
            Some(Rendered::Node(id)) => vec![*id],
            Some(Rendered::Draw(_)) => self.children.clone().unwrap_or_default(),
            None => Vec::new(),
        }
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("ty", &self.ty)
            .field("key", &self.key)
            .field("local", &self.local())
            .field("w", &self.w)
            .field("h", &self.h)
            .field("screen", &self.screen)
            .field("rendered", &self.rendered)
            .field("children", &self.children)
            .field("flags", &self.flags)
            .field("parent", &self.parent)
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

/// Resolve an element type; tags need the registry, so the caller supplies it.
pub(crate) fn resolve_type(
    ty: &ElementType,
    lookup: impl FnOnce(&str) -> Option<NodeType>,
) -> Result<NodeType, String> {
    match ty {
        ElementType::Resolved(ty) => Ok(*ty),
        ElementType::Tag(tag) => lookup(tag).ok_or_else(|| format!("unknown primitive `{tag}`")),
    }
}
