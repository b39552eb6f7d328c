//! Element descriptors: what a render declares.
//!
//! An [`Element`] is an owned, not-yet-retained description of a node: a type,
//! an optional identity key, props and nested children. The tree adopts
//! elements into nodes during reconciliation. Types are either interactive
//! components ([`ComponentType`]) or pure primitive functions ([`Primitive`]);
//! the distinction is an explicit enum discriminant, never a runtime reflection.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::component::{Component, Construct, Render, State};
use crate::dom::node::NodeId;
use crate::props::{Key, PropValue, Props, CHILDREN, KEY, REF};

// ---------------------------------------------------------------------------
// ComponentType
// ---------------------------------------------------------------------------

type Constructor = fn(&Props) -> (Box<dyn Component>, State);

fn construct_boxed<C: Construct>(props: &Props) -> (Box<dyn Component>, State) {
    let state = State::new(C::initial_state(props));
    (Box::new(C::construct(props)), state)
}

/// An interactive component type. Equal iff it names the same Rust type.
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
    construct: Constructor,
}

impl ComponentType {
    /// The component type for `C`.
    pub fn of<C: Construct>() -> Self {
        let full = type_name::<C>();
        Self {
            id: TypeId::of::<C>(),
            name: full.rsplit("::").next().unwrap_or(full),
            construct: construct_boxed::<C>,
        }
    }

    /// Short type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn construct(&self, props: &Props) -> (Box<dyn Component>, State) {
        (self.construct)(props)
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.name)
    }
}

// ---------------------------------------------------------------------------
// Primitive
// ---------------------------------------------------------------------------

/// A stateless render function, identified by name.
#[derive(Clone, Copy)]
pub struct Primitive {
    name: &'static str,
    render: fn(&Props) -> Render,
}

impl Primitive {
    /// Declare a primitive.
    pub const fn new(name: &'static str, render: fn(&Props) -> Render) -> Self {
        Self { name, render }
    }

    /// The primitive's name (its identity).
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn render(&self, props: &Props) -> Render {
        (self.render)(props)
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Primitive {}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Primitive({})", self.name)
    }
}

/// Tag-name lookup for primitives declared by string (`Element::tag("rect")`).
#[derive(Debug, Default, Clone)]
pub struct PrimitiveRegistry {
    by_name: HashMap<&'static str, Primitive>,
}

impl PrimitiveRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a primitive under its own name, replacing any previous one.
    pub fn register(&mut self, primitive: Primitive) {
        self.by_name.insert(primitive.name, primitive);
    }

    /// Look a primitive up by tag.
    pub fn lookup(&self, tag: &str) -> Option<Primitive> {
        self.by_name.get(tag).copied()
    }

    /// Number of registered primitives.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether no primitives are registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

// ---------------------------------------------------------------------------
// NodeType / identity
// ---------------------------------------------------------------------------

/// The resolved type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Constructible with state.
    Component(ComponentType),
    /// Pure function.
    Primitive(Primitive),
}

impl NodeType {
    /// Diagnostic name.
    pub fn name(&self) -> &'static str {
        match self {
            NodeType::Component(c) => c.name(),
            NodeType::Primitive(p) => p.name(),
        }
    }

    /// Whether nodes of this type own a component instance.
    pub fn is_interactive(&self) -> bool {
        matches!(self, NodeType::Component(_))
    }

    /// Hashable identity of the type.
    pub fn type_key(&self) -> TypeKey {
        match self {
            NodeType::Component(c) => TypeKey::Component(c.id),
            NodeType::Primitive(p) => TypeKey::Primitive(p.name),
        }
    }
}

/// Hashable form of a [`NodeType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKey {
    Component(TypeId),
    Primitive(&'static str),
}

/// Identity used to match siblings across frames: explicit key, else type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityKey {
    Explicit(Key),
    Type(TypeKey),
}

impl IdentityKey {
    /// `key ?? type`.
    pub fn of(key: Option<&Key>, ty: &NodeType) -> Self {
        match key {
            Some(k) => IdentityKey::Explicit(k.clone()),
            None => IdentityKey::Type(ty.type_key()),
        }
    }

    /// Whether this identity came from an explicit key.
    pub fn is_explicit(&self) -> bool {
        matches!(self, IdentityKey::Explicit(_))
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// The declared type of an element, possibly an unresolved tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementType {
    Resolved(NodeType),
    Tag(String),
}

impl From<NodeType> for ElementType {
    fn from(ty: NodeType) -> Self {
        ElementType::Resolved(ty)
    }
}

impl From<Primitive> for ElementType {
    fn from(p: Primitive) -> Self {
        ElementType::Resolved(NodeType::Primitive(p))
    }
}

impl From<ComponentType> for ElementType {
    fn from(c: ComponentType) -> Self {
        ElementType::Resolved(NodeType::Component(c))
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::Tag(tag.to_owned())
    }
}

/// Back-reference hook, called once with the freshly constructed component.
pub type RefHook = Box<dyn FnOnce(NodeId, &mut dyn Component)>;

/// A declarative node description.
pub struct Element {
    pub(crate) ty: ElementType,
    pub(crate) key: Option<Key>,
    pub(crate) props: Props,
    pub(crate) children: Vec<Element>,
    pub(crate) ref_hook: Option<RefHook>,
}

impl Element {
    /// An element of any type, with empty props.
    pub fn new(ty: impl Into<ElementType>) -> Self {
        Self {
            ty: ty.into(),
            key: None,
            props: Props::new(),
            children: Vec::new(),
            ref_hook: None,
        }
    }

    /// An interactive component element.
    pub fn component<C: Construct>() -> Self {
        Self::new(ComponentType::of::<C>())
    }

    /// A primitive element.
    pub fn primitive(primitive: Primitive) -> Self {
        Self::new(primitive)
    }

    /// A primitive named by tag, resolved when the tree adopts it.
    pub fn tag(tag: &str) -> Self {
        Self::new(tag)
    }

    /// Set the explicit identity key (builder).
    pub fn with_key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set a single prop (builder).
    pub fn with_prop(mut self, name: &str, value: impl Into<PropValue>) -> Self {
        self.props.insert(name, value);
        self
    }

    /// Merge a props map (builder).
    pub fn with_props(mut self, props: Props) -> Self {
        for (k, v) in props.iter() {
            self.props.insert(k, v.clone());
        }
        self
    }

    /// Set the local offset (builder).
    pub fn at(self, x: f64, y: f64) -> Self {
        self.with_prop("x", x).with_prop("y", y)
    }

    /// Declare an explicit size (builder).
    pub fn sized(self, w: f64, h: f64) -> Self {
        self.with_prop("w", w).with_prop("h", h)
    }

    /// Append a child (builder).
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children (builder).
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attach a back-reference hook (builder).
    pub fn with_ref(mut self, hook: impl FnOnce(NodeId, &mut dyn Component) + 'static) -> Self {
        self.ref_hook = Some(Box::new(hook));
        self
    }

    /// The explicit key, if any.
    pub fn key(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Declared props (without reserved entries).
    pub fn props(&self) -> &Props {
        &self.props
    }

    /// Declared children.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Declared type.
    pub fn element_type(&self) -> &ElementType {
        &self.ty
    }
}

/// Build an element from a type, a props map and children.
///
/// Reserved entries are stripped from `props`: `key` becomes the identity
/// override, `ref` and `children` are dropped (use [`Element::with_ref`] and the
/// `children` argument).
pub fn create_element(
    ty: impl Into<ElementType>,
    mut props: Props,
    children: Vec<Element>,
) -> Element {
    let key = props.remove(KEY).as_ref().and_then(Key::from_value);
    props.remove(REF);
    props.remove(CHILDREN);
    Element {
        ty: ty.into(),
        key,
        props,
        children,
        ref_hook: None,
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("ty", &self.ty)
            .field("key", &self.key)
            .field("props", &self.props)
            .field("children", &self.children)
            .field("ref_hook", &self.ref_hook.is_some())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::RenderCx;
    use crate::render::canvas::DrawFn;
    use std::any::Any;

    fn rect(_props: &Props) -> Render {
        Render::Draw(DrawFn::empty())
    }

    fn circle(_props: &Props) -> Render {
        Render::Draw(DrawFn::empty())
    }

    const RECT: Primitive = Primitive::new("rect", rect);
    const CIRCLE: Primitive = Primitive::new("circle", circle);

    struct Dot;

    impl Component for Dot {
        fn render(&self, _cx: &RenderCx<'_>) -> Render {
            Element::primitive(RECT).into()
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl Construct for Dot {
        fn construct(_props: &Props) -> Self {
            Dot
        }
    }

    #[test]
    fn component_type_identity() {
        let a = ComponentType::of::<Dot>();
        let b = ComponentType::of::<Dot>();
        assert_eq!(a, b);
        assert_eq!(a.name(), "Dot");
        assert!(NodeType::Component(a).is_interactive());
    }

    #[test]
    fn primitive_identity_is_name() {
        assert_eq!(RECT, Primitive::new("rect", circle));
        assert_ne!(RECT, CIRCLE);
        assert!(!NodeType::Primitive(RECT).is_interactive());
    }

    #[test]
    fn identity_prefers_explicit_key() {
        let ty = NodeType::Primitive(RECT);
        let keyed = IdentityKey::of(Some(&Key::from("a")), &ty);
        let typed = IdentityKey::of(None, &ty);
        assert!(keyed.is_explicit());
        assert_eq!(typed, IdentityKey::Type(TypeKey::Primitive("rect")));
        assert_ne!(keyed, typed);
    }

    #[test]
    fn registry_lookup() {
        let mut reg = PrimitiveRegistry::new();
        assert!(reg.is_empty());
        reg.register(RECT);
        reg.register(CIRCLE);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.lookup("rect"), Some(RECT));
        assert_eq!(reg.lookup("path"), None);
    }

    #[test]
    fn builder_sets_reserved_geometry() {
        let el = Element::primitive(RECT).at(10.0, 5.0).sized(4.0, 2.0).with_key("r1");
        assert_eq!(el.props().number("x"), Some(10.0));
        assert_eq!(el.props().number("h"), Some(2.0));
        assert_eq!(el.key(), Some(&Key::from("r1")));
    }

    #[test]
    fn create_element_strips_reserved_props() {
        let props = Props::new()
            .with(KEY, 7)
            .with(REF, "ignored")
            .with(CHILDREN, "ignored")
            .with("r", 3);
        let el = create_element("arc", props, vec![Element::tag("fill")]);
        assert_eq!(el.key(), Some(&Key::from(7usize)));
        assert_eq!(el.props(), &Props::new().with("r", 3));
        assert_eq!(el.children().len(), 1);
        assert_eq!(el.element_type(), &ElementType::Tag("arc".into()));
    }

    #[test]
    fn with_ref_is_recorded() {
        let el = Element::component::<Dot>().with_ref(|_, _| {});
        assert!(el.ref_hook.is_some());
        assert!(format!("{el:?}").contains("ref_hook: true"));
    }
}
