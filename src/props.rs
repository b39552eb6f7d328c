//! Declared properties: values, the props map, identity keys, structural equality.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::event::Event;

/// Reserved prop carrying the declared child list. Never stored in [`Props`].
pub const CHILDREN: &str = "children";
/// Reserved prop for component state. Skipped by structural comparison.
pub const STATE: &str = "state";
/// Reserved prop overriding the identity key. Stripped at construction.
pub const KEY: &str = "key";
/// Reserved prop naming the back-reference hook. Stripped at construction.
pub const REF: &str = "ref";

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// An explicit identity override for sibling matching.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

/// 2^63: the first magnitude an `f64` cannot convert into an `i64` exactly.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl Key {
    /// Create a key from anything string-like.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive a key from a prop value. Only text and numbers make keys.
    pub fn from_value(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Text(s) => Some(Self(s.clone())),
            // Whole numbers inside i64 range match integer keys; anything
            // wider keeps its full decimal form so distinct keys stay distinct.
            PropValue::Number(n) if n.fract() == 0.0 && n.abs() < I64_BOUND => Some(Self(format!("{}", *n as i64))),
            PropValue::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<usize> for Key {
    fn from(n: usize) -> Self {
        Self(n.to_string())
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

// ---------------------------------------------------------------------------
// Callback
// ---------------------------------------------------------------------------

/// A handler passed down as a prop (e.g. `on_destroy`).
///
/// Compared by reference: two callbacks are equal only if they share the same
/// allocation, so a parent re-creating its closure every render counts as a change.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&Event)>);

impl Callback {
    /// Wrap a closure.
    pub fn new(f: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

// ---------------------------------------------------------------------------
// PropValue
// ---------------------------------------------------------------------------

/// A single declared value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<PropValue>),
    Map(BTreeMap<String, PropValue>),
    Callback(Callback),
}

impl PropValue {
    /// The value as a number, if it is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The value as text, if it is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The value as a bool, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as a callback, if it is one.
    pub fn as_callback(&self) -> Option<&Callback> {
        match self {
            PropValue::Callback(c) => Some(c),
            _ => None,
        }
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        PropValue::Number(n)
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Number(f64::from(n))
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::Text(s.to_owned())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::Text(s)
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(v: Vec<PropValue>) -> Self {
        PropValue::List(v)
    }
}

impl From<Callback> for PropValue {
    fn from(c: Callback) -> Self {
        PropValue::Callback(c)
    }
}

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// An ordered map of declared properties.
///
/// Children are not stored here; the tree keeps them as node ids alongside.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props(BTreeMap<String, PropValue>);

impl Props {
    /// Create an empty props map.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert a value (builder).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Option<PropValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a value.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.0.remove(key)
    }

    /// Look up a value.
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    /// Whether a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Numeric lookup; `None` if absent or not a number.
    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(PropValue::as_number)
    }

    /// Text lookup; `None` if absent or not text.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(PropValue::as_text)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// Structural equality
// ---------------------------------------------------------------------------

/// Pluggable props comparison used by `receive_props`.
pub type PropsEq = fn(&Props, &Props) -> bool;

/// Deep value equality over everything except `children` and `state`.
pub fn structural_eq(a: &Props, b: &Props) -> bool {
    let relevant = |(k, _): &(&str, &PropValue)| *k != CHILDREN && *k != STATE;
    let mut left = a.iter().filter(relevant);
    let mut right = b.iter().filter(relevant);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(l), Some(r)) if l == r => continue,
            _ => return false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_from_value() {
        assert_eq!(Key::from_value(&"a".into()), Some(Key::from("a")));
        assert_eq!(Key::from_value(&PropValue::Number(3.0)), Some(Key::from(3usize)));
        assert_eq!(Key::from_value(&PropValue::Number(1.5)).unwrap().as_str(), "1.5");
        assert_eq!(Key::from_value(&PropValue::Bool(true)), None);
    }

    #[test]
    fn large_numeric_keys_stay_distinct() {
        let a = Key::from_value(&PropValue::Number(1e20)).unwrap();
        let b = Key::from_value(&PropValue::Number(2e20)).unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "100000000000000000000");
        assert_eq!(Key::from_value(&PropValue::Number(-5.0)), Some(Key::from(-5i64)));
    }

    #[test]
    fn props_builder_and_lookups() {
        let props = Props::new().with("x", 10).with("label", "ok").with("on", true);
        assert_eq!(props.number("x"), Some(10.0));
        assert_eq!(props.text("label"), Some("ok"));
        assert_eq!(props.get("on").and_then(PropValue::as_bool), Some(true));
        assert_eq!(props.number("label"), None);
        assert_eq!(props.len(), 3);
    }

    #[test]
    fn structural_eq_deep_values() {
        let a = Props::new().with("pts", vec![PropValue::from(1), PropValue::from(2)]);
        let b = Props::new().with("pts", vec![PropValue::from(1), PropValue::from(2)]);
        let c = Props::new().with("pts", vec![PropValue::from(1), PropValue::from(3)]);
        assert!(structural_eq(&a, &b));
        assert!(!structural_eq(&a, &c));
    }

    #[test]
    fn structural_eq_detects_added_and_removed_keys() {
        let a = Props::new().with("x", 1);
        let b = Props::new().with("x", 1).with("y", 2);
        assert!(!structural_eq(&a, &b));
        assert!(!structural_eq(&b, &a));
    }

    #[test]
    fn structural_eq_ignores_state_and_children() {
        let a = Props::new().with("x", 1).with(STATE, 5);
        let b = Props::new().with("x", 1).with(CHILDREN, "ignored");
        assert!(structural_eq(&a, &b));
    }

    #[test]
    fn callbacks_compare_by_reference() {
        let cb = Callback::new(|_| {});
        let same = cb.clone();
        let other = Callback::new(|_| {});
        assert_eq!(cb, same);
        assert_ne!(cb, other);
    }
}
