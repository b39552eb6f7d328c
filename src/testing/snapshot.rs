//! Snapshot helpers.
//!
//! Plain-text dumps of a retained tree, suitable for `insta` inline snapshots
//! and for eyeballing reconciliation results in a failing test.

use std::fmt::Write as _;

use crate::dom::node::{NodeId, Rendered};
use crate::dom::Tree;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Render the drawn subtree under `root` as an indented outline.
///
/// One node per line: type name, explicit key, screen position, resolved
/// size, and any raised flags. Composite output is nested under its owner
/// with a `>` marker; leaf children are nested with `-`.
///
/// ```text
/// Board @(0, 0) 800x600
///   > group @(0, 0) 800x600
///     - rect #a @(10, 5) 800x600
/// ```
pub fn tree_to_string(tree: &Tree, root: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, root, 0, "", &mut out);
    // No trailing newline, matching how inline snapshots are written.
    out.truncate(out.trim_end().len());
    out
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn write_node(tree: &Tree, id: NodeId, depth: usize, marker: &str, out: &mut String) {
    let Some(node) = tree.get(id) else {
        let _ = writeln!(out, "{}{marker}<missing>", "  ".repeat(depth));
        return;
    };

    let _ = write!(out, "{}{marker}{}", "  ".repeat(depth), node.node_type().name());
    if let Some(key) = node.key() {
        let _ = write!(out, " #{key}");
    }
    match node.screen() {
        Some(p) => {
            let _ = write!(out, " @({}, {})", p.x, p.y);
        }
        None => out.push_str(" @(?)"),
    }
    if let (Some(w), Some(h)) = (node.w(), node.h()) {
        let _ = write!(out, " {w}x{h}");
    }
    let flags = node.flags();
    let mut raised = Vec::new();
    if flags.is_updated {
        raised.push("updated");
    }
    if flags.props_updated {
        raised.push("props");
    }
    if flags.is_moved {
        raised.push("moved");
    }
    if node.is_destroyed() {
        raised.push("destroyed");
    }
    if !raised.is_empty() {
        let _ = write!(out, " [{}]", raised.join(","));
    }
    out.push('\n');

    match node.rendered() {
        Some(Rendered::Node(child)) => write_node(tree, *child, depth + 1, "> ", out),
        Some(Rendered::Draw(_)) => {
            for &child in node.children().unwrap_or(&[]) {
                write_node(tree, child, depth + 1, "- ", out);
            }
        }
        None => {}
    }
}

// ===========================================================================
// Tests
// ===========================================================================
