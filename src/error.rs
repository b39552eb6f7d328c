//! Reconciliation errors.

use crate::dom::node::NodeId;

/// Errors surfaced by the reconciliation, propagation and draw passes.
///
/// Internal bookkeeping (flag resets, matcher cursors) never produces an error;
/// only conditions the caller must react to are reported here.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReconcileError {
    /// The id does not refer to a live node (never allocated, or already reaped).
    #[error("node {0:?} does not exist")]
    UnknownNode(NodeId),

    /// A render produced a descriptor that cannot become a node.
    #[error("render of `{parent}` produced an unresolvable element: {detail}")]
    Shape {
        /// Type name of the node whose render produced the descriptor.
        parent: String,
        /// What could not be resolved.
        detail: String,
    },

    /// Geometry was needed before any propagation pass resolved it.
    #[error("node {0:?} has no resolved screen position")]
    MissingGeometry(NodeId),

    /// The node was asked to draw before it was ever rendered.
    #[error("node {0:?} has not been rendered")]
    NotRendered(NodeId),

    /// A listener or state operation targeted a primitive node.
    #[error("node {0:?} is not an interactive component")]
    NotInteractive(NodeId),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    #[test]
    fn display_messages() {
        let mut sm: SlotMap<NodeId, ()> = SlotMap::with_key();
        let id = sm.insert(());

        let err = ReconcileError::Shape {
            parent: "Board".into(),
            detail: "unknown primitive `blob`".into(),
        };
        assert_eq!(
            err.to_string(),
            "render of `Board` produced an unresolvable element: unknown primitive `blob`"
        );
        assert!(ReconcileError::MissingGeometry(id)
            .to_string()
            .contains("no resolved screen position"));
        assert!(ReconcileError::NotInteractive(id)
            .to_string()
            .ends_with("is not an interactive component"));
    }
}
