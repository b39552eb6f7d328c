//! Keyed multiset matcher for sibling reconciliation.
//!
//! Previous children are bucketed by identity (`key ?? type`). Each bucket has a
//! cursor; a match hands out the entry under the cursor and advances it, so the
//! Nth new child with a given identity always pairs with the Nth old child with
//! that identity. Cursors never rewind. Whatever the cursors did not reach is
//! the drop set.

use std::collections::HashMap;

use super::node::NodeId;
use crate::element::IdentityKey;

#[derive(Debug)]
struct Bucket {
    nodes: Vec<NodeId>,
    cursor: usize,
}

/// FIFO-per-identity matcher over one frame's previous children.
#[derive(Debug, Default)]
pub struct ChildMatcher {
    buckets: HashMap<IdentityKey, Bucket>,
    /// Identities in first-seen order, so the drop set is deterministic.
    order: Vec<IdentityKey>,
    collisions: usize,
}

impl ChildMatcher {
    /// Bucket `previous` children by identity, preserving order within a bucket.
    pub fn new(previous: impl IntoIterator<Item = (IdentityKey, NodeId)>) -> Self {
        let mut matcher = Self::default();
        for (identity, id) in previous {
            match matcher.buckets.get_mut(&identity) {
                Some(bucket) => {
                    if identity.is_explicit() {
                        matcher.collisions += 1;
                        tracing::warn!(?identity, "duplicate explicit key among previous siblings");
                    }
                    bucket.nodes.push(id);
                }
                None => {
                    matcher.order.push(identity.clone());
                    matcher.buckets.insert(identity, Bucket { nodes: vec![id], cursor: 0 });
                }
            }
        }
        matcher
    }

    /// Claim the next unconsumed previous child with `identity`.
    ///
    /// `None` means the new child must be mounted fresh.
    pub fn claim(&mut self, identity: &IdentityKey) -> Option<NodeId> {
        let bucket = self.buckets.get_mut(identity)?;
        let id = bucket.nodes.get(bucket.cursor).copied();
        // Past the end stays past the end; the cursor only moves forward.
        bucket.cursor = (bucket.cursor + 1).min(bucket.nodes.len());
        id
    }

    /// Previous children no new child claimed, bucket by bucket in first-seen order.
    pub fn remainder(&self) -> Vec<NodeId> {
        self.order
            .iter()
            .filter_map(|identity| self.buckets.get(identity))
            .flat_map(|bucket| bucket.nodes[bucket.cursor..].iter().copied())
            .collect()
    }

    /// Number of duplicate explicit keys seen while bucketing.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Whether no previous children were supplied.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
