//! The shared tree node used by both trie variants.
//!
//! A node is either the root/branch (carrying the full symbol path from the
//! root) or a leaf (carrying a stored value together with its full key).
//! Branches keep their children sorted by non-increasing weight at all times,
//! which is what makes the ranked collection in [`Node::ranked_matches`] a
//! plain in-order walk.

use smallvec::SmallVec;

use crate::Aggregation;

/// Inline-optimized symbol sequence for node paths and leaf keys.
pub(crate) type Path<S> = SmallVec<[S; 4]>;

/// What a node stores besides its weight and counts.
pub(crate) enum Kind<S, V> {
    /// Root or branch: the symbol path from the root shared by every item
    /// beneath. Empty only at the root.
    Branch(Path<S>),
    /// Stored item: its full key and the value itself.
    Leaf { key: Path<S>, value: V },
}

/// One node of a weighted prefix tree.
///
/// Invariants (outside of a mutating call):
/// - `weight >= 0.0`, and `weight == 0.0` only for an empty root
/// - a leaf has no children and `leaf_count == 1`
/// - a branch has `leaf_count == sum(child.leaf_count)`
/// - `children` is sorted by non-increasing weight; ties keep their existing
///   relative order (stable sort), so tie order is deterministic for a given
///   mutation sequence
/// - no child subtree is empty
pub(crate) struct Node<S, V> {
    pub(crate) weight: f64,
    pub(crate) leaf_count: usize,
    pub(crate) children: Vec<Node<S, V>>,
    pub(crate) kind: Kind<S, V>,
}

impl<S, V> Node<S, V> {
    /// An empty root.
    pub(crate) fn empty_root() -> Self {
        Self::branch(Path::new())
    }

    /// A fresh branch with the given root path and no children yet.
    ///
    /// Callers must attach at least one child and fix up `weight` and
    /// `leaf_count` before the enclosing public call returns.
    pub(crate) fn branch(path: Path<S>) -> Self {
        Node {
            weight: 0.0,
            leaf_count: 0,
            children: Vec::new(),
            kind: Kind::Branch(path),
        }
    }

    /// A leaf holding `value` under `key` with its own weight.
    pub(crate) fn leaf(key: &[S], value: V, weight: f64) -> Self
    where
        S: Clone,
    {
        Node {
            weight,
            leaf_count: 1,
            children: Vec::new(),
            kind: Kind::Leaf {
                key: key.iter().cloned().collect(),
                value,
            },
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, Kind::Leaf { .. })
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.leaf_count == 0
    }

    /// The node's position in the tree: a branch's root path, or a leaf's
    /// full key. Children of a branch always extend the branch's path.
    #[inline]
    pub(crate) fn path(&self) -> &[S] {
        match &self.kind {
            Kind::Branch(path) => path,
            Kind::Leaf { key, .. } => key,
        }
    }

    #[inline]
    pub(crate) fn path_len(&self) -> usize {
        self.path().len()
    }

    /// Reset to the empty state. Used when a removal wipes out everything
    /// beneath this node; non-root nodes are pruned by their parent instead.
    pub(crate) fn clear(&mut self) {
        self.weight = 0.0;
        self.leaf_count = 0;
        self.children.clear();
        if let Kind::Branch(path) = &mut self.kind {
            path.clear();
        }
    }

    /// Re-establish this node's aggregate weight after a mutation below it.
    ///
    /// `Sum` is a linear update, so the caller passes the signed delta.
    /// `Average` is non-linear in the leaf counts and is always recomputed
    /// from the children. A node whose last item was removed snaps back to
    /// exactly `0.0` so the empty-tree invariant holds without float residue.
    ///
    /// `leaf_count` must already be up to date when this is called.
    pub(crate) fn reweigh(&mut self, aggregation: Aggregation, delta: f64) {
        if self.leaf_count == 0 {
            self.weight = 0.0;
            return;
        }
        self.weight = match aggregation {
            Aggregation::Sum => self.weight + delta,
            Aggregation::Average => weighted_mean(&self.children, self.leaf_count),
        };
    }

    /// Stable sort by non-increasing weight. Equal weights keep their
    /// current relative order.
    pub(crate) fn sort_children(&mut self) {
        self.children.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    }

    /// Add `weight` onto an existing leaf for the same `(key, value)` pair,
    /// if one is present among the children. Returns whether a bump happened.
    pub(crate) fn bump_duplicate(&mut self, value: &V, weight: f64, key: &[S]) -> bool
    where
        S: PartialEq,
        V: PartialEq,
    {
        for child in &mut self.children {
            if let Kind::Leaf { key: k, value: v } = &child.kind {
                if v == value && k.as_slice() == key {
                    child.weight += weight;
                    return true;
                }
            }
        }
        false
    }

    /// Terminal insertion step: this node's path equals `key`. Bumps the
    /// existing leaf for a duplicate `(key, value)` pair, otherwise attaches
    /// a fresh leaf. Returns whether a new item was stored.
    ///
    /// The caller still owns the `leaf_count`/weight/sort fix-up for this
    /// node and its ancestors.
    pub(crate) fn insert_leaf(&mut self, value: V, weight: f64, key: &[S]) -> bool
    where
        S: Clone + PartialEq,
        V: PartialEq,
    {
        if self.bump_duplicate(&value, weight, key) {
            return false;
        }
        self.children.push(Node::leaf(key, value, weight));
        true
    }

    /// Depth-first collection over the already-weight-sorted children.
    ///
    /// Emits every leaf in subtree traversal order and stops descending into
    /// further siblings once `remaining` hits zero. Which items make the cut
    /// under a limit therefore depends on traversal order, not on a global
    /// top-K selection; the final re-sort in [`Node::ranked_matches`] only
    /// fixes the output order.
    fn collect_into<'a>(&'a self, out: &mut Vec<(&'a V, f64)>, remaining: &mut Option<usize>) {
        match &self.kind {
            Kind::Leaf { value, .. } => {
                out.push((value, self.weight));
                if let Some(r) = remaining {
                    *r -= 1;
                }
            }
            Kind::Branch(_) => {
                for child in &self.children {
                    if *remaining == Some(0) {
                        return;
                    }
                    child.collect_into(out, remaining);
                }
            }
        }
    }

    /// Collect up to `limit` matches beneath this node, sorted by
    /// non-increasing weight.
    pub(crate) fn ranked_matches(&self, limit: Option<usize>) -> Vec<(&V, f64)> {
        let mut out = Vec::new();
        let mut remaining = limit;
        self.collect_into(&mut out, &mut remaining);
        out.sort_by(|a, b| b.1.total_cmp(&a.1));
        out
    }
}

/// Aggregate weight of a branch under the `Average` policy: the
/// leaf-count-weighted mean of the leaf weights beneath, derived from the
/// children as `sum(child.weight * child.leaf_count) / leaf_count`.
///
/// A leaf contributes its own weight (`leaf_count == 1`); a branch child
/// contributes its mean scaled back up by how many leaves it covers.
pub(crate) fn weighted_mean<S, V>(children: &[Node<S, V>], leaf_count: usize) -> f64 {
    debug_assert!(leaf_count > 0);
    let total: f64 = children
        .iter()
        .map(|c| {
            if c.is_leaf() {
                c.weight
            } else {
                c.weight * c.leaf_count as f64
            }
        })
        .sum();
    total / leaf_count as f64
}

/// Length of the longest common prefix of two symbol slices.
pub(crate) fn common_len<S: PartialEq>(a: &[S], b: &[S]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}
