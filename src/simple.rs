//! Uncompressed prefix tree: one tree level per key symbol.
//!
//! Every branch extends its parent's path by exactly one symbol, so a key of
//! length `n` is stored under a chain of `n` branches with the leaf attached
//! to the branch whose path equals the full key. Simple and predictable, at
//! the cost of one node per symbol; [`crate::CompressedTrie`] collapses the
//! single-child chains.

use crate::node::{Node, Path};
use crate::{Aggregation, Autocompleter};

/// The baseline weighted prefix tree.
///
/// `S` is the key symbol type: characters, bytes, words, anything
/// comparable. `V` is the stored item type. Both variants implement
/// [`Autocompleter`] with identical observable behavior.
///
/// # Example
///
/// ```rust
/// use ranktrie::{Aggregation, Autocompleter, SimpleTrie};
///
/// let mut trie: SimpleTrie<u8, &str> = SimpleTrie::new(Aggregation::Sum);
/// trie.insert("cat", 3.0, b"cat");
/// trie.insert("car", 5.0, b"car");
///
/// assert_eq!(trie.autocomplete(b"ca", None), vec![(&"car", 5.0), (&"cat", 3.0)]);
/// ```
pub struct SimpleTrie<S, V> {
    pub(crate) root: Node<S, V>,
    pub(crate) aggregation: Aggregation,
}

impl<S, V> SimpleTrie<S, V> {
    /// Create an empty tree with the given aggregation policy.
    ///
    /// The policy is fixed for the lifetime of the tree.
    pub fn new(aggregation: Aggregation) -> Self {
        Self {
            root: Node::empty_root(),
            aggregation,
        }
    }

    /// The aggregation policy chosen at construction.
    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }
}

impl<S, V> Autocompleter<S, V> for SimpleTrie<S, V>
where
    S: Clone + PartialEq,
    V: PartialEq,
{
    fn len(&self) -> usize {
        self.root.leaf_count
    }

    fn insert(&mut self, value: V, weight: f64, key: &[S]) {
        assert!(weight > 0.0, "insert weight must be positive, got {weight}");
        insert_rec(&mut self.root, self.aggregation, value, weight, key, 0);
    }

    fn autocomplete(&self, key: &[S], limit: Option<usize>) -> Vec<(&V, f64)> {
        if let Some(n) = limit {
            assert!(n > 0, "autocomplete limit must be positive");
        }
        let mut node = &self.root;
        for depth in 0..key.len() {
            match node.children.iter().find(|c| steps_to(c, key, depth)) {
                Some(child) => node = child,
                None => return Vec::new(),
            }
        }
        node.ranked_matches(limit)
    }

    fn remove(&mut self, key: &[S]) {
        if key.is_empty() {
            self.root.clear();
            return;
        }
        remove_rec(&mut self.root, self.aggregation, key, 0);
    }
}

/// Whether `child` is the branch one symbol deeper along `key`.
///
/// Branch paths grow by exactly one symbol per level, so matching the symbol
/// at `depth` identifies the unique candidate; leaves never participate in
/// descent (their key equals their parent's path).
#[inline]
fn steps_to<S: PartialEq, V>(child: &Node<S, V>, key: &[S], depth: usize) -> bool {
    !child.is_leaf() && child.path_len() == depth + 1 && child.path()[depth] == key[depth]
}

/// Recursive insertion. Returns whether a new item was stored (as opposed to
/// bumping the weight of an existing duplicate), which drives the
/// `leaf_count` updates on the way back out.
fn insert_rec<S, V>(
    node: &mut Node<S, V>,
    aggregation: Aggregation,
    value: V,
    weight: f64,
    key: &[S],
    depth: usize,
) -> bool
where
    S: Clone + PartialEq,
    V: PartialEq,
{
    let is_new = if depth == key.len() {
        node.insert_leaf(value, weight, key)
    } else {
        let idx = match node.children.iter().position(|c| steps_to(c, key, depth)) {
            Some(idx) => idx,
            None => {
                // Materialize the next one-symbol extension of this path.
                let path: Path<S> = key[..=depth].iter().cloned().collect();
                node.children.push(Node::branch(path));
                node.children.len() - 1
            }
        };
        insert_rec(
            &mut node.children[idx],
            aggregation,
            value,
            weight,
            key,
            depth + 1,
        )
    };

    if is_new {
        node.leaf_count += 1;
    }
    // Every insert adds exactly `weight` to the subtree total, duplicate or not.
    node.reweigh(aggregation, weight);
    node.sort_children();
    is_new
}

/// Recursive removal of everything below `key`. Prunes the matched child
/// when it becomes empty and fixes up `weight`/`leaf_count` on the way out.
fn remove_rec<S, V>(node: &mut Node<S, V>, aggregation: Aggregation, key: &[S], depth: usize)
where
    S: PartialEq,
{
    let Some(idx) = node.children.iter().position(|c| steps_to(c, key, depth)) else {
        return;
    };

    let removed_weight;
    let removed_leaves;
    if depth + 1 == key.len() {
        // The whole child subtree matches the removal prefix.
        let child = node.children.remove(idx);
        removed_weight = child.weight;
        removed_leaves = child.leaf_count;
    } else {
        let child = &mut node.children[idx];
        let (old_weight, old_leaves) = (child.weight, child.leaf_count);
        remove_rec(child, aggregation, key, depth + 1);
        removed_weight = old_weight - child.weight;
        removed_leaves = old_leaves - child.leaf_count;
        if child.is_empty() {
            node.children.remove(idx);
        }
    }

    if removed_leaves == 0 {
        return;
    }
    node.leaf_count -= removed_leaves;
    node.reweigh(aggregation, -removed_weight);
    // A recursed-into child survives with a lower weight and may have to
    // sink below its siblings.
    node.sort_children();
}
