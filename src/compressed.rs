//! Compressed prefix tree: single-child chains collapsed into one node.
//!
//! Branches exist only where keys actually diverge, so a child's path may
//! extend its parent's by any number of symbols and a stored item is a
//! single leaf carrying its full key, hung directly under the deepest branch
//! it shares with anything else. No branch below the root ever has exactly
//! one child: insertion only creates a branch when splitting two diverging
//! subtrees apart, and removal re-merges a branch left with a sole child
//! back into that child.
//!
//! The contract is identical to [`crate::SimpleTrie`]; only the node count
//! and the split/collapse bookkeeping differ.

use crate::node::{common_len, weighted_mean, Node, Path};
use crate::{Aggregation, Autocompleter};

/// The space-optimized weighted prefix tree.
///
/// Observable behavior matches [`crate::SimpleTrie`] exactly; the tree uses
/// one node per divergence point instead of one per symbol.
///
/// # Example
///
/// ```rust
/// use ranktrie::{Aggregation, Autocompleter, CompressedTrie};
///
/// let mut trie: CompressedTrie<u8, &str> = CompressedTrie::new(Aggregation::Sum);
/// trie.insert("cat", 3.0, b"cat");
/// trie.insert("car", 5.0, b"car");
/// trie.insert("dog", 2.0, b"dog");
///
/// assert_eq!(trie.autocomplete(b"ca", Some(1)), vec![(&"car", 5.0)]);
/// ```
pub struct CompressedTrie<S, V> {
    pub(crate) root: Node<S, V>,
    pub(crate) aggregation: Aggregation,
}

impl<S, V> CompressedTrie<S, V> {
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

impl<S, V> Autocompleter<S, V> for CompressedTrie<S, V>
where
    S: Clone + PartialEq,
    V: PartialEq,
{
    fn len(&self) -> usize {
        self.root.leaf_count
    }

    fn insert(&mut self, value: V, weight: f64, key: &[S]) {
        assert!(weight > 0.0, "insert weight must be positive, got {weight}");
        insert_rec(&mut self.root, self.aggregation, value, weight, key);
    }

    fn autocomplete(&self, key: &[S], limit: Option<usize>) -> Vec<(&V, f64)> {
        if let Some(n) = limit {
            assert!(n > 0, "autocomplete limit must be positive");
        }
        match locate(&self.root, key) {
            Some(node) => node.ranked_matches(limit),
            None => Vec::new(),
        }
    }

    fn remove(&mut self, key: &[S]) {
        if key.is_empty() {
            self.root.clear();
            return;
        }
        remove_rec(&mut self.root, self.aggregation, key);
    }
}

/// How insertion proceeds from a node once duplicates are ruled out.
enum Step {
    /// A branch child's path is a (possibly exact) prefix of the key:
    /// continue inside it with the full key.
    Descend(usize),
    /// A child shares `common` symbols of extension with the key but
    /// diverges: an intermediate branch has to be created.
    Split { idx: usize, common: usize },
}

/// Find the child sharing extension symbols with the remaining key.
///
/// At most one child can share a first extension symbol with the key (splits
/// keep divergent subtrees apart, and duplicate-key leaves are grouped), so
/// the first hit decides. Leaves stored exactly at this node's path have an
/// empty extension and never participate.
fn find_step<S: PartialEq, V>(node: &Node<S, V>, key: &[S]) -> Option<Step> {
    let at = node.path_len();
    let rem = &key[at..];
    for (idx, child) in node.children.iter().enumerate() {
        let ext = &child.path()[at..];
        if ext.is_empty() {
            continue;
        }
        let common = common_len(ext, rem);
        if common == 0 {
            continue;
        }
        if common == ext.len() && !child.is_leaf() {
            // Branch path is a prefix of (or equal to) the key; the terminal
            // case inside the child handles exact equality.
            return Some(Step::Descend(idx));
        }
        return Some(Step::Split { idx, common });
    }
    None
}

/// Recursive insertion. Returns whether a new item was stored.
fn insert_rec<S, V>(
    node: &mut Node<S, V>,
    aggregation: Aggregation,
    value: V,
    weight: f64,
    key: &[S],
) -> bool
where
    S: Clone + PartialEq,
    V: PartialEq,
{
    let is_new = if key.len() == node.path_len() {
        node.insert_leaf(value, weight, key)
    } else if node.bump_duplicate(&value, weight, key) {
        // A leaf for this exact (key, value) pair hangs here even though the
        // key runs past this node's path.
        false
    } else {
        match find_step(node, key) {
            Some(Step::Descend(idx)) => {
                insert_rec(&mut node.children[idx], aggregation, value, weight, key)
            }
            Some(Step::Split { idx, common }) => {
                let at = node.path_len();
                let idx = split_child(node, aggregation, idx, at + common);
                insert_rec(&mut node.children[idx], aggregation, value, weight, key)
            }
            // Nothing shares an extension: a single full-key leaf suffices,
            // no chain of branches needed.
            None => {
                node.children.push(Node::leaf(key, value, weight));
                true
            }
        }
    };

    if is_new {
        node.leaf_count += 1;
    }
    node.reweigh(aggregation, weight);
    node.sort_children();
    is_new
}

/// Split `children[idx]` under a fresh intermediate branch whose path is the
/// first `new_len` symbols of the child's path. Returns the branch's index.
///
/// When the split target is a leaf, every sibling leaf with the identical
/// key moves along with it, so equal keys always stay grouped under one
/// node and later descents only ever have one matching child.
fn split_child<S, V>(
    node: &mut Node<S, V>,
    aggregation: Aggregation,
    idx: usize,
    new_len: usize,
) -> usize
where
    S: Clone + PartialEq,
{
    let moved = node.children.remove(idx);
    let path: Path<S> = moved.path()[..new_len].iter().cloned().collect();
    let mut branch = Node::branch(path);
    let gather_leaves = moved.is_leaf();
    branch.children.push(moved);

    if gather_leaves {
        let key_len = branch.children[0].path_len();
        let mut i = 0;
        while i < node.children.len() {
            let sibling = &node.children[i];
            if sibling.is_leaf()
                && sibling.path_len() == key_len
                && sibling.path() == branch.children[0].path()
            {
                let dup = node.children.remove(i);
                branch.children.push(dup);
            } else {
                i += 1;
            }
        }
    }

    branch.leaf_count = branch.children.iter().map(|c| c.leaf_count).sum();
    branch.weight = match aggregation {
        Aggregation::Sum => branch.children.iter().map(|c| c.weight).sum(),
        Aggregation::Average => weighted_mean(&branch.children, branch.leaf_count),
    };
    branch.sort_children();
    node.children.push(branch);
    node.children.len() - 1
}

/// Descend to the node covering `key`, matching child extensions by longest
/// common extension. Lands on the child itself when its path fully consumes
/// the remaining key.
fn locate<'a, S: PartialEq, V>(node: &'a Node<S, V>, key: &[S]) -> Option<&'a Node<S, V>> {
    let at = node.path_len();
    if key.len() <= at {
        return Some(node);
    }
    let rem = &key[at..];
    for child in &node.children {
        let ext = &child.path()[at..];
        if ext.is_empty() {
            continue;
        }
        let common = common_len(ext, rem);
        if common == rem.len() {
            // The query prefix ends inside this child's path: everything
            // beneath it matches.
            return Some(child);
        }
        if common == ext.len() && !child.is_leaf() {
            return locate(child, key);
        }
        if common > 0 {
            // Shares a first symbol but diverges; no other child can match.
            return None;
        }
    }
    None
}

/// Recursive removal of everything below `key`. Drops fully-matched
/// children, prunes emptied subtrees, and re-merges any branch left with a
/// single child so no compressible node survives the call.
fn remove_rec<S: PartialEq, V>(node: &mut Node<S, V>, aggregation: Aggregation, key: &[S]) {
    let at = node.path_len();
    debug_assert!(key.len() > at);
    let rem_len = key.len() - at;

    let mut removed_weight = 0.0;
    let mut removed_leaves = 0usize;
    let mut i = 0;
    while i < node.children.len() {
        let child = &mut node.children[i];
        let common = common_len(&child.path()[at..], &key[at..]);

        if common == rem_len {
            // The removal key is a prefix of the child's path: the whole
            // subtree (or duplicate-key leaf) goes. Keep scanning, equal
            // keys may occupy several sibling leaves.
            let dropped = node.children.remove(i);
            removed_weight += dropped.weight;
            removed_leaves += dropped.leaf_count;
            continue;
        }

        if common == child.path_len() - at && common > 0 && !child.is_leaf() {
            // Branch strictly shallower than the key: recurse.
            let (old_weight, old_leaves) = (child.weight, child.leaf_count);
            remove_rec(child, aggregation, key);
            removed_weight += old_weight - child.weight;
            removed_leaves += old_leaves - child.leaf_count;

            if child.is_empty() {
                node.children.remove(i);
                continue;
            }
            if child.children.len() == 1 {
                // Collapse the now-compressible branch into its sole child.
                // The child's aggregate equals the branch's under either
                // policy, so sibling order is preserved.
                let only = child.children.pop().expect("length checked");
                *child = only;
            }
        }
        i += 1;
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
