//! # ranktrie
//!
//! A weighted prefix tree index for ranked autocomplete queries.
//!
//! Items are inserted under a key (an ordered sequence of symbols) with a
//! positive weight, and looked up by key prefix in non-increasing weight
//! order. Removal is by prefix too: one call deletes every item whose key
//! starts with the given sequence.
//!
//! ## Architecture
//!
//! Two interchangeable implementations of the [`Autocompleter`] contract:
//!
//! 1. **[`SimpleTrie`]**: the baseline, one tree level per key symbol.
//! 2. **[`CompressedTrie`]**: chains of single-child nodes collapsed into
//!    one node spanning a multi-symbol prefix; fewer nodes, same behavior.
//!
//! Branches carry an aggregate of the leaf weights beneath them, either
//! their [`Aggregation::Sum`] or their [`Aggregation::Average`], and keep
//! their children sorted by weight, so ranked collection is a plain
//! depth-first walk.
//!
//! ## Example
//!
//! ```rust
//! use ranktrie::{Aggregation, Autocompleter, CompressedTrie};
//!
//! let mut trie: CompressedTrie<char, &str> = CompressedTrie::new(Aggregation::Sum);
//! let key: Vec<char> = "toronto".chars().collect();
//! trie.insert("Toronto, ON", 10.0, &key);
//! let key: Vec<char> = "torino".chars().collect();
//! trie.insert("Torino, IT", 7.0, &key);
//!
//! let prefix: Vec<char> = "tor".chars().collect();
//! let matches = trie.autocomplete(&prefix, None);
//! assert_eq!(matches, vec![(&"Toronto, ON", 10.0), (&"Torino, IT", 7.0)]);
//! ```
//!
//! The structure is a single-threaded in-memory index: operations are plain
//! recursive calls with no interior mutability, and a caller needing shared
//! access must wrap the whole tree in a lock.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compressed;
pub mod debug;
pub(crate) mod node;
pub mod simple;

pub use compressed::CompressedTrie;
pub use simple::SimpleTrie;

/// How a branch aggregates the weights of the leaves beneath it.
///
/// Chosen once at construction and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// A branch weighs the total of all leaf weights beneath it.
    Sum,
    /// A branch weighs the leaf-count-weighted mean of the leaf weights
    /// beneath it.
    Average,
}

/// The autocomplete contract implemented by both trie variants.
///
/// `S` is the key symbol type; keys compare by pairwise symbol equality.
/// `V` is the stored item type and only needs equality (used to detect
/// duplicate insertions).
pub trait Autocompleter<S, V> {
    /// Number of distinct items stored. O(1).
    fn len(&self) -> usize;

    /// Whether the structure holds no items.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `value` under `key` with the given weight.
    ///
    /// Re-inserting a value that already exists under the identical key adds
    /// `weight` to its stored weight instead of duplicating it. Distinct
    /// values may share a key; they are ranked independently.
    ///
    /// Inserting an existing value under a *different* key is a caller
    /// error: the call behaves as a fresh insertion and the two copies are
    /// tracked independently from then on.
    ///
    /// # Panics
    ///
    /// Panics if `weight <= 0.0`.
    fn insert(&mut self, value: V, weight: f64, key: &[S]);

    /// Return up to `limit` matches for the given key prefix, ordered by
    /// non-increasing weight (`None` returns every match).
    ///
    /// Which items make the cut under a `limit` is decided by
    /// weight-ordered subtree traversal with early exit, not a global top-K
    /// selection: a subtree with a heavy aggregate is drained before its
    /// siblings even when a sibling holds a heavier individual item. Returns
    /// an empty vec when nothing matches the prefix.
    ///
    /// # Panics
    ///
    /// Panics if `limit == Some(0)`.
    fn autocomplete(&self, key: &[S], limit: Option<usize>) -> Vec<(&V, f64)>;

    /// Remove every item whose key has `key` as a prefix.
    ///
    /// An empty key clears the whole structure; a key matching nothing is a
    /// no-op.
    fn remove(&mut self, key: &[S]);
}


#[cfg(test)]
mod proptests;
