//! Debug utilities: indented tree dumps and full-tree integrity checks.
//!
//! `verify_integrity` walks the whole structure and reports every violated
//! representation invariant as a human-readable issue string. The property
//! tests run it after entire operation sequences; it is also handy when
//! troubleshooting a failing scenario by hand together with `debug_dump`.

use std::fmt::Debug;
use std::fmt::Write;

use crate::node::{Kind, Node};
use crate::{Aggregation, CompressedTrie, SimpleTrie};

/// Absolute tolerance for aggregate weight checks. `Average` divides, so
/// exact equality is too strict there.
const WEIGHT_EPS: f64 = 1e-6;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Growth {
    /// Branch paths grow by exactly one symbol per level.
    OneSymbol,
    /// Branch paths grow by one or more symbols; no single-child branches
    /// below the root.
    Compressed,
}

impl<S: Debug, V: Debug> SimpleTrie<S, V> {
    /// Render the tree as an indented listing, one node per line.
    pub fn debug_dump(&self) -> String {
        dump(&self.root)
    }
}

impl<S: Debug + PartialEq, V> SimpleTrie<S, V> {
    /// Walk the whole tree and report every violated invariant.
    ///
    /// Returns an empty vec for a healthy tree.
    pub fn verify_integrity(&self) -> Vec<String> {
        verify(&self.root, self.aggregation, Growth::OneSymbol)
    }
}

impl<S: Debug, V: Debug> CompressedTrie<S, V> {
    /// Render the tree as an indented listing, one node per line.
    pub fn debug_dump(&self) -> String {
        dump(&self.root)
    }
}

impl<S: Debug + PartialEq, V> CompressedTrie<S, V> {
    /// Walk the whole tree and report every violated invariant.
    ///
    /// Returns an empty vec for a healthy tree.
    pub fn verify_integrity(&self) -> Vec<String> {
        verify(&self.root, self.aggregation, Growth::Compressed)
    }
}

fn dump<S: Debug, V: Debug>(root: &Node<S, V>) -> String {
    let mut out = String::new();
    dump_node(root, 0, &mut out);
    out
}

fn dump_node<S: Debug, V: Debug>(node: &Node<S, V>, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    match &node.kind {
        Kind::Branch(path) => {
            let _ = writeln!(out, "{:?} ({}) [{}]", path, node.weight, node.leaf_count);
        }
        Kind::Leaf { key, value } => {
            let _ = writeln!(out, "{:?} = {:?} ({})", key, value, node.weight);
        }
    }
    for child in &node.children {
        dump_node(child, depth + 1, out);
    }
}

fn verify<S: Debug + PartialEq, V>(
    root: &Node<S, V>,
    aggregation: Aggregation,
    growth: Growth,
) -> Vec<String> {
    let mut issues = Vec::new();
    match &root.kind {
        Kind::Leaf { .. } => issues.push("root must be a branch node".to_string()),
        Kind::Branch(path) => {
            if !path.is_empty() {
                issues.push(format!("root path must be empty, got {path:?}"));
            }
        }
    }
    if root.leaf_count == 0 && (root.weight != 0.0 || !root.children.is_empty()) {
        issues.push(format!(
            "empty tree must have weight 0 and no children (weight={}, children={})",
            root.weight,
            root.children.len()
        ));
    }
    verify_node(root, aggregation, growth, true, &mut issues);
    issues
}

/// Recursive checker. Returns `(leaf weight sum, leaf count)` for the
/// subtree so parents can validate their aggregates.
fn verify_node<S: Debug + PartialEq, V>(
    node: &Node<S, V>,
    aggregation: Aggregation,
    growth: Growth,
    is_root: bool,
    issues: &mut Vec<String>,
) -> (f64, usize) {
    if !node.weight.is_finite() || node.weight < 0.0 {
        issues.push(format!(
            "weight must be finite and non-negative at {:?}, got {}",
            node.path(),
            node.weight
        ));
    }

    match &node.kind {
        Kind::Leaf { key, .. } => {
            if !node.children.is_empty() {
                issues.push(format!("leaf {key:?} has children"));
            }
            if node.leaf_count != 1 {
                issues.push(format!(
                    "leaf {key:?} has leaf_count {}, expected 1",
                    node.leaf_count
                ));
            }
            if node.weight <= 0.0 {
                issues.push(format!("leaf {key:?} has non-positive weight {}", node.weight));
            }
            (node.weight, 1)
        }
        Kind::Branch(path) => {
            if !is_root && node.children.is_empty() {
                issues.push(format!("non-root branch {path:?} is empty"));
            }
            if !is_root && growth == Growth::Compressed && node.children.len() == 1 {
                issues.push(format!("compressible branch {path:?} with exactly one child"));
            }

            let mut leaf_sum = 0.0;
            let mut leaves = 0usize;
            for (i, child) in node.children.iter().enumerate() {
                let cpath = child.path();
                if cpath.len() < path.len() || cpath[..path.len()] != path[..] {
                    issues.push(format!(
                        "child path {:?} does not extend branch path {:?}",
                        cpath, path
                    ));
                }
                match growth {
                    Growth::OneSymbol => {
                        let want = if child.is_leaf() {
                            path.len()
                        } else {
                            path.len() + 1
                        };
                        if cpath.len() != want {
                            issues.push(format!(
                                "child path {:?} under {:?} has length {}, expected {}",
                                cpath,
                                path,
                                cpath.len(),
                                want
                            ));
                        }
                    }
                    Growth::Compressed => {
                        if !child.is_leaf() && cpath.len() <= path.len() {
                            issues.push(format!(
                                "branch path {:?} does not strictly extend {:?}",
                                cpath, path
                            ));
                        }
                    }
                }
                if child.is_empty() {
                    issues.push(format!("empty subtree at {cpath:?} was not pruned"));
                }
                if i > 0 && node.children[i - 1].weight < child.weight {
                    issues.push(format!(
                        "children of {:?} not sorted by non-increasing weight at index {}",
                        path, i
                    ));
                }

                let (w, n) = verify_node(child, aggregation, growth, false, issues);
                leaf_sum += w;
                leaves += n;
            }

            if node.leaf_count != leaves {
                issues.push(format!(
                    "branch {:?} has leaf_count {}, expected {}",
                    path, node.leaf_count, leaves
                ));
            }
            let expected = if leaves == 0 {
                0.0
            } else {
                match aggregation {
                    Aggregation::Sum => leaf_sum,
                    Aggregation::Average => leaf_sum / leaves as f64,
                }
            };
            if (node.weight - expected).abs() > WEIGHT_EPS {
                issues.push(format!(
                    "branch {:?} has weight {}, expected {} under {:?}",
                    path, node.weight, expected, aggregation
                ));
            }
            (leaf_sum, leaves)
        }
    }
}
