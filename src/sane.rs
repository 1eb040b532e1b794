//! Standalone invariant checker, independent of the mutation code paths.
//!
//! Grounded on bgen.h's `_sane0`/`_sane`, which the test suite calls after
//! every mutation in debug builds to catch a broken invariant at the
//! smallest possible repro instead of as a later, harder-to-place panic.
//! Deliberately written without reusing any of `tree.rs`'s own traversal
//! helpers, so a bug shared between the mutator and the checker can't
//! cancel out.

use crate::link::Link;
use crate::node::Node;
use crate::policy::{CountCapability, SpatialCapability};
use crate::traits::Comparator;
use crate::tree::BTree;

pub fn check<Item, Cmp, Cnt, Spat, Coord, const D: usize, L, const FANOUT: usize, const BSEARCH: bool, const PATH_HINT: bool>(
    tree: &BTree<Item, Cmp, Cnt, Spat, Coord, D, L, FANOUT, BSEARCH, PATH_HINT>,
) -> bool
where
    Cmp: Comparator<Item>,
    Cnt: CountCapability,
    Spat: SpatialCapability<Item, Coord, D>,
    Item: Clone,
    Coord: Copy + PartialOrd + PartialEq,
    L: Link<Node<Item, Coord, D, L>>,
{
    let Some(root) = tree.root_link() else { return true };
    let root_node = L::get(root);
    check_node(tree, root_node, true, root_node.height()).is_some()
}

/// Returns `Some((min, max, count))` describing the subtree's item range,
/// cardinality, and union rectangle when sane, or `None` the instant an
/// invariant is violated.
fn check_node<Item, Cmp, Cnt, Spat, Coord, const D: usize, L, const FANOUT: usize, const BSEARCH: bool, const PATH_HINT: bool>(
    tree: &BTree<Item, Cmp, Cnt, Spat, Coord, D, L, FANOUT, BSEARCH, PATH_HINT>,
    node: &Node<Item, Coord, D, L>,
    is_root: bool,
    expected_height: u32,
) -> Option<()>
where
    Cmp: Comparator<Item>,
    Cnt: CountCapability,
    Spat: SpatialCapability<Item, Coord, D>,
    Item: Clone,
    Coord: Copy + PartialOrd + PartialEq,
    L: Link<Node<Item, Coord, D, L>>,
{
    if node.height() != expected_height {
        return None;
    }

    let max_items = BTree::<Item, Cmp, Cnt, Spat, Coord, D, L, FANOUT, BSEARCH, PATH_HINT>::max_items();
    let min_items = BTree::<Item, Cmp, Cnt, Spat, Coord, D, L, FANOUT, BSEARCH, PATH_HINT>::min_items();

    if node.len() > max_items {
        return None;
    }
    if !is_root && node.len() < min_items {
        return None;
    }
    if is_root && !node.is_leaf() && node.len() == 0 {
        return None;
    }

    for pair in node.items.windows(2) {
        if !tree.comparator().less(&pair[0], &pair[1]) {
            return None;
        }
    }

    if node.is_leaf() {
        if !node.children.is_empty() {
            return None;
        }
        return Some(());
    }

    if node.children.len() != node.len() + 1 {
        return None;
    }

    for (i, child) in node.children.iter().enumerate() {
        let child_node = L::get(child);
        check_node(tree, child_node, false, expected_height - 1)?;

        if i > 0 {
            if !tree.comparator().less(&node.items[i - 1], child_node.leftmost_item()) {
                return None;
            }
        }
        if i < node.len() {
            if !tree.comparator().less(child_node.rightmost_item(), &node.items[i]) {
                return None;
            }
        }

        if Cnt::ENABLED {
            let mut expected = child_node.len();
            if let Some(counts) = child_node.counts.as_ref() {
                expected += counts.iter().sum::<usize>();
            }
            if node.count_of(i) != expected {
                return None;
            }
        }

        if Spat::ENABLED {
            let expected_rect = subtree_rect(tree, child_node);
            match (node.rect_of(i), expected_rect.as_ref()) {
                (Some(stored), Some(expected)) if stored.eq_exact(expected) => {}
                (None, None) => {}
                _ => return None,
            }
        }
    }

    Some(())
}

/// Recompute the tight bounding rectangle of an entire subtree from
/// scratch, independent of any stored `rects` annotation, for comparison
/// against what the mutation code path actually left behind.
fn subtree_rect<Item, Cmp, Cnt, Spat, Coord, const D: usize, L, const FANOUT: usize, const BSEARCH: bool, const PATH_HINT: bool>(
    tree: &BTree<Item, Cmp, Cnt, Spat, Coord, D, L, FANOUT, BSEARCH, PATH_HINT>,
    node: &Node<Item, Coord, D, L>,
) -> Option<crate::rect::Rect<Coord, D>>
where
    Spat: SpatialCapability<Item, Coord, D>,
    Coord: Copy + PartialOrd,
    L: Link<Node<Item, Coord, D, L>>,
{
    let mut acc: Option<crate::rect::Rect<Coord, D>> = None;
    for item in node.items.iter() {
        if let Some(r) = tree.spatial_capability().try_rect(item) {
            acc = Some(match acc {
                Some(a) => a.join(&r),
                None => r,
            });
        }
    }
    if !node.is_leaf() {
        for child in node.children.iter() {
            if let Some(r) = subtree_rect(tree, L::get(child)) {
                acc = Some(match acc {
                    Some(a) => a.join(&r),
                    None => r,
                });
            }
        }
    }
    acc
}
