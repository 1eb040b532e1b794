//! Node algebra: the structural rewrites insert/delete compose to keep a
//! node's item count within `[min_items, max_items]`.
//!
//! Grounded line-for-line on bgen.h's `_node_split`, `_node_join`,
//! `_node_give_left`, `_node_give_right`, `_node_rebalance`. These
//! functions only shuffle slots around (items, and for branches children
//! plus whichever of counts/rects are present) — they never recompute an
//! aggregate themselves. The caller (`tree.rs`), which knows which
//! capabilities are active, recomputes any count/rect that now describes
//! a different set of children after a structural change.

use crate::node::Node;

/// Split a full node (`len(node) == max_items`) in place. `node` keeps the
/// left half; the right half and the promoted separator item are
/// returned. Mirrors `_node_split`: the median item always moves up,
/// whether the node is a leaf or a branch.
pub fn split_full<Item, Coord, const D: usize, L>(node: &mut Node<Item, Coord, D, L>, counted: bool, spatial: bool) -> (Item, Node<Item, Coord, D, L>) {
    let len = node.items.len();
    let mid = len / 2;

    let separator = node.items.remove(mid);
    let right_items = node.items.drain(mid..).collect();
    let mut right = Node {
        items: right_items,
        is_leaf: node.is_leaf,
        height: node.height,
        children: Default::default(),
        counts: counted.then(Default::default),
        rects: spatial.then(Default::default),
    };

    if !node.is_leaf {
        right.children = node.children.drain(mid + 1..).collect();
        if let (Some(left_counts), Some(right_counts)) = (node.counts.as_mut(), right.counts.as_mut()) {
            *right_counts = left_counts.drain(mid + 1..).collect();
        }
        if let (Some(left_rects), Some(right_rects)) = (node.rects.as_mut(), right.rects.as_mut()) {
            *right_rects = left_rects.drain(mid + 1..).collect();
        }
    }

    (separator, right)
}

/// Merge `separator` and `right` into `left`, which must together hold at
/// most `max_items` items. Mirrors `_node_join`; this is the exact inverse
/// of [`split_full`].
pub fn join<Item, Coord, const D: usize, L>(left: &mut Node<Item, Coord, D, L>, separator: Item, mut right: Node<Item, Coord, D, L>) {
    left.items.push(separator);
    left.items.append(&mut right.items);

    if !left.is_leaf {
        left.children.append(&mut right.children);
        if let (Some(left_counts), Some(right_counts)) = (left.counts.as_mut(), right.counts.as_mut()) {
            left_counts.append(right_counts);
        }
        if let (Some(left_rects), Some(right_rects)) = (left.rects.as_mut(), right.rects.as_mut()) {
            left_rects.append(right_rects);
        }
    }
}

/// Borrow the leftmost item (and, for branches, leftmost child) of
/// `right` through `separator`, growing `left` by one and shrinking
/// `right` by one. Mirrors `_node_give_right_to_left` — the counterpart
/// to [`give_right`] used when `left` has underflowed and `right` has
/// more than the minimum to spare.
pub fn give_left<Item, Coord, const D: usize, L>(separator: &mut Item, left: &mut Node<Item, Coord, D, L>, right: &mut Node<Item, Coord, D, L>) {
    let borrowed_item = right.items.remove(0);
    let old_separator = std::mem::replace(separator, borrowed_item);
    left.items.push(old_separator);

    if !left.is_leaf {
        let borrowed_child = right.children.remove(0);
        left.children.push(borrowed_child);
        if let (Some(left_counts), Some(right_counts)) = (left.counts.as_mut(), right.counts.as_mut()) {
            left_counts.push(right_counts.remove(0));
        }
        if let (Some(left_rects), Some(right_rects)) = (left.rects.as_mut(), right.rects.as_mut()) {
            left_rects.push(right_rects.remove(0));
        }
    }
}

/// Borrow the rightmost item (and, for branches, rightmost child) of
/// `left` through `separator`, growing `right` by one and shrinking
/// `left` by one. Mirrors `_node_give_left_to_right`.
pub fn give_right<Item, Coord, const D: usize, L>(separator: &mut Item, left: &mut Node<Item, Coord, D, L>, right: &mut Node<Item, Coord, D, L>) {
    let borrowed_item = left.items.pop().expect("left has spare items");
    let old_separator = std::mem::replace(separator, borrowed_item);
    right.items.insert(0, old_separator);

    if !left.is_leaf {
        let borrowed_child = left.children.pop().expect("left has spare children");
        right.children.insert(0, borrowed_child);
        if let (Some(left_counts), Some(right_counts)) = (left.counts.as_mut(), right.counts.as_mut()) {
            right_counts.insert(0, left_counts.pop().expect("left has spare counts"));
        }
        if let (Some(left_rects), Some(right_rects)) = (left.rects.as_mut(), right.rects.as_mut()) {
            right_rects.insert(0, left_rects.pop().expect("left has spare rects"));
        }
    }
}

/// The outcome of rebalancing two adjacent siblings around a separator
/// after one of them has underflowed below `min_items`.
pub enum Rebalanced {
    /// The siblings were rotated; both remain, the parent keeps its slot
    /// for `right` with an updated separator.
    Rotated,
    /// The siblings were merged into `left`; the parent must drop its
    /// `right` child slot and the separator entirely.
    Merged,
}

/// Decide between a rotation ([`give_left`]/[`give_right`]) and a merge
/// ([`join`]) for two siblings around `separator`, given that one of them
/// has fewer than `min_items` items. Mirrors `_node_rebalance`: prefer
/// rotating from whichever sibling has items to spare; only merge when
/// neither does.
pub fn rebalance<Item, Coord, const D: usize, L>(
    separator: &mut Item,
    left: &mut Node<Item, Coord, D, L>,
    right: &mut Node<Item, Coord, D, L>,
    min_items: usize,
) -> Rebalanced {
    if left.items.len() > min_items {
        give_right(separator, left, right);
        Rebalanced::Rotated
    } else if right.items.len() > min_items {
        give_left(separator, left, right);
        Rebalanced::Rotated
    } else {
        Rebalanced::Merged
    }
}
