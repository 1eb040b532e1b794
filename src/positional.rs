//! Rank/select operations available only on a `Counted` tree.
//!
//! Grounded on bgen.h's `_get_at`/`_delete_at`/`_insert_at`/`index-of`
//! helpers, which walk the per-child subtree counts instead of comparing
//! items, turning positional access into O(log n) instead of O(n). The
//! `impl` block below is specialized to the concrete `Counted` marker, so
//! calling `get_at` on an `Uncounted` tree is a compile error rather than
//! bgen.h's runtime `BGEN_UNSUPPORTED`.

use crate::cursor::Cursor;
use crate::link::Link;
use crate::node::Node;
use crate::policy::Counted;
use crate::status::Status;
use crate::traits::Comparator;
use crate::tree::BTree;

impl<Item, Cmp, Spat, Coord, const D: usize, L, const FANOUT: usize, const BSEARCH: bool, const PATH_HINT: bool>
    BTree<Item, Cmp, Counted, Spat, Coord, D, L, FANOUT, BSEARCH, PATH_HINT>
where
    Cmp: Comparator<Item>,
    Item: Clone,
    Coord: Clone,
    L: Link<Node<Item, Coord, D, L>>,
{
    /// The item at zero-based position `index` in ascending order, or
    /// `None` if `index >= len()`. Mirrors `_get_at`.
    pub fn get_at(&self, mut index: usize) -> Option<&Item> {
        if index >= self.len() {
            return None;
        }
        let mut link = self.root_link()?;
        loop {
            let node = crate::link::Link::get(link);
            if node.is_leaf {
                return Some(&node.items[index]);
            }
            for child in 0..node.children.len() {
                let child_count = node.count_of(child);
                if index < child_count {
                    link = &node.children[child];
                    break;
                }
                index -= child_count;
                if child < node.items.len() {
                    if index == 0 {
                        return Some(&node.items[child]);
                    }
                    index -= 1;
                }
            }
        }
    }

    /// The ascending rank of `key`, i.e. the number of items strictly
    /// less than it, whether or not `key` itself is present. Mirrors
    /// bgen.h's `index-of` helper built on the same subtree counts.
    pub fn index_of(&self, key: &Item) -> usize {
        let Some(mut link) = self.root_link() else {
            return 0;
        };
        let mut rank = 0usize;
        loop {
            let node = crate::link::Link::get(link);
            let found = crate::search::search::<Item, Cmp, BSEARCH>(&node.items, self.comparator(), key);
            // A leaf has no children (and so no `counts` entries at all,
            // even when `counted` is set), so the item's own in-node index
            // *is* the number of items strictly less than it within this
            // leaf; summing `count_of` here would index past an empty
            // `counts` array and panic.
            if node.is_leaf {
                return rank + found.unwrap_or_else(|i| i);
            }
            match found {
                Ok(i) => {
                    for child in 0..i {
                        rank += node.count_of(child) + 1;
                    }
                    rank += node.count_of(i);
                    return rank;
                }
                Err(i) => {
                    for child in 0..i {
                        rank += node.count_of(child) + 1;
                    }
                    link = &node.children[i];
                }
            }
        }
    }

    /// Insert `item` at absolute position `index`, failing with
    /// `Status::OutOfOrder` if that would violate the tree's order.
    pub fn insert_at(&mut self, index: usize, item: Item) -> Status
    where
        Coord: Copy + PartialOrd,
    {
        self.insert_at_entry(index, item)
    }

    /// Delete the item at absolute position `index`.
    pub fn delete_at(&mut self, index: usize) -> Status
    where
        Coord: Copy + PartialOrd,
    {
        self.delete_at_entry(index)
    }

    /// Replace the item at absolute position `index` with `item`, checked
    /// only against its immediate neighbors.
    pub fn replace_at(&mut self, index: usize, item: Item) -> Status
    where
        Coord: Copy + PartialOrd,
    {
        self.replace_at_entry(index, item)
    }

    /// An ascending cursor seeked to absolute position `index`.
    pub fn seek_at(&self, index: usize) -> Cursor<'_, Item, Coord, D, L> {
        let fanout = crate::util::clamp_fanout(FANOUT);
        if index >= self.len() {
            return Cursor::at_position(None, fanout, 0, false);
        }
        Cursor::at_position(self.root_link(), fanout, index, false)
    }

    /// A descending cursor seeked to absolute position `index`.
    pub fn seek_at_desc(&self, index: usize) -> Cursor<'_, Item, Coord, D, L> {
        let fanout = crate::util::clamp_fanout(FANOUT);
        if index >= self.len() {
            return Cursor::at_position(None, fanout, 0, true);
        }
        Cursor::at_position(self.root_link(), fanout, index, true)
    }
}
