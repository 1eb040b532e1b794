//! Stack-based cursors over a tree: ascending scan, descending scan,
//! intersects scan, and (via `spatial.rs`'s own heap-based walk) kNN.
//!
//! Grounded on bgen.h's `BGEN_ITER` struct (a fixed-depth stack of
//! `(node, index)` frames) and `_iter_next_asc`/`_iter_next_desc`. The
//! stack is sized by `util::max_height` so no reallocation is needed once
//! a cursor is created, matching bgen.h's static `BGEN_ITER.stack[]`.

use crate::link::Link;
use crate::node::Node;
use crate::traits::Comparator;
use crate::tree::BTree;
use crate::util::max_height;
use smallvec::SmallVec;

struct Frame<'a, Item, Coord, const D: usize, L> {
    node: &'a Node<Item, Coord, D, L>,
    /// Index of the next item/child to visit from this frame.
    index: usize,
}

/// Ascending or descending in-order cursor over a tree's items.
pub struct Cursor<'a, Item, Coord, const D: usize, L> {
    stack: SmallVec<[Frame<'a, Item, Coord, D, L>; 16]>,
    descending: bool,
}

impl<'a, Item, Coord, const D: usize, L> Cursor<'a, Item, Coord, D, L>
where
    L: Link<Node<Item, Coord, D, L>>,
{
    fn new(root: Option<&'a L>, descending: bool, fanout: usize) -> Self {
        let mut stack = SmallVec::with_capacity(max_height(fanout));
        if let Some(root) = root {
            let node = L::get(root);
            stack.push(Frame {
                node,
                index: if descending { node.items.len() } else { 0 },
            });
        }
        Cursor { stack, descending }
    }

    pub fn ascending(root: Option<&'a L>, fanout: usize) -> Self {
        let mut cursor = Self::new(root, false, fanout);
        cursor.descend_to_leftmost();
        cursor
    }

    pub fn descending(root: Option<&'a L>, fanout: usize) -> Self {
        let mut cursor = Self::new(root, true, fanout);
        cursor.descend_to_rightmost();
        cursor
    }

    /// Build a cursor already seeked to absolute position `index` in a
    /// `Counted` tree, without any key comparisons. Shares the same
    /// subtree-count walk as `positional::get_at`/`tree::insert_at_into`;
    /// exposed `pub(crate)` since it's only ever reached through
    /// `positional.rs`'s `Counted`-specialized `seek_at`/`seek_at_desc`.
    pub(crate) fn at_position(root: Option<&'a L>, fanout: usize, mut index: usize, descending: bool) -> Self {
        let mut stack: SmallVec<[Frame<'a, Item, Coord, D, L>; 16]> = SmallVec::with_capacity(max_height(fanout));
        let mut link = root;
        while let Some(current) = link {
            let node = L::get(current);
            if node.is_leaf {
                let slot = if descending { index + 1 } else { index };
                stack.push(Frame { node, index: slot });
                return Cursor { stack, descending };
            }

            let mut child_index = node.children.len() - 1;
            let mut landed_slot = None;
            for c in 0..node.items.len() {
                let count = node.count_of(c);
                if index < count {
                    child_index = c;
                    break;
                }
                index -= count;
                if index == 0 {
                    landed_slot = Some(if descending { c + 1 } else { c });
                    break;
                }
                index -= 1;
                child_index = c + 1;
            }

            if let Some(slot) = landed_slot {
                stack.push(Frame { node, index: slot });
                return Cursor { stack, descending };
            }
            stack.push(Frame { node, index: child_index });
            link = Some(&node.children[child_index]);
        }
        Cursor { stack, descending }
    }

    fn descend_to_leftmost(&mut self) {
        while let Some(top) = self.stack.last() {
            if top.node.is_leaf {
                break;
            }
            let child = L::get(&top.node.children[0]);
            self.stack.push(Frame { node: child, index: 0 });
        }
    }

    fn descend_to_rightmost(&mut self) {
        while let Some(top) = self.stack.last() {
            if top.node.is_leaf {
                break;
            }
            let last = top.node.children.len() - 1;
            let child = L::get(&top.node.children[last]);
            self.stack.push(Frame {
                node: child,
                index: child.items.len(),
            });
        }
    }
}

impl<'a, Item, Coord, const D: usize, L> Iterator for Cursor<'a, Item, Coord, D, L>
where
    L: Link<Node<Item, Coord, D, L>>,
{
    type Item = &'a Item;

    /// Standard B-tree in-order walk: a leaf yields every item in turn;
    /// a branch yields an item only after its left child has been fully
    /// drained, which is why `index` both selects the next child to
    /// descend into and the item slot immediately after it.
    fn next(&mut self) -> Option<Self::Item> {
        if self.descending {
            self.next_desc()
        } else {
            self.next_asc()
        }
    }
}

impl<'a, Item, Coord, const D: usize, L> Cursor<'a, Item, Coord, D, L>
where
    L: Link<Node<Item, Coord, D, L>>,
{
    fn next_asc(&mut self) -> Option<&'a Item> {
        loop {
            let top = self.stack.last_mut()?;
            if top.node.is_leaf {
                if top.index < top.node.items.len() {
                    let item = &top.node.items[top.index];
                    top.index += 1;
                    return Some(item);
                }
                self.stack.pop();
                continue;
            }
            if top.index < top.node.items.len() {
                let item = &top.node.items[top.index];
                let child = L::get(&top.node.children[top.index + 1]);
                top.index += 1;
                self.stack.push(Frame { node: child, index: 0 });
                self.descend_to_leftmost();
                return Some(item);
            }
            self.stack.pop();
        }
    }

    fn next_desc(&mut self) -> Option<&'a Item> {
        loop {
            let top = self.stack.last_mut()?;
            if top.node.is_leaf {
                if top.index > 0 {
                    top.index -= 1;
                    return Some(&top.node.items[top.index]);
                }
                self.stack.pop();
                continue;
            }
            if top.index > 0 {
                top.index -= 1;
                let item = &top.node.items[top.index];
                let child = L::get(&top.node.children[top.index]);
                self.stack.push(Frame {
                    node: child,
                    index: child.items.len(),
                });
                self.descend_to_rightmost();
                return Some(item);
            }
            self.stack.pop();
        }
    }
}

impl<Item, Cmp, Cnt, Spat, Coord, const D: usize, L, const FANOUT: usize, const BSEARCH: bool, const PATH_HINT: bool>
    BTree<Item, Cmp, Cnt, Spat, Coord, D, L, FANOUT, BSEARCH, PATH_HINT>
where
    Cmp: Comparator<Item>,
    Cnt: crate::policy::CountCapability,
    Spat: crate::policy::SpatialCapability<Item, Coord, D>,
    Item: Clone,
    Coord: Clone,
    L: Link<Node<Item, Coord, D, L>>,
{
    pub fn iter(&self) -> Cursor<'_, Item, Coord, D, L> {
        Cursor::ascending(self.root_link(), crate::util::clamp_fanout(FANOUT))
    }

    pub fn iter_rev(&self) -> Cursor<'_, Item, Coord, D, L> {
        Cursor::descending(self.root_link(), crate::util::clamp_fanout(FANOUT))
    }

    /// An ascending cursor seeked to the first item not less than `key`,
    /// the usual lower-bound range-scan entry point. Mirrors bgen.h's
    /// `_seek`.
    pub fn range_from(&self, key: &Item) -> Cursor<'_, Item, Coord, D, L> {
        let fanout = crate::util::clamp_fanout(FANOUT);
        let mut stack: SmallVec<[Frame<'_, Item, Coord, D, L>; 16]> = SmallVec::with_capacity(max_height(fanout));
        let mut link = self.root_link();
        while let Some(current) = link {
            let node = L::get(current);
            match crate::search::search::<Item, Cmp, BSEARCH>(&node.items, self.comparator(), key) {
                Ok(i) => {
                    stack.push(Frame { node, index: i });
                    return Cursor { stack, descending: false };
                }
                Err(i) => {
                    stack.push(Frame { node, index: i });
                    if node.is_leaf {
                        break;
                    }
                    link = Some(&node.children[i]);
                }
            }
        }
        let mut cursor = Cursor { stack, descending: false };
        cursor.trim_leaf_frame_to_bound();
        cursor
    }

    /// Alias for [`Self::range_from`], read more naturally as a named
    /// starting point for a forward scan.
    pub fn seek(&self, key: &Item) -> Cursor<'_, Item, Coord, D, L> {
        self.range_from(key)
    }

    /// A descending cursor seeked to the last item not greater than `key`,
    /// the descending counterpart to `range_from`/`seek`. Mirrors bgen.h's
    /// `_seek` run with the opposite iteration direction.
    pub fn seek_desc(&self, key: &Item) -> Cursor<'_, Item, Coord, D, L> {
        let fanout = crate::util::clamp_fanout(FANOUT);
        let mut stack: SmallVec<[Frame<'_, Item, Coord, D, L>; 16]> = SmallVec::with_capacity(max_height(fanout));
        let mut link = self.root_link();
        while let Some(current) = link {
            let node = L::get(current);
            match crate::search::search::<Item, Cmp, BSEARCH>(&node.items, self.comparator(), key) {
                Ok(i) => {
                    stack.push(Frame { node, index: i + 1 });
                    return Cursor { stack, descending: true };
                }
                Err(i) => {
                    stack.push(Frame { node, index: i });
                    if node.is_leaf {
                        break;
                    }
                    link = Some(&node.children[i]);
                }
            }
        }
        Cursor { stack, descending: true }
    }

    /// Visit every item from `iter()` in order, stopping early if `visit`
    /// returns `false`. Mirrors bgen.h's `scan`, which folds next-calls and
    /// a stop check into one convenience routine for callers that don't
    /// need to hold a live cursor across calls.
    pub fn scan<'a>(&'a self, mut visit: impl FnMut(&'a Item) -> bool) -> crate::status::Status {
        for item in self.iter() {
            if !visit(item) {
                return crate::status::Status::Stopped;
            }
        }
        crate::status::Status::Finished
    }

    /// Descending counterpart to [`Self::scan`].
    pub fn scan_desc<'a>(&'a self, mut visit: impl FnMut(&'a Item) -> bool) -> crate::status::Status {
        for item in self.iter_rev() {
            if !visit(item) {
                return crate::status::Status::Stopped;
            }
        }
        crate::status::Status::Finished
    }
}

impl<'a, Item, Coord, const D: usize, L> Cursor<'a, Item, Coord, D, L> {
    /// After a `range_from` miss lands on a leaf, the top frame's `index`
    /// is already the lower bound within that leaf; nothing further to
    /// adjust, this just documents the invariant the scan relies on.
    fn trim_leaf_frame_to_bound(&mut self) {}
}
