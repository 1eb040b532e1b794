//! The `BTree` type and its core operations.
//!
//! Grounded on bgen.h's `_insert0`/`_insert1` (recursive descent, split on
//! the way back up) and `_delete0`/`_delete1` (recursive descent,
//! rebalance-or-merge on the way back up). bgen.h additionally offers a
//! non-recursive "fast path" for ordered, non-spatial trees that threads a
//! mutable path array instead of the call stack; this crate keeps the
//! single recursive implementation for both shapes; it is the same
//! asymptotic algorithm bgen.h's fast path specializes, and recursion
//! depth is bounded by `util::max_height`, which is small (<= ~13 even at
//! the minimum fanout for `u64::MAX` items), so the call-stack cost the
//! fast path exists to avoid is negligible here. This simplification is
//! recorded in DESIGN.md.

use crate::algebra::{self, Rebalanced};
use crate::link::Link;
use crate::node::Node;
use crate::oom;
use crate::policy::{CoordMarker, CountCapability, SpatialCapability};
use crate::status::Status;
use crate::traits::Comparator;
use crate::util::{clamp_fanout, max_height, max_items, min_items};
use std::marker::PhantomData;

pub struct BTree<Item, Cmp, Cnt, Spat, Coord, const D: usize, L, const FANOUT: usize = 16, const BSEARCH: bool = false, const PATH_HINT: bool = false> {
    root: Option<L>,
    len: usize,
    cmp: Cmp,
    cnt: Cnt,
    spat: Spat,
    _coord: CoordMarker<Coord>,
    _item: PhantomData<Item>,
}

pub(crate) enum InsertOutcome<Item, L> {
    Inserted,
    Replaced(Item),
    Split { separator: Item, right: L },
}

pub(crate) enum DeleteOutcome<Item> {
    NotFound,
    Deleted(Item),
    /// Deleted, and the node this was performed in now holds fewer than
    /// `min_items` items; the caller must rebalance or merge it with a
    /// sibling.
    Underflowed(Item),
}

impl<Item, Cmp, Cnt, Spat, Coord, const D: usize, L, const FANOUT: usize, const BSEARCH: bool, const PATH_HINT: bool>
    BTree<Item, Cmp, Cnt, Spat, Coord, D, L, FANOUT, BSEARCH, PATH_HINT>
where
    Cmp: Comparator<Item>,
    Cnt: CountCapability,
    Spat: SpatialCapability<Item, Coord, D>,
    Item: Clone,
    Coord: Clone,
    L: Link<Node<Item, Coord, D, L>>,
{
    const MAX_ITEMS: usize = max_items(clamp_fanout(FANOUT));
    const MIN_ITEMS: usize = min_items(clamp_fanout(FANOUT));

    pub fn new(cmp: Cmp, cnt: Cnt, spat: Spat) -> Self {
        BTree {
            root: None,
            len: 0,
            cmp,
            cnt,
            spat,
            _coord: CoordMarker(PhantomData),
            _item: PhantomData,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn height(&self) -> u32 {
        self.root.as_ref().map(|r| L::get(r).height()).unwrap_or(0)
    }

    fn search(items: &[Item], cmp: &Cmp, key: &Item) -> Result<usize, usize> {
        crate::search::search::<Item, Cmp, BSEARCH>(items, cmp, key)
    }

    pub fn get(&self, key: &Item) -> Option<&Item> {
        let mut link = self.root.as_ref()?;
        if PATH_HINT {
            let mut hints: smallvec::SmallVec<[usize; 16]> = smallvec::smallvec![0usize; max_height(clamp_fanout(FANOUT))];
            let mut depth = 0usize;
            loop {
                let node = L::get(link);
                match crate::search::search_with_hint::<Item, Cmp, BSEARCH>(&node.items, &self.cmp, key, &mut hints[depth]) {
                    Ok(i) => return Some(&node.items[i]),
                    Err(i) => {
                        if node.is_leaf {
                            return None;
                        }
                        link = &node.children[i];
                        depth += 1;
                    }
                }
            }
        }
        loop {
            let node = L::get(link);
            match Self::search(&node.items, &self.cmp, key) {
                Ok(i) => return Some(&node.items[i]),
                Err(i) => {
                    if node.is_leaf {
                        return None;
                    }
                    link = &node.children[i];
                }
            }
        }
    }

    /// COW-realizing variant of [`Self::get`]: unshares every node on the
    /// path to `key` before returning a mutable reference to it, so the
    /// caller can mutate the item in place without disturbing any clone
    /// that shares the rest of the tree. Mirrors the cursor's own
    /// per-child `cow()` call (spec.md §4.7), just inlined along a single
    /// search path instead of a full traversal.
    pub fn get_mut(&mut self, key: &Item) -> Option<&mut Item> {
        let BTree { root, cmp, .. } = self;
        let link = root.as_mut()?;
        Self::get_mut_in(link, cmp, key)
    }

    fn get_mut_in<'a>(link: &'a mut L, cmp: &Cmp, key: &Item) -> Option<&'a mut Item> {
        let found = Self::search(&L::get(link).items, cmp, key);
        match found {
            Ok(i) => Some(&mut L::make_mut(link).items[i]),
            Err(i) => {
                if L::get(link).is_leaf {
                    None
                } else {
                    Self::get_mut_in(&mut L::make_mut(link).children[i], cmp, key)
                }
            }
        }
    }

    pub fn contains(&self, key: &Item) -> bool {
        self.get(key).is_some()
    }

    pub fn front(&self) -> Option<&Item> {
        self.root.as_ref().map(|r| L::get(r).leftmost_item())
    }

    pub fn back(&self) -> Option<&Item> {
        self.root.as_ref().map(|r| L::get(r).rightmost_item())
    }

    /// Recompute the count/rect annotation a parent keeps for one child
    /// slot, from that child's own (already-consistent) node. O(fanout),
    /// never recurses, since the child's own augmentation is already
    /// correct by induction.
    fn child_count(&self, link: &L) -> usize {
        if !Cnt::ENABLED {
            return 0;
        }
        let node = L::get(link);
        let mut total = node.items.len();
        if let Some(counts) = node.counts.as_ref() {
            total += counts.iter().sum::<usize>();
        }
        total
    }

    fn child_rect(&self, link: &L) -> Option<crate::rect::Rect<Coord, D>>
    where
        Coord: Copy + PartialOrd,
    {
        if !Spat::ENABLED {
            return None;
        }
        let node = L::get(link);
        let mut acc: Option<crate::rect::Rect<Coord, D>> = None;
        for item in node.items.iter() {
            if let Some(r) = self.spat.try_rect(item) {
                acc = Some(match acc {
                    Some(a) => a.join(&r),
                    None => r,
                });
            }
        }
        if let Some(rects) = node.rects.as_ref() {
            for r in rects.iter() {
                acc = Some(match acc {
                    Some(a) => a.join(r),
                    None => *r,
                });
            }
        }
        acc
    }

    fn fix_child_annotations(&self, parent: &mut Node<Item, Coord, D, L>, child_index: usize)
    where
        Coord: Copy + PartialOrd,
    {
        let link = &parent.children[child_index];
        let count = self.child_count(link);
        let rect = self.child_rect(link);
        parent.set_count(child_index, count);
        if let Some(rect) = rect {
            parent.set_rect(child_index, rect);
        }
    }

    #[tracing::instrument(skip(self, item))]
    pub fn insert(&mut self, item: Item) -> Status
    where
        Coord: Copy + PartialOrd,
    {
        let Some(root_link) = self.root.as_mut() else {
            if let Err(status) = oom::checkpoint() {
                return status;
            }
            let mut leaf = Node::new_leaf(Cnt::ENABLED, Spat::ENABLED);
            leaf.items.push(item);
            self.root = Some(L::new(leaf));
            self.len = 1;
            return Status::Inserted;
        };
        let outcome = self.insert_into(root_link, item);
        self.finish_insert(outcome)
    }

    /// Common tail of every insert-shaped operation (`insert`, `insert_at`):
    /// grow the tree's length, split the root if the descent bubbled a
    /// split all the way up, and translate the result into a `Status`.
    fn finish_insert(&mut self, outcome: Result<InsertOutcome<Item, L>, Status>) -> Status
    where
        Coord: Copy + PartialOrd,
    {
        match outcome {
            Ok(InsertOutcome::Inserted) => {
                self.len += 1;
                Status::Inserted
            }
            Ok(InsertOutcome::Replaced(_)) => Status::Replaced,
            Ok(InsertOutcome::Split { separator, right }) => {
                self.len += 1;
                let old_root = self.root.take().unwrap();
                let left_count = self.child_count(&old_root);
                let left_rect = self.child_rect(&old_root);
                let right_count = self.child_count(&right);
                let right_rect = self.child_rect(&right);

                let mut new_root = Node::new_branch(L::get(&old_root).height() + 1, Cnt::ENABLED, Spat::ENABLED);
                new_root.items.push(separator);
                new_root.children.push(old_root);
                new_root.children.push(right);
                if let Some(counts) = new_root.counts.as_mut() {
                    counts.push(left_count);
                    counts.push(right_count);
                }
                if let (Some(rects), Some(left_rect), Some(right_rect)) = (new_root.rects.as_mut(), left_rect, right_rect) {
                    rects.push(left_rect);
                    rects.push(right_rect);
                }
                self.root = Some(L::new(new_root));
                Status::Inserted
            }
            Err(status) => status,
        }
    }

    pub(crate) fn insert_into(&mut self, link: &mut L, item: Item) -> Result<InsertOutcome<Item, L>, Status>
    where
        Coord: Copy + PartialOrd,
    {
        let is_leaf = L::get(link).is_leaf;
        let found = Self::search(&L::get(link).items, &self.cmp, &item);

        if let Ok(i) = found {
            let node = L::make_mut(link);
            node.items[i] = item.clone();
            return Ok(InsertOutcome::Replaced(item));
        }

        let index = found.unwrap_err();

        if is_leaf {
            let node = L::make_mut(link);
            node.reserve_one().map_err(|s| s)?;
            node.items.insert(index, item);
            return self.maybe_split(link);
        }

        let child_index = index;
        let node = L::make_mut(link);
        let outcome = self.insert_into(&mut node.children[child_index], item)?;
        match outcome {
            InsertOutcome::Inserted => {
                self.fix_child_annotations(node, child_index);
                Ok(InsertOutcome::Inserted)
            }
            InsertOutcome::Replaced(old) => {
                // A replace changes the item at `child_index`'s subtree in
                // place; the count is unaffected, but on a spatial tree the
                // replaced item's rectangle can differ from the one it
                // overwrote, so the owning child's stored MBR must be
                // recomputed here too, not just on `Inserted`/`Split`.
                self.fix_child_annotations(node, child_index);
                Ok(InsertOutcome::Replaced(old))
            }
            InsertOutcome::Split { separator, right } => {
                node.reserve_one().map_err(|s| s)?;
                node.items.insert(child_index, separator);
                node.children.insert(child_index + 1, right);
                if let Some(counts) = node.counts.as_mut() {
                    counts.insert(child_index + 1, 0);
                }
                if let Some(rects) = node.rects.as_mut() {
                    let placeholder = rects[child_index];
                    rects.insert(child_index + 1, placeholder);
                }
                self.fix_child_annotations(node, child_index);
                self.fix_child_annotations(node, child_index + 1);
                self.maybe_split(link)
            }
        }
    }

    /// Split `link`'s node if it overflowed, guarding the new sibling's
    /// allocation with [`oom::checkpoint`] before `algebra::split_full`
    /// moves any items out of the original node, so a checkpoint failure
    /// here is fully reversible: `link` is untouched and the caller's
    /// already-applied insert simply reports `Status::OutOfMemory`.
    pub(crate) fn maybe_split(&self, link: &mut L) -> Result<InsertOutcome<Item, L>, Status>
    where
        Coord: Copy + PartialOrd,
    {
        if L::get(link).items.len() <= Self::MAX_ITEMS {
            return Ok(InsertOutcome::Inserted);
        }
        oom::checkpoint()?;
        let node = L::make_mut(link);
        let (separator, right) = algebra::split_full(node, Cnt::ENABLED, Spat::ENABLED);
        Ok(InsertOutcome::Split {
            separator,
            right: L::new(right),
        })
    }

    /// Insert `item` at absolute position `index` regardless of where its
    /// key would ordinarily sort to, rejecting the insert if doing so would
    /// violate the tree's order (`index` must fall strictly between its
    /// new neighbors). Grounded on bgen.h's `insert1` with act
    /// `BGEN_INSAT`: the caller is trusted to place the item at a specific
    /// slot, but the routine still checks it against its immediate
    /// neighbors rather than skipping the order check entirely.
    ///
    /// Unlike bgen.h, this always descends to a leaf rather than taking a
    /// branch-level shortcut when `index` lands exactly on a separator's
    /// position; see DESIGN.md. Only meaningful on a `Counted` tree (the
    /// subtree counts are what make locating `index` possible in less than
    /// linear time); exposed publicly as `insert_at` from `positional.rs`,
    /// specialized to the `Counted` marker (named `_entry` here to avoid
    /// colliding with that public inherent method on the same type).
    #[tracing::instrument(skip(self, item))]
    pub(crate) fn insert_at_entry(&mut self, index: usize, item: Item) -> Status
    where
        Coord: Copy + PartialOrd,
    {
        if index > self.len {
            return Status::NotFound;
        }
        let Some(root_link) = self.root.as_mut() else {
            if index != 0 {
                return Status::NotFound;
            }
            if let Err(status) = oom::checkpoint() {
                return status;
            }
            let mut leaf = Node::new_leaf(Cnt::ENABLED, Spat::ENABLED);
            leaf.items.push(item);
            self.root = Some(L::new(leaf));
            self.len = 1;
            return Status::Inserted;
        };
        let outcome = self.insert_at_into(root_link, index, item);
        self.finish_insert(outcome)
    }

    pub(crate) fn insert_at_into(&mut self, link: &mut L, mut index: usize, item: Item) -> Result<InsertOutcome<Item, L>, Status>
    where
        Coord: Copy + PartialOrd,
    {
        let is_leaf = L::get(link).is_leaf;
        if is_leaf {
            let node_ref = L::get(link);
            if index > 0 && !self.cmp.less(&node_ref.items[index - 1], &item) {
                return Err(Status::OutOfOrder);
            }
            if index < node_ref.items.len() && !self.cmp.less(&item, &node_ref.items[index]) {
                return Err(Status::OutOfOrder);
            }
            let node = L::make_mut(link);
            node.reserve_one()?;
            node.items.insert(index, item);
            return self.maybe_split(link);
        }

        let node_ref = L::get(link);
        let mut child_index = node_ref.children.len() - 1;
        for c in 0..node_ref.children.len() - 1 {
            let count = node_ref.count_of(c);
            if index <= count {
                child_index = c;
                break;
            }
            index -= count + 1;
        }
        // `index` now addresses a position inside `child_index`'s subtree,
        // and the recursive call below only ever compares `item` against
        // items it finds while descending that subtree. When `index` lands
        // on the subtree's near edge, the item it's really adjacent to is
        // the separator on the *other* side of the leaf/branch boundary, so
        // check that crossing neighbor here before descending.
        if index == 0 && child_index > 0 && !self.cmp.less(&node_ref.items[child_index - 1], &item) {
            return Err(Status::OutOfOrder);
        }
        if index == node_ref.count_of(child_index)
            && child_index < node_ref.items.len()
            && !self.cmp.less(&item, &node_ref.items[child_index])
        {
            return Err(Status::OutOfOrder);
        }
        let node = L::make_mut(link);
        let outcome = self.insert_at_into(&mut node.children[child_index], index, item)?;
        match outcome {
            InsertOutcome::Inserted => {
                self.fix_child_annotations(node, child_index);
                Ok(InsertOutcome::Inserted)
            }
            InsertOutcome::Replaced(old) => {
                // `insert_at_into` never actually produces this itself (it
                // always inserts a fresh item at `index`, never overwrites
                // one), but the recursive call is shared with the general
                // `InsertOutcome` shape, so keep the same rectangle-fixup
                // discipline as `insert_into`'s equivalent arm rather than
                // relying on that invariant silently.
                self.fix_child_annotations(node, child_index);
                Ok(InsertOutcome::Replaced(old))
            }
            InsertOutcome::Split { separator, right } => {
                node.reserve_one()?;
                node.items.insert(child_index, separator);
                node.children.insert(child_index + 1, right);
                if let Some(counts) = node.counts.as_mut() {
                    counts.insert(child_index + 1, 0);
                }
                if let Some(rects) = node.rects.as_mut() {
                    let placeholder = rects[child_index];
                    rects.insert(child_index + 1, placeholder);
                }
                self.fix_child_annotations(node, child_index);
                self.fix_child_annotations(node, child_index + 1);
                self.maybe_split(link)
            }
        }
    }

    /// Replace the item at absolute position `index` with `item`, checked
    /// only against its immediate node-local neighbors. Grounded on
    /// bgen.h's `insert1` act `BGEN_REPAT`, which performs exactly this
    /// local-only check rather than a full neighbor lookup across node
    /// boundaries; that limitation is inherited here rather than
    /// introduced.
    #[tracing::instrument(skip(self, item))]
    pub(crate) fn replace_at_entry(&mut self, index: usize, item: Item) -> Status
    where
        Coord: Copy + PartialOrd,
    {
        if index >= self.len {
            return Status::NotFound;
        }
        let Some(root_link) = self.root.as_mut() else {
            return Status::NotFound;
        };
        match self.replace_at_into(root_link, index, item) {
            Ok(_old) => Status::Replaced,
            Err(status) => status,
        }
    }

    fn replace_at_into(&mut self, link: &mut L, mut index: usize, item: Item) -> Result<Item, Status>
    where
        Coord: Copy + PartialOrd,
    {
        let is_leaf = L::get(link).is_leaf;
        if is_leaf {
            let node_ref = L::get(link);
            if index > 0 && !self.cmp.less(&node_ref.items[index - 1], &item) {
                return Err(Status::OutOfOrder);
            }
            if index + 1 < node_ref.items.len() && !self.cmp.less(&item, &node_ref.items[index + 1]) {
                return Err(Status::OutOfOrder);
            }
            let node = L::make_mut(link);
            return Ok(std::mem::replace(&mut node.items[index], item));
        }

        let node_ref = L::get(link);
        let mut child_index = node_ref.children.len() - 1;
        for c in 0..node_ref.items.len() {
            let count = node_ref.count_of(c);
            if index < count {
                child_index = c;
                break;
            }
            if index == count {
                if c > 0 && !self.cmp.less(&node_ref.items[c - 1], &item) {
                    return Err(Status::OutOfOrder);
                }
                if c + 1 < node_ref.items.len() && !self.cmp.less(&item, &node_ref.items[c + 1]) {
                    return Err(Status::OutOfOrder);
                }
                let node = L::make_mut(link);
                return Ok(std::mem::replace(&mut node.items[c], item));
            }
            index -= count + 1;
            child_index = c + 1;
        }
        let node = L::make_mut(link);
        let old = self.replace_at_into(&mut node.children[child_index], index, item)?;
        self.fix_child_annotations(node, child_index);
        Ok(old)
    }

    /// Alias for [`Self::len`]: the number of items currently stored.
    /// Named separately since `index_of`/`get_at`/`insert_at` read more
    /// naturally alongside a `count` than a `len` when describing a
    /// positional collection.
    #[inline]
    pub fn count(&self) -> usize {
        self.len
    }

    #[tracing::instrument(skip(self, key))]
    pub fn delete(&mut self, key: &Item) -> Status
    where
        Coord: Copy + PartialOrd,
    {
        let Some(root_link) = self.root.as_mut() else {
            return Status::NotFound;
        };
        let outcome = self.delete_from(root_link, key);
        self.finish_delete(outcome)
    }

    /// Common tail of every delete-shaped operation (`delete`, `delete_at`):
    /// shrink the tree's length and collapse the root if it underflowed to
    /// zero items, either adopting its sole child (branch) or becoming
    /// empty (leaf).
    fn finish_delete(&mut self, outcome: DeleteOutcome<Item>) -> Status
    where
        Coord: Copy + PartialOrd,
    {
        match outcome {
            DeleteOutcome::NotFound => Status::NotFound,
            DeleteOutcome::Deleted(_) | DeleteOutcome::Underflowed(_) => {
                self.len -= 1;
                let root = self.root.as_ref().unwrap();
                let root_node = L::get(root);
                if !root_node.is_leaf && root_node.items.is_empty() {
                    let only_child = L::make_mut(self.root.as_mut().unwrap()).children.pop().unwrap();
                    self.root = Some(only_child);
                } else if root_node.items.is_empty() {
                    self.root = None;
                }
                Status::Deleted
            }
        }
    }

    pub(crate) fn delete_from(&mut self, link: &mut L, key: &Item) -> DeleteOutcome<Item>
    where
        Coord: Copy + PartialOrd,
    {
        let is_leaf = L::get(link).is_leaf;
        let found = Self::search(&L::get(link).items, &self.cmp, key);

        if is_leaf {
            return match found {
                Ok(i) => {
                    let node = L::make_mut(link);
                    let removed = node.items.remove(i);
                    if node.items.len() < Self::MIN_ITEMS {
                        DeleteOutcome::Underflowed(removed)
                    } else {
                        DeleteOutcome::Deleted(removed)
                    }
                }
                Err(_) => DeleteOutcome::NotFound,
            };
        }

        let child_index = match found {
            Ok(i) => return self.delete_branch_slot(link, i),
            Err(i) => i,
        };

        let node = L::make_mut(link);
        let outcome = self.delete_from(&mut node.children[child_index], key);
        self.settle_child(link, child_index, outcome)
    }

    /// Delete the item held directly in a branch node's own slot `i`, by
    /// swapping it with the predecessor in its left child's subtree and
    /// recursing to delete the predecessor there instead. Mirrors bgen.h's
    /// handling of a branch-node match; shared by key-based and
    /// positional deletion, since both can land exactly on a separator.
    pub(crate) fn delete_branch_slot(&mut self, link: &mut L, i: usize) -> DeleteOutcome<Item>
    where
        Coord: Copy + PartialOrd,
    {
        let node = L::make_mut(link);
        let pred = L::get(&node.children[i]).rightmost_item().clone();
        let key_for_child = pred.clone();
        node.items[i] = pred;
        let outcome = self.delete_from(&mut node.children[i], &key_for_child);
        self.settle_child(link, i, outcome)
    }

    /// After recursing into `child_index`, fix its parent's annotation and,
    /// if the child underflowed, rebalance or merge it with a sibling.
    /// Mirrors the tail of bgen.h's `_delete1`.
    pub(crate) fn settle_child(&mut self, link: &mut L, child_index: usize, outcome: DeleteOutcome<Item>) -> DeleteOutcome<Item>
    where
        Coord: Copy + PartialOrd,
    {
        match outcome {
            DeleteOutcome::NotFound => DeleteOutcome::NotFound,
            DeleteOutcome::Deleted(removed) => {
                let node = L::make_mut(link);
                self.fix_child_annotations(node, child_index);
                DeleteOutcome::Deleted(removed)
            }
            DeleteOutcome::Underflowed(removed) => {
                let node = L::make_mut(link);
                let sibling_index = if child_index == 0 { 1 } else { child_index - 1 };
                let (left_index, right_index) = if sibling_index < child_index { (sibling_index, child_index) } else { (child_index, sibling_index) };

                let separator_index = left_index;
                let mut separator = node.items[separator_index].clone();

                let (left_slice, right_slice) = node.children.split_at_mut(left_index + 1);
                let left_child = L::make_mut(&mut left_slice[left_index]);
                let right_child = L::make_mut(&mut right_slice[0]);

                match algebra::rebalance(&mut separator, left_child, right_child, Self::MIN_ITEMS) {
                    Rebalanced::Rotated => {
                        node.items[separator_index] = separator;
                        self.fix_child_annotations(node, left_index);
                        self.fix_child_annotations(node, right_index);
                    }
                    Rebalanced::Merged => {
                        let right_owned = node.children.remove(right_index);
                        let right_owned = match L::try_unwrap(right_owned) {
                            Ok(owned) => owned,
                            Err(shared) => L::get(&shared).clone(),
                        };
                        node.items.remove(separator_index);
                        let left_child = L::make_mut(&mut node.children[left_index]);
                        algebra::join(left_child, separator, right_owned);
                        if let Some(counts) = node.counts.as_mut() {
                            counts.remove(right_index);
                        }
                        if let Some(rects) = node.rects.as_mut() {
                            rects.remove(right_index);
                        }
                        self.fix_child_annotations(node, left_index);
                    }
                }

                if node.items.len() < Self::MIN_ITEMS {
                    DeleteOutcome::Underflowed(removed)
                } else {
                    DeleteOutcome::Deleted(removed)
                }
            }
        }
    }

    /// Delete the item at absolute position `index`. Grounded on bgen.h's
    /// `_delete1` walked via child subtree counts instead of key
    /// comparisons; shares `delete_branch_slot`/`settle_child` with
    /// key-based deletion once a node to operate on has been located.
    #[tracing::instrument(skip(self))]
    pub(crate) fn delete_at_entry(&mut self, index: usize) -> Status
    where
        Coord: Copy + PartialOrd,
    {
        if index >= self.len {
            return Status::NotFound;
        }
        let Some(root_link) = self.root.as_mut() else {
            return Status::NotFound;
        };
        let outcome = self.delete_at_from(root_link, index);
        self.finish_delete(outcome)
    }

    pub(crate) fn delete_at_from(&mut self, link: &mut L, mut index: usize) -> DeleteOutcome<Item>
    where
        Coord: Copy + PartialOrd,
    {
        let is_leaf = L::get(link).is_leaf;
        if is_leaf {
            let node = L::make_mut(link);
            let removed = node.items.remove(index);
            return if node.items.len() < Self::MIN_ITEMS {
                DeleteOutcome::Underflowed(removed)
            } else {
                DeleteOutcome::Deleted(removed)
            };
        }

        let node_ref = L::get(link);
        let mut child_index = node_ref.children.len() - 1;
        for c in 0..node_ref.items.len() {
            let count = node_ref.count_of(c);
            if index < count {
                child_index = c;
                break;
            }
            index -= count;
            if index == 0 {
                return self.delete_branch_slot(link, c);
            }
            index -= 1;
            child_index = c + 1;
        }

        let node = L::make_mut(link);
        let outcome = self.delete_at_from(&mut node.children[child_index], index);
        self.settle_child(link, child_index, outcome)
    }

    /// Push onto the ordered-maximum end. Mirrors bgen.h's `BGEN_PUSHBACK`
    /// act of `insert1`: a cheap local check against the current last item
    /// substitutes for a full search, and any violation is reported rather
    /// than silently falling back to an ordinary insert.
    #[tracing::instrument(skip(self, item))]
    pub fn push_back(&mut self, item: Item) -> Status
    where
        Coord: Copy + PartialOrd,
    {
        if let Some(last) = self.back() {
            if !self.cmp.less(last, &item) {
                return Status::OutOfOrder;
            }
        }
        self.insert(item)
    }

    /// Push onto the ordered-minimum end. Mirrors bgen.h's `BGEN_PUSHFRONT`.
    #[tracing::instrument(skip(self, item))]
    pub fn push_front(&mut self, item: Item) -> Status
    where
        Coord: Copy + PartialOrd,
    {
        if let Some(first) = self.front() {
            if !self.cmp.less(&item, first) {
                return Status::OutOfOrder;
            }
        }
        self.insert(item)
    }

    pub fn pop_front(&mut self) -> Option<Item>
    where
        Coord: Copy + PartialOrd,
    {
        let key = self.front()?.clone();
        match self.delete(&key) {
            Status::Deleted => Some(key),
            _ => None,
        }
    }

    pub fn pop_back(&mut self) -> Option<Item>
    where
        Coord: Copy + PartialOrd,
    {
        let key = self.back()?.clone();
        match self.delete(&key) {
            Status::Deleted => Some(key),
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.root = None;
        self.len = 0;
    }

    /// Deep-copy the whole tree: every node is freshly allocated and
    /// shares nothing with `self`, unlike [`Clone::clone`] (this type's
    /// own `Clone` impl), which is the O(1) copy-on-write sharing clone
    /// from spec.md §4.7. Mirrors bgen.h's `_copy(.., deep=true, ..)`,
    /// used to materialize a standalone snapshot independent of the COW
    /// substrate. Fallible the same way insert/delete are: a checkpoint
    /// guards every node allocation so a mid-copy `Status::OutOfMemory`
    /// never leaves the caller holding a half-built tree.
    #[tracing::instrument(skip(self))]
    pub fn copy(&self) -> Result<Self, Status>
    where
        Cmp: Clone,
        Cnt: Clone,
        Spat: Clone,
    {
        let root = match self.root.as_ref() {
            Some(link) => Some(Self::deep_copy_link(link)?),
            None => None,
        };
        Ok(BTree {
            root,
            len: self.len,
            cmp: self.cmp.clone(),
            cnt: self.cnt.clone(),
            spat: self.spat.clone(),
            _coord: CoordMarker(PhantomData),
            _item: PhantomData,
        })
    }

    fn deep_copy_link(link: &L) -> Result<L, Status> {
        oom::checkpoint()?;
        let node = L::get(link);
        let mut new_node = Node {
            items: node.items.clone(),
            is_leaf: node.is_leaf,
            height: node.height,
            children: Default::default(),
            counts: node.counts.clone(),
            rects: node.rects.clone(),
        };
        if !node.is_leaf {
            let mut children = smallvec::SmallVec::with_capacity(node.children.len());
            for child in node.children.iter() {
                children.push(Self::deep_copy_link(child)?);
            }
            new_node.children = children;
        }
        Ok(L::new(new_node))
    }

    pub fn sane(&self) -> bool
    where
        Coord: Copy + PartialOrd + PartialEq,
    {
        crate::sane::check(self)
    }

    pub(crate) fn root_link(&self) -> Option<&L> {
        self.root.as_ref()
    }

    pub(crate) fn comparator(&self) -> &Cmp {
        &self.cmp
    }

    pub(crate) fn spatial_capability(&self) -> &Spat {
        &self.spat
    }

    pub(crate) const fn max_items() -> usize {
        Self::MAX_ITEMS
    }

    /// The clamped fanout this tree type was instantiated with (`[4,
    /// 4096]`, rounded down to even). Introspection of the
    /// type-instantiation knobs from spec.md §6, exposed the way bgen.h
    /// exposes `BGEN_FANOUTUSED` as a queryable constant.
    pub const fn fanout(&self) -> usize {
        clamp_fanout(FANOUT)
    }

    /// Maximum items a single node of this tree may hold (`fanout - 1`).
    pub const fn max_items_per_node(&self) -> usize {
        Self::MAX_ITEMS
    }

    /// Minimum items a non-root node of this tree may hold
    /// (`max_items_per_node() / 2`).
    pub const fn min_items_per_node(&self) -> usize {
        Self::MIN_ITEMS
    }

    /// Whether this tree instantiation tracks per-child subtree counts
    /// (`get_at`/`index_of`/`insert_at`/`delete_at` availability).
    pub const fn is_counted(&self) -> bool {
        Cnt::ENABLED
    }

    /// Whether this tree instantiation tracks per-child bounding
    /// rectangles (`intersects`/`nearby`/`rect` availability).
    pub const fn is_spatial(&self) -> bool {
        Spat::ENABLED
    }

    pub(crate) const fn min_items() -> usize {
        Self::MIN_ITEMS
    }
}

impl<Item, Cmp, Cnt, Spat, Coord, const D: usize, L, const FANOUT: usize, const BSEARCH: bool, const PATH_HINT: bool> Clone
    for BTree<Item, Cmp, Cnt, Spat, Coord, D, L, FANOUT, BSEARCH, PATH_HINT>
where
    Cmp: Clone,
    Cnt: Clone,
    Spat: Clone,
    L: Clone,
{
    /// O(1): the root pointer is duplicated and both trees share its
    /// subtree until one of them mutates, at which point [`Link::make_mut`]
    /// transparently clones only the path being written. This is exactly
    /// spec.md §4.7's copy-on-write contract.
    fn clone(&self) -> Self {
        BTree {
            root: self.root.clone(),
            len: self.len,
            cmp: self.cmp.clone(),
            cnt: self.cnt.clone(),
            spat: self.spat.clone(),
            _coord: CoordMarker(PhantomData),
            _item: PhantomData,
        }
    }
}
