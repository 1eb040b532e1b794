//! Spatial queries available only on a `Spatial<R>` tree: rectangle
//! intersection scan and k-nearest-neighbor search.
//!
//! Grounded on bgen.h's `_intersects` recursive scan and its
//! `pqueue`/`ppush_item`/`ppush_node`/`ppop` priority-queue machinery for
//! `nearby`. The `impl` block is specialized to the concrete `Spatial<R>`
//! marker so these methods simply don't exist on a non-spatial tree.

use crate::link::Link;
use crate::node::Node;
use crate::policy::Spatial;
use crate::rect::{total_cmp, Rect};
use crate::traits::{Comparator, Distance, Rectangle};
use crate::tree::BTree;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

impl<Item, Cmp, Cnt, Coord, const D: usize, L, R, const FANOUT: usize, const BSEARCH: bool, const PATH_HINT: bool>
    BTree<Item, Cmp, Cnt, Spatial<R>, Coord, D, L, FANOUT, BSEARCH, PATH_HINT>
where
    Cmp: Comparator<Item>,
    Cnt: crate::policy::CountCapability,
    R: Rectangle<Item, Coord, D> + Clone,
    Item: Clone,
    Coord: Copy + PartialOrd,
    L: Link<Node<Item, Coord, D, L>>,
{
    /// Visit every item whose rectangle intersects `query`, in no
    /// particular order. Mirrors bgen.h's `_intersects`: a node is
    /// descended into only when its own bounding rectangle overlaps the
    /// query, which is what prunes the search below a full O(n) scan.
    pub fn intersects<'a>(&'a self, query: &Rect<Coord, D>, mut visit: impl FnMut(&'a Item) -> bool) {
        let Some(root) = self.root_link() else { return };
        self.intersects_node(L::get(root), query, &mut visit);
    }

    fn intersects_node<'a>(&'a self, node: &'a Node<Item, Coord, D, L>, query: &Rect<Coord, D>, visit: &mut impl FnMut(&'a Item) -> bool) -> bool {
        for item in node.items.iter() {
            if let Some(rect) = self.spatial_capability().try_rect(item) {
                if rect.intersects(query) && !visit(item) {
                    return false;
                }
            }
        }
        if !node.is_leaf {
            for (i, child) in node.children.iter().enumerate() {
                let child_rect = match node.rect_of(i) {
                    Some(r) => *r,
                    None => continue,
                };
                if child_rect.intersects(query) && !self.intersects_node(L::get(child), query, visit) {
                    return false;
                }
            }
        }
        true
    }

    /// Visit up to `k` items nearest to `target` by the caller-supplied
    /// `Distance`, in ascending distance order. Mirrors bgen.h's `pqueue`
    /// best-first search: a binary heap holds both unexpanded nodes and
    /// found items ordered by distance, and the search terminates the
    /// instant `k` items have been popped, without visiting any subtree
    /// whose bounding rectangle is already farther than the k-th best
    /// item found so far.
    pub fn nearby<'a, Dist, Target>(&'a self, target: &Target, k: usize, dist: &Dist, mut visit: impl FnMut(&'a Item, Dist::Dist) -> bool)
    where
        Dist: Distance<Coord, D, Target>,
    {
        let Some(root) = self.root_link() else { return };
        let mut heap: BinaryHeap<PqEntry<'a, Item, Coord, D, L, Dist::Dist>> = BinaryHeap::new();
        let root_node = L::get(root);
        if let Some(rect) = self.whole_node_rect(root_node) {
            heap.push(PqEntry {
                distance: dist.distance(&rect, target),
                insertion_index: 0,
                payload: PqPayload::Node(root_node),
            });
        }
        let mut emitted = 0usize;
        let mut next_index = 1u64;

        while emitted < k {
            let Some(entry) = heap.pop() else { break };
            match entry.payload {
                PqPayload::Item(item) => {
                    if !visit(item, entry.distance) {
                        return;
                    }
                    emitted += 1;
                }
                PqPayload::Node(node) => {
                    for item in node.items.iter() {
                        if let Some(rect) = self.spatial_capability().try_rect(item) {
                            heap.push(PqEntry {
                                distance: dist.distance(&rect, target),
                                insertion_index: u64::MAX,
                                payload: PqPayload::Item(item),
                            });
                        }
                    }
                    if !node.is_leaf {
                        for (i, child) in node.children.iter().enumerate() {
                            if let Some(rect) = node.rect_of(i) {
                                heap.push(PqEntry {
                                    distance: dist.distance(rect, target),
                                    insertion_index: next_index,
                                    payload: PqPayload::Node(L::get(child)),
                                });
                                next_index += 1;
                            }
                        }
                    }
                }
            }
        }
    }

    /// The tight bounding rectangle over every item currently stored, or
    /// `None` for an empty tree. The root's own augmentation already holds
    /// this value; this just exposes it as a query in its own right rather
    /// than a side effect of `intersects`/`nearby`.
    pub fn rect(&self) -> Option<Rect<Coord, D>> {
        let root = self.root_link()?;
        self.whole_node_rect(L::get(root))
    }

    fn whole_node_rect(&self, node: &Node<Item, Coord, D, L>) -> Option<Rect<Coord, D>> {
        let mut acc: Option<Rect<Coord, D>> = None;
        for item in node.items.iter() {
            if let Some(r) = self.spatial_capability().try_rect(item) {
                acc = Some(acc.map_or(r, |a| a.join(&r)));
            }
        }
        if let Some(rects) = node.rects.as_ref() {
            for r in rects.iter() {
                acc = Some(acc.map_or(*r, |a| a.join(r)));
            }
        }
        acc
    }
}

enum PqPayload<'a, Item, Coord, const D: usize, L> {
    Item(&'a Item),
    Node(&'a Node<Item, Coord, D, L>),
}

struct PqEntry<'a, Item, Coord, const D: usize, L, Dist> {
    distance: Dist,
    /// Tie-break: `u64::MAX` for items, otherwise the order the node was
    /// pushed in. Lower `insertion_index` pops first on a distance tie, so
    /// a node (small index) always wins over an item (`u64::MAX`) at equal
    /// distance, matching bgen.h's `pcompare`; ties among nodes resolve by
    /// insertion order rather than by heap internals.
    insertion_index: u64,
    payload: PqPayload<'a, Item, Coord, D, L>,
}

impl<'a, Item, Coord, const D: usize, L, Dist: PartialOrd + Copy> PartialEq for PqEntry<'a, Item, Coord, D, L, Dist> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<'a, Item, Coord, const D: usize, L, Dist: PartialOrd + Copy> Eq for PqEntry<'a, Item, Coord, D, L, Dist> {}

impl<'a, Item, Coord, const D: usize, L, Dist: PartialOrd + Copy> PartialOrd for PqEntry<'a, Item, Coord, D, L, Dist> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a, Item, Coord, const D: usize, L, Dist: PartialOrd + Copy> Ord for PqEntry<'a, Item, Coord, D, L, Dist> {
    /// `BinaryHeap` is a max-heap; negate the natural "closer is better"
    /// order so the nearest entry pops first.
    fn cmp(&self, other: &Self) -> Ordering {
        total_cmp(&other.distance, &self.distance).then_with(|| self.insertion_index.cmp(&other.insertion_index).reverse())
    }
}
