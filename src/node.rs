//! Node layout: the packed item array plus, for branches, child pointers
//! and optional per-child augmentations. Mirrors `BGEN_NODE` in bgen.h.

use crate::link::Link;
use crate::oom::try_reserve;
use crate::rect::Rect;
use crate::status::Status;
use smallvec::SmallVec;

/// Inline capacity for the small-vector item/child storage. Nodes at the
/// default fanout (16) fit entirely inline; larger fanouts spill to the
/// heap transparently, the same trade-off `smallvec` is used for
/// throughout the teacher crate.
pub const INLINE_ITEMS: usize = 15;
pub const INLINE_CHILDREN: usize = 16;

pub struct Node<Item, Coord, const D: usize, L> {
    pub(crate) items: SmallVec<[Item; INLINE_ITEMS]>,
    pub(crate) is_leaf: bool,
    pub(crate) height: u32,
    pub(crate) children: SmallVec<[L; INLINE_CHILDREN]>,
    pub(crate) counts: Option<SmallVec<[usize; INLINE_CHILDREN]>>,
    pub(crate) rects: Option<SmallVec<[Rect<Coord, D>; INLINE_CHILDREN]>>,
}

impl<Item: Clone, Coord: Clone, const D: usize, L: Clone> Clone for Node<Item, Coord, D, L> {
    /// Shallow copy: items are deep-copied (the `copy` hook, realized as
    /// `Clone`), children are duplicated as pointers only, which bumps
    /// their refcount exactly as `_node_copy(.., deep=false, ..)` does.
    fn clone(&self) -> Self {
        Node {
            items: self.items.clone(),
            is_leaf: self.is_leaf,
            height: self.height,
            children: self.children.clone(),
            counts: self.counts.clone(),
            rects: self.rects.clone(),
        }
    }
}

impl<Item, Coord, const D: usize, L> Node<Item, Coord, D, L> {
    pub fn new_leaf(counted: bool, spatial: bool) -> Self {
        Node {
            items: SmallVec::new(),
            is_leaf: true,
            height: 1,
            children: SmallVec::new(),
            counts: counted.then(SmallVec::new),
            rects: spatial.then(SmallVec::new),
        }
    }

    pub fn new_branch(height: u32, counted: bool, spatial: bool) -> Self {
        Node {
            items: SmallVec::new(),
            is_leaf: false,
            height,
            children: SmallVec::new(),
            counts: counted.then(SmallVec::new),
            rects: spatial.then(SmallVec::new),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn count_of(&self, child: usize) -> usize {
        self.counts.as_ref().map(|c| c[child]).unwrap_or(0)
    }

    pub fn set_count(&mut self, child: usize, value: usize) {
        if let Some(counts) = self.counts.as_mut() {
            counts[child] = value;
        }
    }

    pub fn rect_of(&self, child: usize) -> Option<&Rect<Coord, D>> {
        self.rects.as_ref().map(|r| &r[child])
    }

    pub fn set_rect(&mut self, child: usize, value: Rect<Coord, D>) {
        if let Some(rects) = self.rects.as_mut() {
            rects[child] = value;
        }
    }

    /// Reserve room for one more item (and, for branches, one more child
    /// slot) before a growth; the one fallible-allocation seam every
    /// mutation path that can grow a node funnels through.
    pub fn reserve_one(&mut self) -> Result<(), Status>
    where
        L: Clone,
        Coord: Clone,
        Item: Clone,
    {
        try_reserve(&mut self.items, 1)?;
        if !self.is_leaf {
            try_reserve(&mut self.children, 1)?;
            if let Some(counts) = self.counts.as_mut() {
                try_reserve(counts, 1)?;
            }
            if let Some(rects) = self.rects.as_mut() {
                try_reserve(rects, 1)?;
            }
        }
        Ok(())
    }
}

impl<Item, Coord, const D: usize, L> Node<Item, Coord, D, L>
where
    L: Link<Node<Item, Coord, D, L>>,
{
    /// The deepest leftmost item, descending the left spine. `None` only
    /// for an empty leaf, which cannot occur in a non-empty tree.
    pub fn leftmost_item(&self) -> &Item {
        let mut node = self;
        loop {
            if node.is_leaf {
                return &node.items[0];
            }
            node = L::get(&node.children[0]);
        }
    }

    pub fn rightmost_item(&self) -> &Item {
        let mut node = self;
        loop {
            if node.is_leaf {
                return &node.items[node.len() - 1];
            }
            node = L::get(&node.children[node.len()]);
        }
    }
}
