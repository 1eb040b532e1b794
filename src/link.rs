//! Reference-counted node pointer abstraction.
//!
//! bgen.h keeps a manual `rc` field on every node and a hand-rolled
//! `_cow()` routine: if `rc_load(&node->rc) > 0` the node is shared, so it
//! is deep-copied (items via the item-copy hook, children by incrementing
//! their own refcounts) before any in-place mutation. Rust already has this
//! exact primitive built in: `Rc::make_mut`/`Arc::make_mut` clone-on-write
//! precisely when `strong_count() > 1`. `Link` is a thin seam over the two
//! so the `atomic_rc` flag becomes a choice of concrete type (`Rc` for a
//! single-threaded tree, `Arc` to let independent clones live on separate
//! threads) rather than an `#ifdef`.

use crate::node::Node;
use std::rc::Rc;
use std::sync::Arc;

/// A shared, reference-counted, clone-on-write pointer to `T`.
///
/// Implemented by [`RcLink`] (non-atomic refcount, `atomic_rc = false`) and
/// [`ArcLink`] (atomic refcount, `atomic_rc = true`), each a thin newtype
/// around `Rc<Node<..>>`/`Arc<Node<..>>` respectively.
pub trait Link<T>: Clone {
    fn new(value: T) -> Self;

    /// True when this node is referenced by more than one root path, i.e.
    /// it must be treated as frozen (`BGEN_SYM(shared)`).
    fn is_shared(this: &Self) -> bool;

    /// Ensure exclusive ownership of the pointee, cloning it first if it
    /// is currently shared. This *is* `cow()` from spec.md §4.7.
    fn make_mut(this: &mut Self) -> &mut T
    where
        T: Clone;

    fn get(this: &Self) -> &T;

    /// Recover the owned value if this is the sole reference; otherwise
    /// hand the pointer back unchanged. Used by `clear()` to avoid an
    /// unnecessary deep clone when a subtree is exclusively owned.
    fn try_unwrap(this: Self) -> Result<T, Self>;
}

/// `Rc`-backed node pointer, named so `Node<Item, Coord, D, L>`'s
/// recursive `children: SmallVec<[L; _]>` field has a concrete, finite
/// type to close over (`Rc<Node<.., Rc<Node<..>>>>` would otherwise be an
/// infinite expansion; going through this newtype gives the compiler a
/// single indirection per level, same trick `Box<List>`-style linked
/// lists rely on).
pub struct RcLink<Item, Coord, const D: usize>(pub Rc<Node<Item, Coord, D, RcLink<Item, Coord, D>>>);

impl<Item, Coord, const D: usize> Clone for RcLink<Item, Coord, D> {
    fn clone(&self) -> Self {
        RcLink(self.0.clone())
    }
}

impl<Item, Coord, const D: usize> Link<Node<Item, Coord, D, RcLink<Item, Coord, D>>> for RcLink<Item, Coord, D> {
    fn new(value: Node<Item, Coord, D, RcLink<Item, Coord, D>>) -> Self {
        RcLink(Rc::new(value))
    }

    fn is_shared(this: &Self) -> bool {
        Rc::strong_count(&this.0) > 1
    }

    fn make_mut(this: &mut Self) -> &mut Node<Item, Coord, D, RcLink<Item, Coord, D>>
    where
        Node<Item, Coord, D, RcLink<Item, Coord, D>>: Clone,
    {
        Rc::make_mut(&mut this.0)
    }

    fn get(this: &Self) -> &Node<Item, Coord, D, RcLink<Item, Coord, D>> {
        &this.0
    }

    fn try_unwrap(this: Self) -> Result<Node<Item, Coord, D, RcLink<Item, Coord, D>>, Self> {
        Rc::try_unwrap(this.0).map_err(RcLink)
    }
}

/// `Arc`-backed counterpart of [`RcLink`], selected for the `atomic_rc`
/// capability so independently cloned trees can live on separate threads.
pub struct ArcLink<Item, Coord, const D: usize>(pub Arc<Node<Item, Coord, D, ArcLink<Item, Coord, D>>>);

impl<Item, Coord, const D: usize> Clone for ArcLink<Item, Coord, D> {
    fn clone(&self) -> Self {
        ArcLink(self.0.clone())
    }
}

impl<Item, Coord, const D: usize> Link<Node<Item, Coord, D, ArcLink<Item, Coord, D>>> for ArcLink<Item, Coord, D> {
    fn new(value: Node<Item, Coord, D, ArcLink<Item, Coord, D>>) -> Self {
        ArcLink(Arc::new(value))
    }

    fn is_shared(this: &Self) -> bool {
        Arc::strong_count(&this.0) > 1
    }

    fn make_mut(this: &mut Self) -> &mut Node<Item, Coord, D, ArcLink<Item, Coord, D>>
    where
        Node<Item, Coord, D, ArcLink<Item, Coord, D>>: Clone,
    {
        Arc::make_mut(&mut this.0)
    }

    fn get(this: &Self) -> &Node<Item, Coord, D, ArcLink<Item, Coord, D>> {
        &this.0
    }

    fn try_unwrap(this: Self) -> Result<Node<Item, Coord, D, ArcLink<Item, Coord, D>>, Self> {
        Arc::try_unwrap(this.0).map_err(ArcLink)
    }
}
