//! An in-memory B-tree engine parameterized, at compile time, over which
//! capabilities it carries: ordered comparison, per-subtree item counts
//! (rank/select), per-subtree bounding rectangles (spatial queries), and
//! copy-on-write sharing. One node layout, one search routine, one set of
//! split/join/rebalance primitives serve a plain ordered map/set, a
//! positional vector/deque, and a spatial index alike — the capability a
//! given instantiation needs is selected through its generic parameters,
//! so unsupported operations (e.g. `get_at` on a tree with no counts) are
//! compile errors rather than runtime failures.

pub mod algebra;
pub mod cursor;
pub mod link;
pub mod node;
pub mod oom;
pub mod op_count;
pub mod policy;
pub mod positional;
pub mod rect;
pub mod sane;
pub mod search;
pub mod spatial;
pub mod status;
pub mod traits;
pub mod tree;
pub mod util;

#[cfg(test)]
mod tests;

pub use link::{ArcLink, RcLink};
pub use policy::{Counted, CoordMarker, NoSpatial, Spatial, Uncounted};
pub use rect::Rect;
pub use status::Status;
pub use traits::{Comparator, Distance, Rectangle};
pub use tree::BTree;

/// An ordered map keyed by whatever `Comparator` the `Cmp` closure/type
/// implements over `Item`, single-threaded (`Rc`-backed).
pub type Map<Item, Cmp> = BTree<Item, Cmp, Uncounted, NoSpatial, (), 1, RcLink<Item, (), 1>>;

/// An ordered set: identical shape to `Map`, since `bgen.h` itself draws
/// no distinction between the two beyond how the caller's comparator and
/// item type are defined.
pub type Set<Item, Cmp> = BTree<Item, Cmp, Uncounted, NoSpatial, (), 1, RcLink<Item, (), 1>>;

/// A positional (counted) ordered collection, supporting `get_at`,
/// `index_of`, and the double-ended deque operations in addition to
/// ordinary ordered lookup.
pub type Deque<Item, Cmp> = BTree<Item, Cmp, Counted, NoSpatial, (), 1, RcLink<Item, (), 1>>;

/// Alias for `Deque`: a positionally-indexable ordered sequence, the same
/// underlying capability selection as a deque, just used front-to-back.
pub type Vector<Item, Cmp> = Deque<Item, Cmp>;

/// A spatial index over `D`-dimensional rectangles with coordinate type
/// `Coord`, supporting `intersects`/`nearby` in addition to ordered
/// lookup by the caller's comparator.
pub type SpatialTree<Item, Cmp, Coord, const D: usize, R> = BTree<Item, Cmp, Uncounted, Spatial<R>, Coord, D, RcLink<Item, Coord, D>>;

/// Thread-safe variant of [`SpatialTree`], backed by `Arc` instead of
/// `Rc` so independently cloned snapshots can be handed to other threads.
pub type SpatialTreeShared<Item, Cmp, Coord, const D: usize, R> = BTree<Item, Cmp, Uncounted, Spatial<R>, Coord, D, ArcLink<Item, Coord, D>>;
