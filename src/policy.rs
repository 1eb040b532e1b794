//! Compile-time capability markers.
//!
//! bgen.h selects `BGEN_COUNTED`/`BGEN_SPATIAL`/`BGEN_NOORDER` with
//! preprocessor `#ifdef`s at the single translation-unit-per-tree-type
//! granularity it reinstantiates its header at. spec.md §9 calls this out
//! directly: "mutually exclusive flag combinations become distinct generic
//! instantiations or feature-gated associated items" — so here each
//! capability is a marker type (zero-sized, or wrapping the one piece of
//! user data it needs), and the operations that require it (positional ops
//! for `Counted`, spatial ops for `Spatial<R>`) live in an `impl` block
//! specialized to that concrete marker. Calling `get_at` on a tree
//! instantiated with `Uncounted` is a compile error, not a runtime
//! `Status::Unsupported` — a stronger guarantee than bgen.h's C API offers.

use crate::rect::Rect;
use crate::traits::Rectangle;
use std::marker::PhantomData;

/// Per-child subtree item counts are tracked, enabling O(log n)
/// `index_of`/`get_at` (rank/select).
#[derive(Debug, Clone, Copy, Default)]
pub struct Counted;

/// No rank/select augmentation; `BTree` carries no `counts` storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uncounted;

pub trait CountCapability: Clone + Default {
    const ENABLED: bool;
}

impl CountCapability for Counted {
    const ENABLED: bool = true;
}

impl CountCapability for Uncounted {
    const ENABLED: bool = false;
}

/// Per-child minimum bounding rectangles are tracked, enabling
/// `intersects`/`nearby`. Wraps the user's `Rectangle<Item, Coord, D>`
/// projection, the one external collaborator this capability needs.
#[derive(Debug, Clone, Copy)]
pub struct Spatial<R>(pub R);

/// No spatial augmentation; `BTree` carries no `rects` storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpatial;

pub trait SpatialCapability<Item, Coord, const D: usize>: Clone {
    const ENABLED: bool;

    /// `Some(rect)` when spatial, `None` (and never called on a hot path)
    /// when not.
    fn try_rect(&self, item: &Item) -> Option<Rect<Coord, D>>;
}

impl<Item, Coord, const D: usize> SpatialCapability<Item, Coord, D> for NoSpatial {
    const ENABLED: bool = false;

    fn try_rect(&self, _item: &Item) -> Option<Rect<Coord, D>> {
        None
    }
}

impl<Item, Coord, const D: usize, R> SpatialCapability<Item, Coord, D> for Spatial<R>
where
    R: Rectangle<Item, Coord, D> + Clone,
{
    const ENABLED: bool = true;

    fn try_rect(&self, item: &Item) -> Option<Rect<Coord, D>> {
        Some(self.0.rect(item))
    }
}

/// Phantom marker so `BTree` can name a coordinate/dimension pair even
/// when instantiated with `NoSpatial` (which otherwise carries none).
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordMarker<Coord>(pub PhantomData<Coord>);
