//! External collaborators the engine is parameterized over.
//!
//! Per spec.md §1 these are explicitly out of scope for the core: the
//! ordering predicate, the item copy/drop hooks, the rectangle projection,
//! and the distance function. `copy`/`drop` map onto `Clone`/`Drop`
//! directly (see DESIGN.md); the rest are small traits below, each with a
//! free-function/closure blanket impl so a user can pass `|a, b| ...`
//! without declaring a type.

use crate::rect::Rect;
use std::cmp::Ordering;

/// Total order over items. Mirrors `BGEN_COMPARE`/`BGEN_LESS`.
pub trait Comparator<Item> {
    fn compare(&self, a: &Item, b: &Item) -> Ordering;

    /// Fast strict-less-than check. Has a default in terms of `compare`,
    /// but a dedicated implementation can skip work `compare` can't (this
    /// mirrors bgen.h deriving `compare` from `less` or vice versa,
    /// whichever the user supplied).
    fn less(&self, a: &Item, b: &Item) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// Optional fused filter used by the linear search fast path to
    /// reject items without a full three-way compare. Defaults to `true`
    /// (never rejects), matching bgen.h's behavior when
    /// `BGEN_MAYBELESSEQUAL` isn't supplied.
    fn maybe_less_equal(&self, _a: &Item, _b: &Item) -> bool {
        true
    }
}

impl<Item, F> Comparator<Item> for F
where
    F: Fn(&Item, &Item) -> Ordering,
{
    fn compare(&self, a: &Item, b: &Item) -> Ordering {
        self(a, b)
    }
}

/// Axis-aligned bounding box projection for an item, required when the
/// `spatial` capability is selected. `D` is the dimension count (1..=4096).
pub trait Rectangle<Item, Coord, const D: usize> {
    fn rect(&self, item: &Item) -> Rect<Coord, D>;
}

impl<Item, Coord, const D: usize, F> Rectangle<Item, Coord, D> for F
where
    F: Fn(&Item) -> Rect<Coord, D>,
{
    fn rect(&self, item: &Item) -> Rect<Coord, D> {
        self(item)
    }
}

/// Distance from a rectangle to a caller-supplied target, used to drive
/// the kNN priority-queue walk (`nearby`). Mirrors bgen.h's
/// `dist(min, max, target, udata)` callback.
pub trait Distance<Coord, const D: usize, Target> {
    type Dist: PartialOrd + Copy;

    fn distance(&self, rect: &Rect<Coord, D>, target: &Target) -> Self::Dist;
}

impl<Coord, const D: usize, Target, Dist, F> Distance<Coord, D, Target> for F
where
    F: Fn(&Rect<Coord, D>, &Target) -> Dist,
    Dist: PartialOrd + Copy,
{
    type Dist = Dist;

    fn distance(&self, rect: &Rect<Coord, D>, target: &Target) -> Dist {
        self(rect, target)
    }
}
