//! Axis-aligned bounding rectangles for the spatial capability.
//!
//! Grounded on bgen.h's `BGEN_RECT` (`min[BGEN_DIMS]`, `max[BGEN_DIMS]`) and
//! its `_rect_intersects`/`_rect_join`/`_rect_calc` helpers. `D` is carried
//! as a const generic instead of a preprocessor constant, so a tree's
//! dimensionality is part of its type rather than a global `#define`.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<Coord, const D: usize> {
    pub min: [Coord; D],
    pub max: [Coord; D],
}

impl<Coord: Copy + PartialOrd, const D: usize> Rect<Coord, D> {
    pub fn intersects(&self, other: &Rect<Coord, D>) -> bool {
        for i in 0..D {
            if self.max[i] < other.min[i] || other.max[i] < self.min[i] {
                return false;
            }
        }
        true
    }

    pub fn eq_exact(&self, other: &Rect<Coord, D>) -> bool
    where
        Coord: PartialEq,
    {
        self.min == other.min && self.max == other.max
    }
}

impl<Coord: Copy + PartialOrd, const D: usize> Rect<Coord, D> {
    /// Union of two rectangles (mirrors `_rect_join`).
    pub fn join(&self, other: &Rect<Coord, D>) -> Rect<Coord, D> {
        let mut min = self.min;
        let mut max = self.max;
        for i in 0..D {
            if other.min[i] < min[i] {
                min[i] = other.min[i];
            }
            if other.max[i] > max[i] {
                max[i] = other.max[i];
            }
        }
        Rect { min, max }
    }
}

/// Total ordering helper for coordinate types that are only `PartialOrd`
/// (floats). Used exclusively by the kNN priority queue, which needs a
/// strict order over distances; NaN distances are a contract violation of
/// the user-supplied `Distance` implementation and are treated as
/// "greater than everything" rather than panicking mid-search.
pub fn total_cmp<T: PartialOrd>(a: &T, b: &T) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Greater)
}
