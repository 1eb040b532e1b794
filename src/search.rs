//! Item/child search within a single node.
//!
//! Grounded on bgen.h's `_search_linear`/`_search_bsearch` and the
//! path-hint-accelerated wrapper around them. All three return the same
//! shape of answer: the index of an exact match (`Ok`) or the index the
//! item would be inserted at to keep the node sorted (`Err`), matching
//! `[T]::binary_search`'s own convention so callers don't need a third
//! result type.

use crate::traits::Comparator;

/// One level's worth of hint: the index search landed on last time a
/// lookup passed through this depth, used to bias the next search toward
/// a likely-nearby starting point. Purely a speed optimization — a wrong
/// hint only costs a few extra comparisons, it never changes the result.
/// spec.md's design notes call out realizing bgen.h's thread-local hint
/// array as an explicit per-call scratch buffer instead of hidden global
/// state, so callers that want the speedup pass a `&mut [usize]` sized by
/// `util::max_height`.
pub type PathHint = [usize];

pub fn search_linear<Item, Cmp: Comparator<Item>>(items: &[Item], cmp: &Cmp, key: &Item) -> Result<usize, usize> {
    for (i, existing) in items.iter().enumerate() {
        if cmp.maybe_less_equal(key, existing) {
            return match cmp.compare(key, existing) {
                std::cmp::Ordering::Equal => Ok(i),
                std::cmp::Ordering::Less => Err(i),
                std::cmp::Ordering::Greater => continue,
            };
        }
    }
    Err(items.len())
}

pub fn search_bsearch<Item, Cmp: Comparator<Item>>(items: &[Item], cmp: &Cmp, key: &Item) -> Result<usize, usize> {
    items.binary_search_by(|existing| cmp.compare(existing, key))
}

#[inline]
pub fn search<Item, Cmp: Comparator<Item>, const BSEARCH: bool>(items: &[Item], cmp: &Cmp, key: &Item) -> Result<usize, usize> {
    if BSEARCH {
        search_bsearch(items, cmp, key)
    } else {
        search_linear(items, cmp, key)
    }
}

/// Search using a level's hint as the starting guess, falling back to a
/// full search over the remainder when the guess misses. Mirrors bgen.h's
/// behavior of trying `hint` first and only then degrading to a full
/// linear/binary pass; the hint is updated in place on every call so
/// repeated nearby lookups (the common case for ordered range scans)
/// converge to O(1) per level.
pub fn search_with_hint<Item, Cmp: Comparator<Item>, const BSEARCH: bool>(
    items: &[Item],
    cmp: &Cmp,
    key: &Item,
    hint: &mut usize,
) -> Result<usize, usize> {
    let len = items.len();
    if len == 0 {
        *hint = 0;
        return Err(0);
    }
    let guess = (*hint).min(len - 1);
    match cmp.compare(key, &items[guess]) {
        std::cmp::Ordering::Equal => {
            *hint = guess;
            return Ok(guess);
        }
        std::cmp::Ordering::Less => {
            let result = search::<Item, Cmp, BSEARCH>(&items[..guess], cmp, key);
            *hint = result.unwrap_or_else(|e| e);
            return result;
        }
        std::cmp::Ordering::Greater => {
            let result = search::<Item, Cmp, BSEARCH>(&items[guess + 1..], cmp, key).map(|i| i + guess + 1).map_err(|e| e + guess + 1);
            *hint = result.unwrap_or_else(|e| e);
            return result;
        }
    }
}
