//! Status codes returned by every mutating and scanning operation.
//!
//! This is a direct, one-to-one port of the `BGEN_INSERTED..BGEN_UNSUPPORTED`
//! discriminants from bgen.h's status enum: the error taxonomy is closed and
//! small on purpose (resource / shape / capability / stop-signal), so a plain
//! enum is preferable to a boxed `dyn Error` or an ad hoc set of result types.

use num_enum::{IntoPrimitive, TryFromPrimitive};

#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum Status {
    Inserted = 1,
    Replaced = 2,
    Deleted = 3,
    Found = 4,
    NotFound = 5,
    OutOfOrder = 6,
    Finished = 7,
    Stopped = 8,
    /// Success discriminant for `BTree::copy`'s deep-copy operation. The
    /// Rust surface collapses this into `Result::Ok` the same way
    /// `Found`/`NotFound` collapse into `Option` on `get` — the variant
    /// still exists so the full bgen.h status domain stays represented.
    Copied = 9,
    OutOfMemory = 10,
    Unsupported = 11,
}

impl Status {
    pub fn is_ok(self) -> bool {
        !matches!(self, Status::OutOfMemory | Status::Unsupported)
    }
}
