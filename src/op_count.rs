//! Periodic invariant checking for property tests.
//!
//! Calling `sane()` after every single mutation in a long fuzz run is
//! correct but slow enough to change what a run can cover in a given
//! amount of time; calling it every `SANE_CHECK_PERIOD` operations
//! instead still catches a broken invariant close to its cause while
//! keeping the run cheap the rest of the time.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

static OP_COUNT: AtomicUsize = AtomicUsize::new(0);

const SANE_CHECK_PERIOD: usize = 64;

/// The teacher's own `op_count.rs` wires up a `tracing_subscriber`
/// pretty-printer the first time its operation counter hits a threshold;
/// a `Lazy` makes that same one-shot wiring safe to reach from many
/// independent test functions instead of depending on a magic count.
static TRACE_INIT: Lazy<()> = Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::ENTER)
        .without_time()
        .with_test_writer()
        .try_init();
});

/// Call after every mutating tree operation in a test; returns `true` on
/// the operations where the caller should also run `tree.sane()`.
pub fn count_op() -> bool {
    Lazy::force(&TRACE_INIT);
    let new_count = OP_COUNT.fetch_add(1, Ordering::Relaxed) + 1;
    trace!(op_count = new_count);
    new_count % SANE_CHECK_PERIOD == 0
}

pub fn reset() {
    OP_COUNT.store(0, Ordering::Relaxed);
}
