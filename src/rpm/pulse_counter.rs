use std::sync::atomic::{AtomicU32, Ordering};

/// Edge counter shared between the edge handler and the timer tick
///
/// `increment` and `take` are single atomic read-modify-write operations,
/// so an edge that lands while a tick is resetting the counter is counted
/// exactly once: either in this tick's total or in the next one.
#[derive(Debug, Default)]
pub struct PulseCounter {
    count: AtomicU32,
}

impl PulseCounter {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Record one edge
    pub fn increment(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    /// Read the edges counted so far and reset to zero in one step
    pub fn take(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }

    /// Current count without resetting
    pub fn peek(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }
}
