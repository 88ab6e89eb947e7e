//! Process-wide accounting of units of work against a maximum
//!
//! A unit is reserved before it is submitted and marked complete once its
//! outcome reaches the sink. Reservations never exceed the maximum, so the
//! completed count cannot either, whatever order workers finish in.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug)]
pub struct CrawlBudget {
    max: u64,
    reserved: AtomicU64,
    completed: AtomicU64,
}

impl CrawlBudget {
    pub fn new(max: u64) -> Self {
        Self {
            max,
            reserved: AtomicU64::new(0),
            completed: AtomicU64::new(0),
        }
    }

    /// Claims one unit of the budget
    ///
    /// Returns false once `max` units have been claimed.
    pub fn try_reserve(&self) -> bool {
        self.reserved
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |reserved| {
                (reserved < self.max).then_some(reserved + 1)
            })
            .is_ok()
    }

    /// Gives back a reservation whose unit was never submitted
    pub fn release(&self) {
        // Saturating: a release without a reservation is ignored
        let _ = self
            .reserved
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |reserved| {
                reserved.checked_sub(1)
            });
    }

    /// Marks one reserved unit as finished and returns the new total
    pub fn complete(&self) -> u64 {
        self.completed.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// True once every unit of the budget has been reserved
    pub fn is_exhausted(&self) -> bool {
        self.reserved.load(Ordering::Acquire) >= self.max
    }

    pub fn max(&self) -> u64 {
        self.max
    }

    pub fn reserved(&self) -> u64 {
        self.reserved.load(Ordering::Acquire)
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }
}
