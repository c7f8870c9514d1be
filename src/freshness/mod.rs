//! Freshness Window.
//!
//! A claimed timestamp is fresh when its distance to the ambient clock does not
//! exceed the configured tolerance, in either direction. The same predicate is
//! consulted when an entry is accepted and when the sweep decides what to evict.
//!
//! # Components
//! - `clock`: Sources of "now" in epoch milliseconds.
//! - `TimeTester`: The window predicate bound to a clock.

pub mod clock;

use alloc::sync::Arc;
use core::fmt;

use crate::config::TimeUnit;
pub use clock::{Clock, ManualClock};
#[cfg(feature = "std")]
pub use clock::SystemClock;

/// Decides whether an epoch-millisecond timestamp lies inside the window.
///
/// `test(t) == |clock.now_millis() - t| <= max_error_millis`, evaluated against
/// the clock at call time.
#[derive(Clone)]
pub struct TimeTester {
    clock: Arc<dyn Clock>,
    max_error_millis: u64,
}

impl TimeTester {
    pub fn new(clock: Arc<dyn Clock>, max_time_error: u64, unit: TimeUnit) -> Self {
        Self {
            clock,
            max_error_millis: unit.to_millis(max_time_error),
        }
    }

    /// Builds a tester whose notion of "now" never moves.
    pub fn locked_at(now_millis: i64, max_time_error: u64, unit: TimeUnit) -> Self {
        Self::new(Arc::new(ManualClock::new(now_millis)), max_time_error, unit)
    }

    /// Builds a tester against the system clock.
    #[cfg(feature = "std")]
    pub fn system(max_time_error: u64, unit: TimeUnit) -> Self {
        Self::new(Arc::new(SystemClock), max_time_error, unit)
    }

    pub fn max_error_millis(&self) -> u64 {
        self.max_error_millis
    }

    pub fn now_millis(&self) -> i64 {
        self.clock.now_millis()
    }

    pub fn test(&self, timestamp_millis: i64) -> bool {
        self.clock.now_millis().abs_diff(timestamp_millis) <= self.max_error_millis
    }
}

impl fmt::Debug for TimeTester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeTester")
            .field("max_error_millis", &self.max_error_millis)
            .finish()
    }
}
