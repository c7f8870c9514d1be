//! Configuration for the acceptance engine.
//!
//! Defines the tolerance and scheduling knobs of an `ExpiringDataManager`.

use core::fmt;
use core::time::Duration;

/// Granularity of a tolerance value.
///
/// Conversions truncate toward zero and saturate instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Converts `value` expressed in this unit to milliseconds.
    pub fn to_millis(self, value: u64) -> u64 {
        match self {
            TimeUnit::Nanoseconds => value / 1_000_000,
            TimeUnit::Microseconds => value / 1_000,
            TimeUnit::Milliseconds => value,
            TimeUnit::Seconds => value.saturating_mul(1_000),
            TimeUnit::Minutes => value.saturating_mul(60_000),
            TimeUnit::Hours => value.saturating_mul(3_600_000),
            TimeUnit::Days => value.saturating_mul(86_400_000),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Nanoseconds => "ns",
            TimeUnit::Microseconds => "us",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "s",
            TimeUnit::Minutes => "min",
            TimeUnit::Hours => "h",
            TimeUnit::Days => "d",
        };
        f.write_str(name)
    }
}

/// Settings for an `ExpiringDataManager`.
///
/// Populated by the host application and handed to the manager at construction.
/// Every field can be changed later through the manager's setters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Largest accepted distance between the clock and a claimed timestamp,
    /// expressed in `unit`.
    pub max_time_error: u64,

    /// Unit of `max_time_error`.
    pub unit: TimeUnit,

    /// Interval between two sweeps while the manager is running.
    pub update_period: Duration,
}

impl ManagerConfig {
    pub fn new(max_time_error: u64, unit: TimeUnit) -> Self {
        Self {
            max_time_error,
            unit,
            ..Default::default()
        }
    }

    /// Tolerance in milliseconds.
    pub fn max_time_error_millis(&self) -> u64 {
        self.unit.to_millis(self.max_time_error)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            max_time_error: 5,
            unit: TimeUnit::Seconds,
            update_period: Duration::from_millis(1_000),
        }
    }
}
