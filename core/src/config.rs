//! Scheduler configuration.

use core::time::Duration;

/// Default value of [`SchedulerConfig::yield_floor`].
pub const DEFAULT_YIELD_FLOOR: Duration = Duration::from_millis(1);

/// Tunables for the cooperative work loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// The loop only starts another unit of work while the deadline reports strictly more time
    /// than this.
    pub yield_floor: Duration,
}

impl SchedulerConfig {
    /// Creates the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            yield_floor: DEFAULT_YIELD_FLOOR,
        }
    }

    /// Sets the yield floor.
    #[must_use]
    pub const fn with_yield_floor(mut self, floor: Duration) -> Self {
        self.yield_floor = floor;
        self
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}
