//! Fixed-interval tick pacing.

use std::time::Duration;

/// Accumulates elapsed wall-clock time and signals when a tick is due.
///
/// Once the interval is reached the accumulator resets to zero; surplus time
/// is discarded rather than carried into the next tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickAccumulator {
    interval: Duration,
    accumulated: Duration,
}

impl TickAccumulator {
    /// Creates an accumulator firing every `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulated: Duration::ZERO,
        }
    }

    /// Interval between ticks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time gathered toward the next tick.
    #[must_use]
    pub const fn accumulated(&self) -> Duration {
        self.accumulated
    }

    /// Adds `elapsed` and reports whether a tick is due.
    pub fn accumulate(&mut self, elapsed: Duration) -> bool {
        self.accumulated = self.accumulated.saturating_add(elapsed);
        if self.accumulated >= self.interval {
            self.accumulated = Duration::ZERO;
            true
        } else {
            false
        }
    }
}
