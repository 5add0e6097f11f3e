//! Monotonic time source and run stopwatch.

use core::time::Duration;

/// Free-running monotonic microsecond counter.
///
/// Implementations must never go backwards. Wrapping is not handled; a 64-bit
/// microsecond counter outlives any fixture run.
pub trait Clock {
    /// Current counter value in microseconds.
    fn now_us(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Span measured against a [`Clock`], started once and stopped once.
#[derive(Debug, PartialEq, Eq)]
pub struct Stopwatch {
    started_us: u64,
}

impl Stopwatch {
    /// Starts measuring from the clock's current value.
    pub fn start(clock: &impl Clock) -> Self {
        Self {
            started_us: clock.now_us(),
        }
    }

    /// Counter value captured at start.
    pub fn started_us(&self) -> u64 {
        self.started_us
    }

    /// Time elapsed so far.
    pub fn elapsed(&self, clock: &impl Clock) -> Duration {
        Duration::from_micros(clock.now_us().saturating_sub(self.started_us))
    }

    /// Stops the span and returns its final length.
    pub fn stop(self, clock: &impl Clock) -> Duration {
        self.elapsed(clock)
    }
}
