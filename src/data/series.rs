//! Sliding-window rate derivation from monotonic counters.
//!
//! Converts a cumulative counter into a bounded series of per-tick rates.
//! The window is a classic ring: strictly time-ordered, fixed capacity,
//! oldest sample evicted on overflow.

use std::collections::VecDeque;
use std::time::Duration;

/// One derived data point: seconds on the shared clock, rate value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub at: f64,
    pub value: f64,
}

/// Fixed-capacity, time-ordered buffer of derived rate samples.
///
/// Timestamps are seconds on a caller-supplied monotonic clock (the app uses
/// seconds since startup). One [`tick`](Self::tick) per render cycle keeps
/// the samples spaced exactly one interval apart, which is what lets the
/// chart scroll by one interval per cycle.
#[derive(Debug, Clone)]
pub struct SlidingWindowSeries {
    capacity: usize,
    offset: u32,
    interval: Duration,
    samples: VecDeque<Sample>,
    previous: Option<u64>,
    last_tick: f64,
}

impl SlidingWindowSeries {
    /// `offset` insets the newest point from the domain's leading edge so it
    /// never draws clipped: 1 for a linear path, 2 for a smoothed one.
    pub fn new(capacity: usize, offset: u32, interval: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            offset,
            interval,
            samples: VecDeque::with_capacity(capacity.max(1) + 1),
            previous: None,
            last_tick: 0.0,
        }
    }

    /// Derive the rate for this tick and append it to the window.
    ///
    /// The delta against the previous counter value is clamped to zero when
    /// the counter went backwards (daemon restart, decode anomaly). The first
    /// tick seeds the baseline and records a zero rate.
    pub fn tick(&mut self, now: f64, counter: u64) -> f64 {
        let rate = match self.previous {
            Some(prev) => counter.saturating_sub(prev) as f64,
            None => 0.0,
        };

        self.samples.push_back(Sample { at: now, value: rate });
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }

        self.previous = Some(counter);
        self.last_tick = now;
        rate
    }

    /// Visible time domain after the most recent tick.
    ///
    /// The trailing edge sits `offset` intervals behind the clock and the
    /// window spans `(capacity - offset)` intervals, so the width is the same
    /// for every tick and the view scrolls by exactly one interval per tick.
    /// Note the start is `last_tick - capacity * interval`, not
    /// `last_tick - (capacity - offset) * interval`: insetting both edges
    /// would shrink the width by `2 * offset` intervals and hide one more
    /// sample than the inset needs. Only the leading edge is inset.
    pub fn time_domain(&self) -> (f64, f64) {
        let dt = self.interval.as_secs_f64();
        let end = self.last_tick - f64::from(self.offset) * dt;
        let start = end - (self.capacity as f64 - f64::from(self.offset)) * dt;
        (start, end)
    }

    /// Value-axis upper bound, floored at 1.0 so an idle feed keeps a
    /// visible axis instead of collapsing to zero height.
    pub fn value_bound(&self) -> f64 {
        self.samples.iter().map(|s| s.value).fold(1.0, f64::max)
    }

    /// Samples as (x, y) pairs for a chart dataset.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.samples.iter().map(|s| (s.at, s.value)).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recent derived rate, if any tick has run.
    pub fn latest(&self) -> Option<f64> {
        self.samples.back().map(|s| s.value)
    }
}
