//! Repeating window deadlines.

use std::time::{Duration, Instant};

/// Self-chaining repeating deadline for one sampler's window cycle.
///
/// The clock holds exactly one pending deadline.  After the owner finishes
/// processing a due close it calls [`rearm`](WindowClock::rearm) with the
/// completion time, scheduling the next close one full period later.  A slow
/// handler therefore delays subsequent ticks rather than stacking or
/// dropping them, and two closes for the same sampler can never overlap.
/// Cancellation is dropping the clock.
#[derive(Debug, Clone)]
pub struct WindowClock {
    period: Duration,
    deadline: Instant,
}

impl WindowClock {
    /// Arm the first deadline one period after `now`.
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period,
            deadline: now + period,
        }
    }

    /// The window period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// The pending deadline.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether the pending deadline has been reached.
    pub fn due(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Time remaining until the deadline; zero once due.
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    /// Chain the next deadline one period after `after` — the completion
    /// time of the close that just ran, not the deadline it ran for.
    pub fn rearm(&mut self, after: Instant) {
        self.deadline = after + self.period;
    }
}
