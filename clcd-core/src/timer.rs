//! Millisecond interval timers
//!
//! Timers store only the instant they were armed and are compared against
//! a free-running `u32` millisecond counter, so they survive wraparound.

/// Elapsed-time timer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timer {
    started_ms: u32,
}

impl Timer {
    /// A timer armed at `now_ms`
    pub const fn started_at(now_ms: u32) -> Self {
        Self { started_ms: now_ms }
    }

    /// Re-arm at `now_ms`
    pub fn start(&mut self, now_ms: u32) {
        self.started_ms = now_ms;
    }

    /// Milliseconds since the timer was armed
    pub const fn age(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.started_ms)
    }

    /// Whether at least `interval_ms` has passed since arming
    pub const fn elapsed(&self, now_ms: u32, interval_ms: u32) -> bool {
        self.age(now_ms) >= interval_ms
    }
}
