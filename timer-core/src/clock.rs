//! Millisecond clock primitives shared by every timed component.
//!
//! The firmware and the emulator both feed the core with a free-running
//! 32-bit millisecond counter. The counter wraps after roughly 49.7 days, so
//! all comparisons go through wrapping subtraction instead of ordering: an
//! interval is measured as `now - start`, never as `now > deadline`.

use core::ops::Add;
use core::time::Duration;

/// Monotonic instant expressed in wrapping milliseconds.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millis(u32);

impl Millis {
    /// Instant at which the counter starts after reset.
    pub const ZERO: Self = Self(0);

    /// Wraps a raw millisecond counter value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw millisecond counter value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Time elapsed since `earlier`, tolerant of counter wraparound.
    #[must_use]
    pub fn wrapping_duration_since(self, earlier: Millis) -> Duration {
        Duration::from_millis(u64::from(self.0.wrapping_sub(earlier.0)))
    }
}

impl Add<Duration> for Millis {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0.wrapping_add(duration_to_millis(rhs)))
    }
}

/// Source of the current monotonic time.
///
/// Implemented by the firmware over the Embassy time driver and by the host
/// emulator and tests over a simulated counter.
pub trait Clock {
    /// Returns the current instant.
    fn now(&self) -> Millis;
}

/// Converts a duration to whole milliseconds, saturating at `u32::MAX`.
#[must_use]
pub fn duration_to_millis(duration: Duration) -> u32 {
    u32::try_from(duration.as_millis()).unwrap_or(u32::MAX)
}

/// One-shot/repeating interval check against the injected clock.
///
/// `start` records a reference instant; `has_elapsed` reports whether at least
/// the given duration has passed since then. Repeating use is achieved by
/// calling `start` again once the interval fires.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ElapsedTimer {
    started_at: Millis,
}

impl ElapsedTimer {
    /// Creates a timer referenced to the counter origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            started_at: Millis::ZERO,
        }
    }

    /// Creates a timer that starts at `now`.
    #[must_use]
    pub const fn started_at(now: Millis) -> Self {
        Self { started_at: now }
    }

    /// Re-arms the timer at `now`.
    pub fn start(&mut self, now: Millis) {
        self.started_at = now;
    }

    /// Returns the instant the timer was last started.
    #[must_use]
    pub const fn reference(&self) -> Millis {
        self.started_at
    }

    /// Time elapsed since the last `start`.
    #[must_use]
    pub fn elapsed(&self, now: Millis) -> Duration {
        now.wrapping_duration_since(self.started_at)
    }

    /// Returns `true` once `duration` has passed since the last `start`.
    #[must_use]
    pub fn has_elapsed(&self, now: Millis, duration: Duration) -> bool {
        self.elapsed(now) >= duration
    }
}
