//! Countdown value model.
//!
//! The remaining time is stored as a single count of seconds and viewed as
//! `MM:SS`. Every adjustment clamps into `0..=MAX_TOTAL_SECONDS`; the
//! arithmetic is unsigned, so decrement detects underflow by checking for a
//! result above the maximum rather than below zero.

use core::time::Duration;

use crate::clock::{ElapsedTimer, Millis};

/// Seconds in one minute, also the edit multiplier for the minutes field.
pub const SECONDS_PER_MINUTE: u32 = 60;
/// Largest value accepted by the seconds field.
pub const MAX_SECONDS: u32 = 59;
/// Largest value accepted by the minutes setter before the total clamp.
pub const MAX_MINUTES: u32 = 60;
/// Upper bound of the countdown (59:59).
pub const MAX_TOTAL_SECONDS: u32 = 59 * SECONDS_PER_MINUTE + MAX_SECONDS;

/// Field of the `MM:SS` display the user is editing.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeUnit {
    Seconds,
    Minutes,
}

impl TimeUnit {
    /// Number of seconds one encoder detent adds or removes.
    #[must_use]
    pub const fn multiplier(self) -> u32 {
        match self {
            TimeUnit::Seconds => 1,
            TimeUnit::Minutes => SECONDS_PER_MINUTE,
        }
    }

    /// Returns the other field.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            TimeUnit::Seconds => TimeUnit::Minutes,
            TimeUnit::Minutes => TimeUnit::Seconds,
        }
    }

    /// Short lowercase label used in logs and the emulator.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            TimeUnit::Seconds => "seconds",
            TimeUnit::Minutes => "minutes",
        }
    }
}

/// Remaining countdown time plus the edit unit and decrement clock.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CountdownValue {
    total_seconds: u32,
    unit: TimeUnit,
    clock: ElapsedTimer,
}

impl CountdownValue {
    /// Creates a countdown preset to `minutes:seconds`, clamped to the valid range.
    #[must_use]
    pub fn new(minutes: u32, seconds: u32) -> Self {
        let mut value = Self {
            total_seconds: 0,
            unit: TimeUnit::Seconds,
            clock: ElapsedTimer::new(),
        };
        value.set_minutes(minutes);
        value.set_seconds(seconds);
        value
    }

    /// Total remaining seconds.
    #[must_use]
    pub const fn total_seconds(&self) -> u32 {
        self.total_seconds
    }

    /// Minutes component of the remaining time.
    #[must_use]
    pub const fn minutes(&self) -> u32 {
        self.total_seconds / SECONDS_PER_MINUTE
    }

    /// Seconds component of the remaining time.
    #[must_use]
    pub const fn seconds(&self) -> u32 {
        self.total_seconds % SECONDS_PER_MINUTE
    }

    /// Field that `increment`/`decrement` currently adjust.
    #[must_use]
    pub const fn active_unit(&self) -> TimeUnit {
        self.unit
    }

    /// Replaces the minutes component, keeping the current seconds.
    pub fn set_minutes(&mut self, minutes: u32) {
        let minute_part = minutes.min(MAX_MINUTES) * SECONDS_PER_MINUTE;
        self.total_seconds = (minute_part + self.seconds()).min(MAX_TOTAL_SECONDS);
    }

    /// Replaces the seconds component, keeping the current minutes.
    ///
    /// Stored minutes never exceed 59, so at 59:59 the minutes stay and the
    /// new seconds are taken; the total cannot pass the maximum.
    pub fn set_seconds(&mut self, seconds: u32) {
        let minute_part = self.minutes() * SECONDS_PER_MINUTE;
        self.total_seconds = minute_part + seconds.min(MAX_SECONDS);
    }

    /// Adds one unit of the active field, saturating at 59:59.
    pub fn increment(&mut self) -> u32 {
        self.total_seconds = (self.total_seconds + self.unit.multiplier()).min(MAX_TOTAL_SECONDS);
        self.total_seconds
    }

    /// Removes one unit of the active field.
    ///
    /// On underflow the seconds field clamps to zero, while the minutes field
    /// keeps the leftover seconds (1:05 becomes 0:05, not 0:00).
    pub fn decrement(&mut self) -> u32 {
        let saved = self.total_seconds;
        let next = saved.wrapping_sub(self.unit.multiplier());
        // Unsigned wraparound shows up as a value above the maximum.
        self.total_seconds = if next > MAX_TOTAL_SECONDS {
            match self.unit {
                TimeUnit::Seconds => 0,
                TimeUnit::Minutes => saved % SECONDS_PER_MINUTE,
            }
        } else {
            next
        };
        self.total_seconds
    }

    /// Edits the seconds field from now on.
    pub fn set_unit_seconds(&mut self) {
        self.unit = TimeUnit::Seconds;
    }

    /// Edits the minutes field from now on.
    pub fn set_unit_minutes(&mut self) {
        self.unit = TimeUnit::Minutes;
    }

    /// Selects the edited field by value.
    pub fn set_unit(&mut self, unit: TimeUnit) {
        match unit {
            TimeUnit::Seconds => self.set_unit_seconds(),
            TimeUnit::Minutes => self.set_unit_minutes(),
        }
    }

    /// Returns `true` when no time remains.
    #[must_use]
    pub const fn time_is_up(&self) -> bool {
        self.total_seconds == 0
    }

    /// Records `now` as the reference for the next automatic decrement.
    pub fn start(&mut self, now: Millis) {
        self.clock.start(now);
    }

    /// Returns `true` once `duration` has passed since the last `start`.
    #[must_use]
    pub fn elapsed(&self, now: Millis, duration: Duration) -> bool {
        self.clock.has_elapsed(now, duration)
    }
}

impl Default for CountdownValue {
    fn default() -> Self {
        Self::new(0, 0)
    }
}
