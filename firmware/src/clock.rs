//! Bridges the Embassy time driver to the core's wrapping millisecond clock.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use core::convert::TryFrom;

use embassy_time::{Duration, Instant};
use timer_core::clock::Millis;

/// Truncates an Embassy instant to the core's 32-bit wrapping counter.
pub fn millis_from_instant(instant: Instant) -> Millis {
    let wrapped = instant.as_millis() & u64::from(u32::MAX);
    Millis::from_raw(u32::try_from(wrapped).unwrap_or(u32::MAX))
}

/// Converts a core duration into an Embassy one, saturating on overflow.
pub fn core_duration_to_embassy(duration: core::time::Duration) -> Duration {
    let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
    Duration::from_micros(micros)
}

/// Current time from the Embassy time driver.
#[cfg(target_os = "none")]
pub fn now() -> Millis {
    millis_from_instant(Instant::now())
}
