//! Quadrature counter to detent conversion.

use super::Rotation;

/// Quadrature counts produced by one mechanical detent.
pub const COUNTS_PER_DETENT: i32 = 4;

/// Converts a free-running 16-bit quadrature count into detent steps.
///
/// The hardware counter wraps, so deltas are taken with wrapping arithmetic
/// and reinterpreted as signed. Only one detent is reported per call; any
/// surplus stays accumulated for the following polls.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DetentDecoder {
    last_count: Option<u16>,
    accumulated: i32,
}

impl DetentDecoder {
    /// Creates a decoder that latches the first count it sees as the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_count: None,
            accumulated: 0,
        }
    }

    /// Forgets the previous count; used after the counter was reset or the
    /// device woke from low power.
    pub fn resync(&mut self) {
        self.last_count = None;
        self.accumulated = 0;
    }

    /// Feeds the current hardware count and returns at most one detent.
    pub fn update(&mut self, count: u16) -> Rotation {
        if let Some(last) = self.last_count {
            let delta = count.wrapping_sub(last).cast_signed();
            self.accumulated += i32::from(delta);
        }
        self.last_count = Some(count);

        if self.accumulated >= COUNTS_PER_DETENT {
            self.accumulated -= COUNTS_PER_DETENT;
            Rotation::Clockwise
        } else if self.accumulated <= -COUNTS_PER_DETENT {
            self.accumulated += COUNTS_PER_DETENT;
            Rotation::CounterClockwise
        } else {
            Rotation::Idle
        }
    }
}
