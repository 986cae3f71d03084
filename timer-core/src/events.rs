//! Event stream emitted by the state machine and a ring for recent history.
//!
//! The core never logs by itself. Each tick hands back the events it caused
//! so the firmware can forward them to defmt and the emulator can print them;
//! [`EventRecorder`] keeps the most recent ones for inspection.

use core::fmt;

use heapless::{HistoryBuf, OldestOrdered, Vec};

use crate::clock::Millis;
use crate::countdown::TimeUnit;

/// Upper bound of events a single tick can produce.
pub const MAX_EVENTS_PER_TICK: usize = 4;

/// Total number of records retained by [`EventRecorder`].
pub const EVENT_HISTORY_CAPACITY: usize = 32;

/// Something observable that happened during a tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerEvent {
    /// Countdown armed with the given number of seconds.
    Armed { total_seconds: u32 },
    /// Countdown cancelled with the given number of seconds left.
    Disarmed { remaining_seconds: u32 },
    /// One second elapsed while counting down.
    CountdownTick(u32),
    /// The edited field changed.
    UnitSelected(TimeUnit),
    /// The user rotated the encoder; carries the new total.
    Adjusted(u32),
    AlarmStarted,
    AlarmSilenced,
    SleepRequested,
    Woken,
}

impl fmt::Display for TimerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerEvent::Armed { total_seconds } => {
                write!(f, "armed {}", ClockFace(*total_seconds))
            }
            TimerEvent::Disarmed { remaining_seconds } => {
                write!(f, "disarmed {}", ClockFace(*remaining_seconds))
            }
            TimerEvent::CountdownTick(total) => write!(f, "tick {}", ClockFace(*total)),
            TimerEvent::UnitSelected(unit) => write!(f, "editing {}", unit.label()),
            TimerEvent::Adjusted(total) => write!(f, "set {}", ClockFace(*total)),
            TimerEvent::AlarmStarted => f.write_str("alarm-started"),
            TimerEvent::AlarmSilenced => f.write_str("alarm-silenced"),
            TimerEvent::SleepRequested => f.write_str("sleep"),
            TimerEvent::Woken => f.write_str("wake"),
        }
    }
}

struct ClockFace(u32);

impl fmt::Display for ClockFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Events produced by one tick, in the order they happened.
pub type EventLog = Vec<TimerEvent, MAX_EVENTS_PER_TICK>;

/// Timestamped event stored in the history ring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EventRecord {
    pub at: Millis,
    pub event: TimerEvent,
}

/// Fixed-size history of recent events; the oldest entries are overwritten.
pub struct EventRecorder<const CAPACITY: usize = EVENT_HISTORY_CAPACITY> {
    ring: HistoryBuf<EventRecord, CAPACITY>,
}

impl<const CAPACITY: usize> EventRecorder<CAPACITY> {
    /// Creates an empty recorder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: HistoryBuf::new(),
        }
    }

    /// Appends every event in `events` with the same timestamp.
    pub fn record_all(&mut self, at: Millis, events: &[TimerEvent]) {
        for event in events {
            self.record(at, *event);
        }
    }

    /// Appends a single event.
    pub fn record(&mut self, at: Millis, event: TimerEvent) {
        self.ring.write(EventRecord { at, event });
    }

    /// Iterates the retained records in chronological order.
    pub fn oldest_first(&self) -> OldestOrdered<'_, EventRecord> {
        self.ring.oldest_ordered()
    }

    /// Most recent record, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&EventRecord> {
        self.ring.recent()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
}

impl<const CAPACITY: usize> Default for EventRecorder<CAPACITY> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use core::fmt::Write as _;

    use super::*;

    fn text(event: TimerEvent) -> heapless::String<24> {
        let mut out = heapless::String::new();
        write!(out, "{event}").expect("label fits");
        out
    }

    #[test]
    fn events_render_as_short_labels() {
        assert_eq!(text(TimerEvent::Armed { total_seconds: 65 }).as_str(), "armed 01:05");
        assert_eq!(text(TimerEvent::CountdownTick(9)).as_str(), "tick 00:09");
        assert_eq!(text(TimerEvent::UnitSelected(TimeUnit::Minutes)).as_str(), "editing minutes");
        assert_eq!(text(TimerEvent::AlarmSilenced).as_str(), "alarm-silenced");
    }

    #[test]
    fn recorder_keeps_most_recent_entries() {
        let mut recorder: EventRecorder<2> = EventRecorder::new();
        assert!(recorder.is_empty());

        recorder.record(Millis::from_raw(1), TimerEvent::SleepRequested);
        recorder.record_all(
            Millis::from_raw(2),
            &[TimerEvent::Woken, TimerEvent::Adjusted(3)],
        );

        assert_eq!(recorder.len(), 2);
        let events: Vec<TimerEvent, 2> = recorder.oldest_first().map(|r| r.event).collect();
        assert_eq!(events.as_slice(), &[TimerEvent::Woken, TimerEvent::Adjusted(3)]);
        assert_eq!(recorder.latest().map(|r| r.at), Some(Millis::from_raw(2)));
    }
}
