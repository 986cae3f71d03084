//! Fire-and-forget tone requests handed from the timer loop to the buzzer task.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use core::time::Duration;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::signal::Signal;
use timer_core::alarm::Buzzer;

/// Work item for the buzzer task.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ToneRequest {
    Play { frequency_hz: u16, duration: Duration },
    Stop,
}

/// Latest pending request; a newer request replaces an unconsumed one.
pub type ToneSignal = Signal<CriticalSectionRawMutex, ToneRequest>;

/// [`Buzzer`] implementation that forwards to the buzzer task.
pub struct SignalBuzzer<'a, M: RawMutex> {
    signal: &'a Signal<M, ToneRequest>,
}

impl<'a, M: RawMutex> SignalBuzzer<'a, M> {
    pub const fn new(signal: &'a Signal<M, ToneRequest>) -> Self {
        Self { signal }
    }
}

impl<M: RawMutex> Buzzer for SignalBuzzer<'_, M> {
    fn tone(&mut self, frequency_hz: u16, duration: Duration) {
        self.signal.signal(ToneRequest::Play {
            frequency_hz,
            duration,
        });
    }

    fn stop(&mut self) {
        self.signal.signal(ToneRequest::Stop);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use timer_core::alarm::{FEEDBACK_BEEP_DURATION, NOTE_A6_HZ};

    #[test]
    fn latest_request_wins() {
        let signal: Signal<NoopRawMutex, ToneRequest> = Signal::new();
        let mut buzzer = SignalBuzzer::new(&signal);

        buzzer.tone(NOTE_A6_HZ, FEEDBACK_BEEP_DURATION);
        assert_eq!(
            signal.try_take(),
            Some(ToneRequest::Play {
                frequency_hz: NOTE_A6_HZ,
                duration: FEEDBACK_BEEP_DURATION,
            })
        );
        assert_eq!(signal.try_take(), None);

        buzzer.tone(NOTE_A6_HZ, FEEDBACK_BEEP_DURATION);
        buzzer.stop();
        assert_eq!(signal.try_take(), Some(ToneRequest::Stop));
    }
}
