//! Two-note alarm sequencer and the buzzer seam it drives.
//!
//! The sequencer is polled from the main loop and never blocks: each call to
//! [`AlarmSequencer::play_alarm`] inspects the elapsed time and either starts
//! a note, silences one, or does nothing.

use core::time::Duration;

use crate::clock::{ElapsedTimer, Millis};

/// F5, first alarm note.
pub const NOTE_F5_HZ: u16 = 698;
/// A5, second alarm note.
pub const NOTE_A5_HZ: u16 = 880;
/// F6, acknowledgement beep for an edit-field toggle.
pub const NOTE_F6_HZ: u16 = 1_397;
/// A6, acknowledgement beep for arming or cancelling the countdown.
pub const NOTE_A6_HZ: u16 = 1_760;

/// Notes of one alarm cycle, played in order.
pub const ALARM_NOTES: [u16; 2] = [NOTE_F5_HZ, NOTE_A5_HZ];
/// How long each alarm note sounds.
pub const ALARM_TONE_DURATION: Duration = Duration::from_millis(150);
/// Silence between the end of one note and the start of the next.
pub const ALARM_NOTE_PAUSE: Duration = Duration::from_millis(10);
/// Period after which a finished cycle replays from the first note.
pub const ALARM_REPEAT_DELAY: Duration = Duration::from_millis(1_500);
/// Length of the key acknowledgement beeps.
pub const FEEDBACK_BEEP_DURATION: Duration = Duration::from_millis(30);

/// Abstraction over the piezo output.
///
/// Both calls are fire-and-forget: `tone` returns immediately and the
/// implementation silences the output by itself once `duration` has passed.
pub trait Buzzer {
    /// Starts a square wave at `frequency_hz` for `duration`.
    fn tone(&mut self, frequency_hz: u16, duration: Duration);

    /// Silences the output immediately.
    fn stop(&mut self);
}

/// Buzzer that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopBuzzer;

impl NoopBuzzer {
    /// Creates a new no-op buzzer.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Buzzer for NoopBuzzer {
    fn tone(&mut self, _: u16, _: Duration) {}

    fn stop(&mut self) {}
}

/// Sequencer phase.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmPhase {
    /// Waiting for the inter-note pause before the next note.
    SilentInterNote,
    /// A note is sounding.
    TonePlaying,
    /// Every note of the cycle has played; waiting for the repeat delay.
    CycleHalted,
}

/// Plays [`ALARM_NOTES`] and repeats every [`ALARM_REPEAT_DELAY`].
#[derive(Clone, Debug)]
pub struct AlarmSequencer {
    notes: [u16; ALARM_NOTES.len()],
    next_note: usize,
    phase: AlarmPhase,
    tone_timer: ElapsedTimer,
    repeat_timer: ElapsedTimer,
}

impl AlarmSequencer {
    /// Creates a halted sequencer with the default notes.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_notes(ALARM_NOTES)
    }

    /// Creates a halted sequencer playing `notes`.
    #[must_use]
    pub const fn with_notes(notes: [u16; ALARM_NOTES.len()]) -> Self {
        Self {
            notes,
            next_note: 0,
            phase: AlarmPhase::CycleHalted,
            tone_timer: ElapsedTimer::new(),
            repeat_timer: ElapsedTimer::new(),
        }
    }

    /// Current phase of the sequence.
    #[must_use]
    pub const fn phase(&self) -> AlarmPhase {
        self.phase
    }

    /// Index of the note the next emission will play.
    #[must_use]
    pub const fn next_note(&self) -> usize {
        self.next_note
    }

    /// Forces a fresh cycle starting at `now`.
    pub fn reset(&mut self, now: Millis) {
        self.next_note = 0;
        self.phase = AlarmPhase::SilentInterNote;
        self.repeat_timer.start(now);
    }

    /// Advances the sequence; call once per loop iteration while the alarm is due.
    pub fn play_alarm<B: Buzzer>(&mut self, now: Millis, buzzer: &mut B) {
        if self.repeat_timer.has_elapsed(now, ALARM_REPEAT_DELAY) {
            self.reset(now);
        }
        self.advance(now, buzzer);
    }

    /// Silences any sounding note and halts the cycle.
    pub fn silence<B: Buzzer>(&mut self, buzzer: &mut B) {
        if self.phase == AlarmPhase::TonePlaying {
            buzzer.stop();
        }
        self.phase = AlarmPhase::CycleHalted;
        self.next_note = 0;
    }

    fn advance<B: Buzzer>(&mut self, now: Millis, buzzer: &mut B) {
        match self.phase {
            AlarmPhase::CycleHalted => {}
            AlarmPhase::TonePlaying => {
                if self.tone_timer.has_elapsed(now, ALARM_TONE_DURATION) {
                    buzzer.stop();
                    self.tone_timer.start(now);
                    self.phase = if self.next_note >= self.notes.len() {
                        self.next_note = 0;
                        AlarmPhase::CycleHalted
                    } else {
                        AlarmPhase::SilentInterNote
                    };
                }
            }
            AlarmPhase::SilentInterNote => {
                // The first note of a cycle starts without a pause.
                if self.next_note == 0 || self.tone_timer.has_elapsed(now, ALARM_NOTE_PAUSE) {
                    buzzer.tone(self.notes[self.next_note], ALARM_TONE_DURATION);
                    self.next_note += 1;
                    self.tone_timer.start(now);
                    self.phase = AlarmPhase::TonePlaying;
                }
            }
        }
    }
}

impl Default for AlarmSequencer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    #[derive(Default)]
    struct RecordingBuzzer {
        tones: Vec<u16, 16>,
        stops: usize,
    }

    impl Buzzer for RecordingBuzzer {
        fn tone(&mut self, frequency_hz: u16, _: Duration) {
            self.tones.push(frequency_hz).expect("tone log overflow");
        }

        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    #[test]
    fn new_sequencer_is_halted_until_reset() {
        let mut alarm = AlarmSequencer::new();
        let mut buzzer = RecordingBuzzer::default();

        alarm.advance(Millis::from_raw(10), &mut buzzer);
        assert_eq!(alarm.phase(), AlarmPhase::CycleHalted);
        assert!(buzzer.tones.is_empty());
    }

    #[test]
    fn notes_are_separated_by_tone_and_pause() {
        let mut alarm = AlarmSequencer::new();
        let mut buzzer = RecordingBuzzer::default();
        let start = Millis::from_raw(5_000);
        alarm.reset(start);

        alarm.play_alarm(start, &mut buzzer);
        assert_eq!(buzzer.tones.as_slice(), &[NOTE_F5_HZ]);
        assert_eq!(alarm.phase(), AlarmPhase::TonePlaying);

        alarm.play_alarm(start + Duration::from_millis(149), &mut buzzer);
        assert_eq!(buzzer.stops, 0);
        alarm.play_alarm(start + Duration::from_millis(150), &mut buzzer);
        assert_eq!(buzzer.stops, 1);
        assert_eq!(alarm.phase(), AlarmPhase::SilentInterNote);

        alarm.play_alarm(start + Duration::from_millis(159), &mut buzzer);
        assert_eq!(buzzer.tones.len(), 1);
        alarm.play_alarm(start + Duration::from_millis(160), &mut buzzer);
        assert_eq!(buzzer.tones.as_slice(), &[NOTE_F5_HZ, NOTE_A5_HZ]);

        alarm.play_alarm(start + Duration::from_millis(310), &mut buzzer);
        assert_eq!(alarm.phase(), AlarmPhase::CycleHalted);
        assert_eq!(alarm.next_note(), 0);
    }

    #[test]
    fn silence_stops_sounding_note() {
        let mut alarm = AlarmSequencer::new();
        let mut buzzer = RecordingBuzzer::default();
        alarm.reset(Millis::ZERO);
        alarm.play_alarm(Millis::ZERO, &mut buzzer);

        alarm.silence(&mut buzzer);
        assert_eq!(buzzer.stops, 1);
        assert_eq!(alarm.phase(), AlarmPhase::CycleHalted);

        alarm.silence(&mut buzzer);
        assert_eq!(buzzer.stops, 1, "halted sequencer must not stop twice");
    }

    #[test]
    fn custom_notes_are_played() {
        let mut alarm = AlarmSequencer::with_notes([NOTE_F6_HZ, NOTE_A6_HZ]);
        let mut buzzer = RecordingBuzzer::default();
        alarm.reset(Millis::ZERO);
        alarm.play_alarm(Millis::ZERO, &mut buzzer);
        assert_eq!(buzzer.tones.as_slice(), &[NOTE_F6_HZ]);
    }
}
