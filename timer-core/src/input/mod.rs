//! Encoder and button fusion.
//!
//! The encoder and button collaborators deliver already-decoded events; this
//! module turns them into countdown edits and state-machine intents. The
//! reference decoders used by the firmware and the emulator live in
//! [`button`] and [`encoder`].

pub mod button;
pub mod encoder;

use crate::countdown::{CountdownValue, TimeUnit};
use crate::machine::TimerState;

pub use button::{DEFAULT_DEBOUNCE, DEFAULT_LONG_PRESS, PressClassifier, PressConfig};
pub use encoder::{COUNTS_PER_DETENT, DetentDecoder};

/// Direction of one encoder detent.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rotation {
    Idle,
    Clockwise,
    CounterClockwise,
}

/// Debounced button classification.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    NotPressed,
    ShortPressed,
    LongPressed,
}

/// Rotary encoder collaborator, sampled once per loop iteration.
pub trait Encoder {
    /// Returns the detent registered since the previous poll, if any.
    fn poll(&mut self) -> Rotation;
}

/// Push-button collaborator with its own debouncing.
pub trait Button {
    /// Returns the press completed since the previous poll, if any.
    fn poll(&mut self) -> ButtonEvent;
}

/// Tracks which field the next rotation edits and whether it just changed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct EditState {
    current: TimeUnit,
    last: TimeUnit,
    default: TimeUnit,
}

impl EditState {
    /// Creates an edit state that reports a pending change on first use, so
    /// the initial frame is drawn with the edit underline.
    #[must_use]
    pub const fn new(default: TimeUnit) -> Self {
        Self {
            current: default,
            last: default.toggled(),
            default,
        }
    }

    /// Field that rotation currently edits.
    #[must_use]
    pub const fn current(&self) -> TimeUnit {
        self.current
    }

    /// Field the edit session starts on.
    #[must_use]
    pub const fn default_unit(&self) -> TimeUnit {
        self.default
    }

    /// Switches to the other field.
    pub fn toggle(&mut self) {
        self.current = self.current.toggled();
    }

    /// Returns to the default field and flags the change for the next cycle.
    pub fn reset_to_default(&mut self) {
        self.current = self.default;
        self.last = self.default.toggled();
    }

    /// Consumes a pending field change.
    pub fn take_change(&mut self) -> Option<TimeUnit> {
        if self.current == self.last {
            None
        } else {
            self.last = self.current;
            Some(self.current)
        }
    }
}

/// Result of one editing-context input pass.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EditOutcome {
    /// The edited field changed; the encoder was not sampled.
    UnitChanged(TimeUnit),
    /// The encoder moved and the countdown was adjusted.
    Adjusted(Rotation),
    /// Nothing happened.
    Idle,
}

impl EditOutcome {
    /// Returns `true` when the user touched the device.
    #[must_use]
    pub const fn is_input(self) -> bool {
        !matches!(self, EditOutcome::Idle)
    }
}

/// High-level action requested through the button.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ButtonIntent {
    None,
    /// Short press while editing; carries the newly selected field.
    ToggleUnit(TimeUnit),
    /// Long press with a nonzero value while off.
    Arm,
    /// Long press while counting down.
    Disarm,
}

/// Routes encoder and button events to the countdown and the state machine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct InputRouter {
    edit: EditState,
}

impl InputRouter {
    /// Creates a router whose edit sessions start on `default_unit`.
    #[must_use]
    pub const fn new(default_unit: TimeUnit) -> Self {
        Self {
            edit: EditState::new(default_unit),
        }
    }

    /// Current edit-field bookkeeping.
    #[must_use]
    pub const fn edit_state(&self) -> &EditState {
        &self.edit
    }

    /// Restores the default edit field, forcing a redraw on the next pass.
    pub fn reset_to_default(&mut self) {
        self.edit.reset_to_default();
    }

    /// Handles input while the countdown is being edited.
    ///
    /// A pending field change is applied first and suppresses sampling the
    /// encoder during the same cycle.
    pub fn process_edit_input<E: Encoder>(
        &mut self,
        countdown: &mut CountdownValue,
        encoder: &mut E,
    ) -> EditOutcome {
        if let Some(unit) = self.edit.take_change() {
            countdown.set_unit(unit);
            return EditOutcome::UnitChanged(unit);
        }

        match Self::poll_rotation(countdown, encoder) {
            Rotation::Idle => EditOutcome::Idle,
            rotation => EditOutcome::Adjusted(rotation),
        }
    }

    /// Samples the encoder and forwards any detent to the countdown.
    pub fn poll_rotation<E: Encoder>(countdown: &mut CountdownValue, encoder: &mut E) -> Rotation {
        let rotation = encoder.poll();
        match rotation {
            Rotation::Idle => {}
            Rotation::Clockwise => {
                countdown.increment();
            }
            Rotation::CounterClockwise => {
                countdown.decrement();
            }
        }
        rotation
    }

    /// Interprets a button event for the given machine state.
    ///
    /// Long presses are ignored at 00:00 and during the alarm. Short presses
    /// only toggle the edit field while the timer is off.
    pub fn classify_button(
        &mut self,
        event: ButtonEvent,
        state: TimerState,
        countdown: &CountdownValue,
    ) -> ButtonIntent {
        match event {
            ButtonEvent::NotPressed => ButtonIntent::None,
            ButtonEvent::LongPressed => {
                if countdown.time_is_up() {
                    return ButtonIntent::None;
                }
                match state {
                    TimerState::Off => ButtonIntent::Arm,
                    TimerState::Active => ButtonIntent::Disarm,
                    TimerState::Alarm => ButtonIntent::None,
                }
            }
            ButtonEvent::ShortPressed => {
                if state != TimerState::Off {
                    return ButtonIntent::None;
                }
                self.edit.toggle();
                ButtonIntent::ToggleUnit(self.edit.current())
            }
        }
    }
}
