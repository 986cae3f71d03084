//! Composition of the state machine with its collaborators.
//!
//! [`Device`] owns one instance of every peripheral abstraction and runs a
//! complete loop iteration per [`Device::poll`]: tick, draw, and the blocking
//! sleep/wake handshake. The firmware drives the same machine from async
//! tasks instead; the emulator and the scenario tests use this type.

use core::fmt;

use crate::alarm::Buzzer;
use crate::clock::Clock;
use crate::display::Display;
use crate::events::TimerEvent;
use crate::input::{Button, Encoder};
use crate::machine::{PowerRequest, TickOutcome, TimerConfig, TimerStateMachine};

/// Low-power collaborator.
pub trait PowerManager {
    /// Blocks until the wake edge arrives.
    fn enter_low_power_until_wake(&mut self);
}

/// Power manager that returns immediately.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopPowerManager;

impl PowerManager for NoopPowerManager {
    fn enter_low_power_until_wake(&mut self) {}
}

/// Failure while driving the collaborators.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum DeviceError<E> {
    /// The display rejected a frame or a power-save request.
    Render(E),
}

impl<E: fmt::Debug> fmt::Display for DeviceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Render(err) => write!(f, "display error: {err:?}"),
        }
    }
}

/// The timer with its clock and peripherals.
pub struct Device<C, D, E, K, B, P> {
    machine: TimerStateMachine,
    clock: C,
    display: D,
    encoder: E,
    button: K,
    buzzer: B,
    power: P,
}

impl<C, D, E, K, B, P> Device<C, D, E, K, B, P>
where
    C: Clock,
    D: Display,
    E: Encoder,
    K: Button,
    B: Buzzer,
    P: PowerManager,
{
    /// Assembles a device around a fresh machine.
    #[must_use]
    pub fn new(
        config: TimerConfig,
        clock: C,
        display: D,
        encoder: E,
        button: K,
        buzzer: B,
        power: P,
    ) -> Self {
        Self::with_machine(
            TimerStateMachine::new(config),
            clock,
            display,
            encoder,
            button,
            buzzer,
            power,
        )
    }

    /// Assembles a device around an existing machine.
    #[must_use]
    pub fn with_machine(
        machine: TimerStateMachine,
        clock: C,
        display: D,
        encoder: E,
        button: K,
        buzzer: B,
        power: P,
    ) -> Self {
        Self {
            machine,
            clock,
            display,
            encoder,
            button,
            buzzer,
            power,
        }
    }

    /// Runs one loop iteration.
    ///
    /// When the machine asks to sleep this call blocks inside the power
    /// manager, wakes the display again and appends [`TimerEvent::Woken`].
    pub fn poll(&mut self) -> Result<TickOutcome, DeviceError<D::Error>> {
        let now = self.clock.now();
        let mut outcome =
            self.machine
                .tick(now, &mut self.encoder, &mut self.button, &mut self.buzzer);

        if let Some(frame) = &outcome.render {
            self.display.render(frame).map_err(DeviceError::Render)?;
        }

        if outcome.power == PowerRequest::Sleep {
            self.buzzer.stop();
            self.display
                .set_power_save(true)
                .map_err(DeviceError::Render)?;
            self.power.enter_low_power_until_wake();
            self.display
                .set_power_save(false)
                .map_err(DeviceError::Render)?;
            self.machine.notify_woken(self.clock.now());
            let _ = outcome.events.push(TimerEvent::Woken);
        }

        Ok(outcome)
    }

    #[must_use]
    pub fn machine(&self) -> &TimerStateMachine {
        &self.machine
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn encoder_mut(&mut self) -> &mut E {
        &mut self.encoder
    }

    #[must_use]
    pub fn button(&self) -> &K {
        &self.button
    }

    pub fn button_mut(&mut self) -> &mut K {
        &mut self.button
    }

    #[must_use]
    pub fn buzzer(&self) -> &B {
        &self.buzzer
    }

    pub fn buzzer_mut(&mut self) -> &mut B {
        &mut self.buzzer
    }

    #[must_use]
    pub fn power(&self) -> &P {
        &self.power
    }
}
