//! Simulated peripherals driven by the console session.
//!
//! Every collaborator shares one [`SimClock`]; time only moves when the
//! session advances it, so runs are fully deterministic.

use std::cell::Cell;
use std::convert::Infallible;
use std::rc::Rc;
use std::time::Duration;

use timer_core::alarm::Buzzer;
use timer_core::clock::{Clock, Millis, duration_to_millis};
use timer_core::device::PowerManager;
use timer_core::display::{Display, RenderCommand};
use timer_core::input::{
    Button, ButtonEvent, COUNTS_PER_DETENT, DetentDecoder, Encoder, PressClassifier, PressConfig,
    Rotation,
};

/// Shared millisecond counter.
#[derive(Clone, Debug, Default)]
pub struct SimClock {
    now: Rc<Cell<u32>>,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now
            .set(self.now.get().wrapping_add(duration_to_millis(by)));
    }
}

impl Clock for SimClock {
    fn now(&self) -> Millis {
        Millis::from_raw(self.now.get())
    }
}

/// Quadrature counter plus the same detent decoding the firmware uses.
///
/// Turns queue up as a backlog of counts that reaches the counter one detent
/// per poll, like a knob spun by hand, so the 16-bit delta seen by the
/// decoder never overflows.
#[derive(Debug, Default)]
pub struct SimEncoder {
    count: u16,
    backlog: i32,
    decoder: DetentDecoder,
}

impl SimEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues whole detents in `direction`.
    pub fn turn(&mut self, direction: Rotation, detents: u32) {
        let counts = i32::try_from(detents)
            .unwrap_or(i32::MAX)
            .saturating_mul(COUNTS_PER_DETENT);
        self.backlog = match direction {
            Rotation::Clockwise => self.backlog.saturating_add(counts),
            Rotation::CounterClockwise => self.backlog.saturating_sub(counts),
            Rotation::Idle => self.backlog,
        };
    }
}

impl Encoder for SimEncoder {
    fn poll(&mut self) -> Rotation {
        let step = self.backlog.clamp(-COUNTS_PER_DETENT, COUNTS_PER_DETENT);
        self.backlog -= step;
        self.count = self
            .count
            .wrapping_add_signed(i16::try_from(step).unwrap_or_default());
        self.decoder.update(self.count)
    }
}

/// Raw button line sampled against the shared clock.
#[derive(Debug)]
pub struct SimButton {
    clock: SimClock,
    pressed: bool,
    classifier: PressClassifier,
}

impl SimButton {
    pub fn new(clock: SimClock, config: PressConfig) -> Self {
        Self {
            clock,
            pressed: false,
            classifier: PressClassifier::new(config),
        }
    }

    pub fn set_pressed(&mut self, pressed: bool) {
        self.pressed = pressed;
    }

    pub fn is_down(&self) -> bool {
        self.pressed
    }
}

impl Button for SimButton {
    fn poll(&mut self) -> ButtonEvent {
        self.classifier.update(self.clock.now(), self.pressed)
    }
}

/// Something the buzzer was asked to do.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BuzzerAction {
    Tone { frequency_hz: u16, duration: Duration },
    Stop,
}

/// Buzzer that keeps the requests until the session collects them.
#[derive(Debug, Default)]
pub struct HostBuzzer {
    actions: Vec<BuzzerAction>,
}

impl HostBuzzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_actions(&mut self) -> Vec<BuzzerAction> {
        std::mem::take(&mut self.actions)
    }
}

impl Buzzer for HostBuzzer {
    fn tone(&mut self, frequency_hz: u16, duration: Duration) {
        self.actions.push(BuzzerAction::Tone {
            frequency_hz,
            duration,
        });
    }

    fn stop(&mut self) {
        self.actions.push(BuzzerAction::Stop);
    }
}

/// Panel model: the last frame plus the power-save flag.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    frame: Option<RenderCommand>,
    fresh: Option<RenderCommand>,
    power_save: bool,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frame currently on the panel.
    pub fn frame(&self) -> Option<RenderCommand> {
        self.frame
    }

    pub fn is_power_save(&self) -> bool {
        self.power_save
    }

    /// Latest frame drawn since the previous call.
    pub fn take_fresh(&mut self) -> Option<RenderCommand> {
        self.fresh.take()
    }
}

impl Display for TerminalDisplay {
    type Error = Infallible;

    fn render(&mut self, command: &RenderCommand) -> Result<(), Self::Error> {
        self.frame = Some(*command);
        self.fresh = Some(*command);
        Ok(())
    }

    fn set_power_save(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.power_save = enabled;
        Ok(())
    }
}

/// Power manager whose wake edge arrives immediately.
///
/// A console session cannot block on input that has not been typed yet, so
/// the nap is counted and the wake guard takes over from there.
#[derive(Debug, Default)]
pub struct SimPowerManager {
    naps: u32,
}

impl SimPowerManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn naps(&self) -> u32 {
        self.naps
    }
}

impl PowerManager for SimPowerManager {
    fn enter_low_power_until_wake(&mut self) {
        self.naps += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoder_reports_one_detent_per_poll() {
        let mut encoder = SimEncoder::new();
        assert_eq!(encoder.poll(), Rotation::Idle);

        encoder.turn(Rotation::CounterClockwise, 2);
        assert_eq!(encoder.poll(), Rotation::CounterClockwise);
        assert_eq!(encoder.poll(), Rotation::CounterClockwise);
        assert_eq!(encoder.poll(), Rotation::Idle);
    }

    #[test]
    fn long_turn_keeps_its_direction() {
        let mut encoder = SimEncoder::new();
        encoder.poll();

        encoder.turn(Rotation::Clockwise, 9_000);
        for _ in 0..9_000 {
            assert_eq!(encoder.poll(), Rotation::Clockwise);
        }
        assert_eq!(encoder.poll(), Rotation::Idle);
    }

    #[test]
    fn button_follows_shared_clock() {
        let clock = SimClock::new();
        let mut button = SimButton::new(clock.clone(), PressConfig::default());

        button.set_pressed(true);
        assert_eq!(button.poll(), ButtonEvent::NotPressed);
        clock.advance(Duration::from_millis(150));
        assert_eq!(button.poll(), ButtonEvent::NotPressed);

        button.set_pressed(false);
        assert_eq!(button.poll(), ButtonEvent::NotPressed);
        clock.advance(Duration::from_millis(100));
        assert_eq!(button.poll(), ButtonEvent::ShortPressed);
    }

    #[test]
    fn display_hands_out_each_frame_once() {
        let mut display = TerminalDisplay::new();
        let frame = RenderCommand {
            minutes: 1,
            seconds: 2,
            underline: timer_core::display::Underline::None,
        };
        assert!(display.render(&frame).is_ok());
        assert_eq!(display.take_fresh(), Some(frame));
        assert_eq!(display.take_fresh(), None);
        assert_eq!(display.frame(), Some(frame));
    }
}
