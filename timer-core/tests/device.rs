use core::cell::Cell;
use core::time::Duration;

use heapless::Vec;
use timer_core::alarm::Buzzer;
use timer_core::clock::{Clock, Millis};
use timer_core::countdown::TimeUnit;
use timer_core::device::{Device, DeviceError, PowerManager};
use timer_core::display::{Display, RenderCommand, Underline};
use timer_core::events::TimerEvent;
use timer_core::input::{Button, ButtonEvent, Encoder, Rotation};
use timer_core::machine::{PowerRequest, TimerConfig};

struct SimClock {
    now: Cell<u32>,
}

impl SimClock {
    const fn new() -> Self {
        Self { now: Cell::new(0) }
    }

    fn advance(&self, ms: u32) {
        self.now.set(self.now.get() + ms);
    }

    fn now(&self) -> Millis {
        Millis::from_raw(self.now.get())
    }
}

impl Clock for &SimClock {
    fn now(&self) -> Millis {
        SimClock::now(self)
    }
}

#[derive(Default)]
struct RecordingDisplay {
    frames: Vec<RenderCommand, 16>,
    power_save: Vec<bool, 8>,
    fail: bool,
}

#[derive(Debug, PartialEq)]
struct PanelUnplugged;

impl Display for RecordingDisplay {
    type Error = PanelUnplugged;

    fn render(&mut self, command: &RenderCommand) -> Result<(), Self::Error> {
        if self.fail {
            return Err(PanelUnplugged);
        }
        self.frames.push(*command).expect("frame log overflow");
        Ok(())
    }

    fn set_power_save(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.power_save.push(enabled).expect("power log overflow");
        Ok(())
    }
}

#[derive(Default)]
struct StepEncoder {
    pending: Option<Rotation>,
}

impl Encoder for StepEncoder {
    fn poll(&mut self) -> Rotation {
        self.pending.take().unwrap_or(Rotation::Idle)
    }
}

#[derive(Default)]
struct StepButton {
    pending: Option<ButtonEvent>,
}

impl Button for StepButton {
    fn poll(&mut self) -> ButtonEvent {
        self.pending.take().unwrap_or(ButtonEvent::NotPressed)
    }
}

#[derive(Default)]
struct CountingBuzzer {
    tones: usize,
    stops: usize,
}

impl Buzzer for CountingBuzzer {
    fn tone(&mut self, _frequency_hz: u16, _duration: Duration) {
        self.tones += 1;
    }

    fn stop(&mut self) {
        self.stops += 1;
    }
}

/// Sleeps for a fixed amount of simulated time.
struct SleepFor<'a> {
    clock: &'a SimClock,
    duration_ms: u32,
    sleeps: usize,
}

impl PowerManager for SleepFor<'_> {
    fn enter_low_power_until_wake(&mut self) {
        self.sleeps += 1;
        self.clock.advance(self.duration_ms);
    }
}

#[test]
fn sleep_handshake_blanks_panel_and_guards_wake() {
    let clock = SimClock::new();
    let config = TimerConfig::new().with_default_unit(TimeUnit::Seconds);
    let mut device = Device::new(
        config,
        &clock,
        RecordingDisplay::default(),
        StepEncoder::default(),
        StepButton::default(),
        CountingBuzzer::default(),
        SleepFor {
            clock: &clock,
            duration_ms: 60_000,
            sleeps: 0,
        },
    );

    let outcome = device.poll().expect("first frame");
    assert_eq!(device.display().frames.len(), 1);
    assert_eq!(outcome.render.map(|f| f.underline), Some(Underline::Seconds));

    clock.advance(10_000);
    let outcome = device.poll().expect("sleep");
    assert_eq!(outcome.power, PowerRequest::Sleep);
    assert_eq!(
        outcome.events.as_slice(),
        &[TimerEvent::SleepRequested, TimerEvent::Woken]
    );
    assert_eq!(device.power().sleeps, 1);
    assert_eq!(device.display().power_save.as_slice(), &[true, false]);
    assert_eq!(device.buzzer().stops, 1);
    assert!(device.machine().in_wake_guard(clock.now()));

    clock.advance(500);
    device.encoder_mut().pending = Some(Rotation::Clockwise);
    let outcome = device.poll().expect("guarded");
    assert!(outcome.render.is_none());
    assert_eq!(device.machine().countdown().total_seconds(), 0);

    clock.advance(500);
    device.encoder_mut().pending = Some(Rotation::Clockwise);
    let outcome = device.poll().expect("input after guard");
    assert_eq!(outcome.events.as_slice(), &[TimerEvent::Adjusted(1)]);
    assert_eq!(device.display().frames.len(), 2);
}

#[test]
fn arming_through_device_beeps_and_renders() {
    let clock = SimClock::new();
    let mut device = Device::new(
        TimerConfig::new().with_default_unit(TimeUnit::Seconds),
        &clock,
        RecordingDisplay::default(),
        StepEncoder::default(),
        StepButton::default(),
        CountingBuzzer::default(),
        SleepFor {
            clock: &clock,
            duration_ms: 0,
            sleeps: 0,
        },
    );

    device.poll().expect("first frame");
    device.encoder_mut().pending = Some(Rotation::Clockwise);
    clock.advance(1);
    device.poll().expect("adjust");

    device.button_mut().pending = Some(ButtonEvent::LongPressed);
    clock.advance(1);
    let outcome = device.poll().expect("arm");
    assert_eq!(outcome.events.as_slice(), &[TimerEvent::Armed { total_seconds: 1 }]);
    assert_eq!(device.buzzer().tones, 1);

    let last = device.display().frames.last().copied();
    assert_eq!(last.map(|f| f.text()).as_deref(), Some("00:01"));
    assert_eq!(last.map(|f| f.underline), Some(Underline::None));
}

#[test]
fn render_failure_is_reported() {
    let clock = SimClock::new();
    let mut device = Device::new(
        TimerConfig::default(),
        &clock,
        RecordingDisplay {
            fail: true,
            ..RecordingDisplay::default()
        },
        StepEncoder::default(),
        StepButton::default(),
        CountingBuzzer::default(),
        SleepFor {
            clock: &clock,
            duration_ms: 0,
            sleeps: 0,
        },
    );

    assert_eq!(device.poll().err(), Some(DeviceError::Render(PanelUnplugged)));
}
