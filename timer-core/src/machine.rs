//! Top-level off/active/alarm state machine.
//!
//! [`TimerStateMachine::tick`] is one iteration of the device loop. It never
//! blocks: everything time dependent is decided by comparing the supplied
//! `now` against timers the machine owns. The caller renders the returned
//! frame and honours the power request.

use core::time::Duration;

use crate::alarm::{AlarmSequencer, Buzzer, FEEDBACK_BEEP_DURATION, NOTE_A6_HZ, NOTE_F6_HZ};
use crate::clock::{ElapsedTimer, Millis};
use crate::countdown::{CountdownValue, TimeUnit};
use crate::display::{RenderCommand, Underline};
use crate::events::{EventLog, TimerEvent};
use crate::input::{Button, ButtonEvent, ButtonIntent, EditOutcome, Encoder, InputRouter, Rotation};

/// Countdown decrement period, slightly short of a second to compensate
/// for the oscillator running slow.
pub const DEFAULT_SECOND_TICK: Duration = Duration::from_millis(997);
/// Idle time in the off state before the device asks to sleep.
pub const DEFAULT_INACTIVITY_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Interval after waking during which input is drained and ignored.
pub const DEFAULT_WAKE_GUARD: Duration = Duration::from_millis(1_000);

/// Field the edit view starts on, selected at build time.
pub const DEFAULT_EDIT_UNIT: TimeUnit = if cfg!(feature = "minutes-default") {
    TimeUnit::Minutes
} else {
    TimeUnit::Seconds
};

/// Coarse machine state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    /// Not counting; the value is editable.
    Off,
    /// Counting down once per second tick.
    Active,
    /// Reached zero; the alarm plays until dismissed.
    Alarm,
}

/// Timing and behaviour knobs of the state machine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TimerConfig {
    pub second_tick: Duration,
    pub inactivity_timeout: Duration,
    pub wake_guard: Duration,
    pub default_unit: TimeUnit,
}

impl TimerConfig {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            second_tick: DEFAULT_SECOND_TICK,
            inactivity_timeout: DEFAULT_INACTIVITY_TIMEOUT,
            wake_guard: DEFAULT_WAKE_GUARD,
            default_unit: DEFAULT_EDIT_UNIT,
        }
    }

    #[must_use]
    pub const fn with_second_tick(mut self, second_tick: Duration) -> Self {
        self.second_tick = second_tick;
        self
    }

    #[must_use]
    pub const fn with_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.inactivity_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn with_wake_guard(mut self, guard: Duration) -> Self {
        self.wake_guard = guard;
        self
    }

    #[must_use]
    pub const fn with_default_unit(mut self, unit: TimeUnit) -> Self {
        self.default_unit = unit;
        self
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// What the caller should do with the power rail after a tick.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerRequest {
    Stay,
    /// Enter low power until the wake edge, then call
    /// [`TimerStateMachine::notify_woken`].
    Sleep,
}

/// Result of one loop iteration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TickOutcome {
    pub state: TimerState,
    /// Frame to draw, when the visible value or marker changed.
    pub render: Option<RenderCommand>,
    pub power: PowerRequest,
    pub events: EventLog,
}

impl TickOutcome {
    fn idle(state: TimerState) -> Self {
        Self {
            state,
            render: None,
            power: PowerRequest::Stay,
            events: EventLog::new(),
        }
    }

    fn emit(&mut self, event: TimerEvent) {
        // A tick produces at most three events, well within the log capacity.
        let _ = self.events.push(event);
    }
}

/// Owns the countdown, the alarm and the edit state and drives them from
/// the injected clock and the input collaborators.
#[derive(Clone, Debug)]
pub struct TimerStateMachine {
    config: TimerConfig,
    state: TimerState,
    countdown: CountdownValue,
    alarm: AlarmSequencer,
    router: InputRouter,
    inactivity: ElapsedTimer,
    woken_at: Option<Millis>,
}

impl TimerStateMachine {
    /// Creates an idle machine at 00:00.
    #[must_use]
    pub fn new(config: TimerConfig) -> Self {
        Self::with_countdown(config, CountdownValue::default())
    }

    /// Creates an idle machine with a preset value.
    #[must_use]
    pub fn with_countdown(config: TimerConfig, countdown: CountdownValue) -> Self {
        Self {
            config,
            state: TimerState::Off,
            countdown,
            alarm: AlarmSequencer::new(),
            router: InputRouter::new(config.default_unit),
            inactivity: ElapsedTimer::new(),
            woken_at: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> TimerState {
        self.state
    }

    #[must_use]
    pub const fn config(&self) -> &TimerConfig {
        &self.config
    }

    #[must_use]
    pub const fn countdown(&self) -> &CountdownValue {
        &self.countdown
    }

    #[must_use]
    pub const fn alarm(&self) -> &AlarmSequencer {
        &self.alarm
    }

    /// Field the next rotation edits while off.
    #[must_use]
    pub const fn edit_unit(&self) -> TimeUnit {
        self.router.edit_state().current()
    }

    /// Returns `true` while input after a wake-up is still being discarded.
    #[must_use]
    pub fn in_wake_guard(&self, now: Millis) -> bool {
        self.woken_at
            .is_some_and(|at| now.wrapping_duration_since(at) < self.config.wake_guard)
    }

    /// Marks the end of a low-power wait that started after
    /// [`PowerRequest::Sleep`].
    pub fn notify_woken(&mut self, now: Millis) {
        self.woken_at = Some(now);
        self.inactivity.start(now);
    }

    /// Runs one iteration of the device loop.
    pub fn tick<E, K, B>(
        &mut self,
        now: Millis,
        encoder: &mut E,
        button: &mut K,
        buzzer: &mut B,
    ) -> TickOutcome
    where
        E: Encoder,
        K: Button,
        B: Buzzer,
    {
        if self.woken_at.is_some() {
            if self.in_wake_guard(now) {
                let _ = encoder.poll();
                let _ = button.poll();
                return TickOutcome::idle(self.state);
            }
            self.woken_at = None;
        }

        let entry_state = self.state;
        let mut outcome = TickOutcome::idle(entry_state);

        match entry_state {
            TimerState::Active => self.run_countdown(now, &mut outcome),
            TimerState::Off => self.run_editing(now, encoder, &mut outcome),
            TimerState::Alarm => self.run_alarm(now, encoder, button, buzzer, &mut outcome),
        }

        // The alarm owns the button while it sounds.
        if entry_state != TimerState::Alarm {
            self.handle_button(now, button.poll(), buzzer, &mut outcome);
        }

        outcome.state = self.state;
        outcome
    }

    fn run_countdown(&mut self, now: Millis, outcome: &mut TickOutcome) {
        if !self.countdown.elapsed(now, self.config.second_tick) {
            return;
        }

        let remaining = self.countdown.decrement();
        if self.countdown.time_is_up() {
            self.state = TimerState::Alarm;
            self.alarm.reset(now);
            outcome.emit(TimerEvent::AlarmStarted);
        } else {
            self.countdown.start(now);
            outcome.emit(TimerEvent::CountdownTick(remaining));
        }
        outcome.render = Some(self.frame(Underline::None));
    }

    fn run_editing<E: Encoder>(&mut self, now: Millis, encoder: &mut E, outcome: &mut TickOutcome) {
        match self.router.process_edit_input(&mut self.countdown, encoder) {
            EditOutcome::UnitChanged(unit) => {
                outcome.emit(TimerEvent::UnitSelected(unit));
            }
            EditOutcome::Adjusted(_) => {
                outcome.emit(TimerEvent::Adjusted(self.countdown.total_seconds()));
            }
            EditOutcome::Idle => {
                if self.inactivity.has_elapsed(now, self.config.inactivity_timeout) {
                    self.inactivity.start(now);
                    outcome.power = PowerRequest::Sleep;
                    outcome.emit(TimerEvent::SleepRequested);
                }
                return;
            }
        }

        self.inactivity.start(now);
        outcome.render = Some(self.frame(self.countdown.active_unit().into()));
    }

    fn run_alarm<E, K, B>(
        &mut self,
        now: Millis,
        encoder: &mut E,
        button: &mut K,
        buzzer: &mut B,
        outcome: &mut TickOutcome,
    ) where
        E: Encoder,
        K: Button,
        B: Buzzer,
    {
        self.alarm.play_alarm(now, buzzer);

        let pressed = button.poll() != ButtonEvent::NotPressed;
        let rotated = InputRouter::poll_rotation(&mut self.countdown, encoder) != Rotation::Idle;
        if rotated {
            // Rotation only dismisses; it must not leave an edit behind.
            self.countdown.set_seconds(0);
        }

        if pressed || rotated {
            self.alarm.silence(buzzer);
            self.return_to_editing();
            outcome.emit(TimerEvent::AlarmSilenced);
        }

        self.inactivity.start(now);
    }

    fn handle_button<B: Buzzer>(
        &mut self,
        now: Millis,
        event: ButtonEvent,
        buzzer: &mut B,
        outcome: &mut TickOutcome,
    ) {
        match self
            .router
            .classify_button(event, self.state, &self.countdown)
        {
            ButtonIntent::None => {}
            ButtonIntent::ToggleUnit(_) => {
                buzzer.tone(NOTE_F6_HZ, FEEDBACK_BEEP_DURATION);
            }
            ButtonIntent::Arm => {
                buzzer.tone(NOTE_A6_HZ, FEEDBACK_BEEP_DURATION);
                self.state = TimerState::Active;
                self.countdown.set_unit_seconds();
                self.countdown.start(now);
                outcome.render = Some(self.frame(Underline::None));
                outcome.emit(TimerEvent::Armed {
                    total_seconds: self.countdown.total_seconds(),
                });
            }
            ButtonIntent::Disarm => {
                buzzer.tone(NOTE_A6_HZ, FEEDBACK_BEEP_DURATION);
                self.return_to_editing();
                self.inactivity.start(now);
                outcome.emit(TimerEvent::Disarmed {
                    remaining_seconds: self.countdown.total_seconds(),
                });
            }
        }
    }

    /// Switches to `Off` and schedules the edit view redraw for the next tick.
    fn return_to_editing(&mut self) {
        self.state = TimerState::Off;
        self.router.reset_to_default();
    }

    fn frame(&self, underline: Underline) -> RenderCommand {
        RenderCommand::for_countdown(&self.countdown, underline)
    }
}

impl Default for TimerStateMachine {
    fn default() -> Self {
        Self::new(TimerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::NoopBuzzer;

    struct Still;

    impl Encoder for Still {
        fn poll(&mut self) -> Rotation {
            Rotation::Idle
        }
    }

    impl Button for Still {
        fn poll(&mut self) -> ButtonEvent {
            ButtonEvent::NotPressed
        }
    }

    struct Once<T: Copy> {
        value: Option<T>,
        rest: T,
    }

    impl Encoder for Once<Rotation> {
        fn poll(&mut self) -> Rotation {
            self.value.take().unwrap_or(self.rest)
        }
    }

    impl Button for Once<ButtonEvent> {
        fn poll(&mut self) -> ButtonEvent {
            self.value.take().unwrap_or(self.rest)
        }
    }

    fn press(event: ButtonEvent) -> Once<ButtonEvent> {
        Once {
            value: Some(event),
            rest: ButtonEvent::NotPressed,
        }
    }

    #[test]
    fn first_tick_draws_edit_view() {
        let mut machine = TimerStateMachine::default();
        let outcome = machine.tick(Millis::ZERO, &mut Still, &mut Still, &mut NoopBuzzer);

        assert_eq!(outcome.state, TimerState::Off);
        assert_eq!(
            outcome.render.map(|frame| frame.underline),
            Some(Underline::from(DEFAULT_EDIT_UNIT))
        );
        assert_eq!(
            outcome.events.as_slice(),
            &[TimerEvent::UnitSelected(DEFAULT_EDIT_UNIT)]
        );
    }

    #[test]
    fn long_press_at_zero_does_not_arm() {
        let mut machine = TimerStateMachine::default();
        let outcome = machine.tick(
            Millis::ZERO,
            &mut Still,
            &mut press(ButtonEvent::LongPressed),
            &mut NoopBuzzer,
        );
        assert_eq!(outcome.state, TimerState::Off);
    }

    #[test]
    fn arm_then_disarm_restores_edit_view() {
        let config = TimerConfig::new().with_default_unit(TimeUnit::Minutes);
        let mut machine = TimerStateMachine::with_countdown(config, CountdownValue::new(1, 0));
        machine.tick(Millis::ZERO, &mut Still, &mut Still, &mut NoopBuzzer);

        let outcome = machine.tick(
            Millis::from_raw(10),
            &mut Still,
            &mut press(ButtonEvent::LongPressed),
            &mut NoopBuzzer,
        );
        assert_eq!(outcome.state, TimerState::Active);
        assert_eq!(machine.countdown().active_unit(), TimeUnit::Seconds);
        assert_eq!(outcome.events.as_slice(), &[TimerEvent::Armed { total_seconds: 60 }]);

        let outcome = machine.tick(
            Millis::from_raw(500),
            &mut Still,
            &mut press(ButtonEvent::LongPressed),
            &mut NoopBuzzer,
        );
        assert_eq!(outcome.state, TimerState::Off);

        let outcome = machine.tick(Millis::from_raw(510), &mut Still, &mut Still, &mut NoopBuzzer);
        assert_eq!(
            outcome.render.map(|frame| frame.underline),
            Some(Underline::Minutes)
        );
        assert_eq!(machine.countdown().active_unit(), TimeUnit::Minutes);
    }

    #[test]
    fn rotation_while_active_is_ignored() {
        let mut machine =
            TimerStateMachine::with_countdown(TimerConfig::default(), CountdownValue::new(0, 30));
        machine.tick(Millis::ZERO, &mut Still, &mut press(ButtonEvent::LongPressed), &mut NoopBuzzer);

        let mut encoder = Once {
            value: Some(Rotation::Clockwise),
            rest: Rotation::Idle,
        };
        machine.tick(Millis::from_raw(100), &mut encoder, &mut Still, &mut NoopBuzzer);
        assert_eq!(machine.countdown().total_seconds(), 30);
    }

    #[test]
    fn wake_guard_discards_input() {
        let mut machine = TimerStateMachine::default();
        machine.tick(Millis::ZERO, &mut Still, &mut Still, &mut NoopBuzzer);
        machine.notify_woken(Millis::from_raw(20_000));

        let mut encoder = Once {
            value: Some(Rotation::Clockwise),
            rest: Rotation::Idle,
        };
        let outcome = machine.tick(Millis::from_raw(20_500), &mut encoder, &mut Still, &mut NoopBuzzer);
        assert!(outcome.render.is_none());
        assert!(machine.in_wake_guard(Millis::from_raw(20_999)));
        assert!(!machine.in_wake_guard(Millis::from_raw(21_000)));

        machine.tick(Millis::from_raw(21_000), &mut Still, &mut Still, &mut NoopBuzzer);
        assert_eq!(machine.countdown().total_seconds(), 0);
    }
}
