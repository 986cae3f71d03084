//! Debounced short/long press classification from raw pin levels.

use core::time::Duration;

use super::ButtonEvent;
use crate::clock::Millis;

/// Level changes shorter than this are treated as contact bounce.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);
/// Presses held at least this long are reported as long presses.
pub const DEFAULT_LONG_PRESS: Duration = Duration::from_millis(1_000);

/// Timing thresholds for [`PressClassifier`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PressConfig {
    debounce: Duration,
    long_press: Duration,
}

impl PressConfig {
    /// Creates a configuration with explicit thresholds.
    #[must_use]
    pub const fn new(debounce: Duration, long_press: Duration) -> Self {
        Self {
            debounce,
            long_press,
        }
    }

    /// Minimum time a level must hold before it is accepted.
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Hold time separating short from long presses.
    #[must_use]
    pub const fn long_press(&self) -> Duration {
        self.long_press
    }
}

impl Default for PressConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE, DEFAULT_LONG_PRESS)
    }
}

/// Turns sampled button levels into press events.
///
/// A press is reported once, on release, as short or long depending on how
/// long the debounced level stayed pressed.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PressClassifier {
    config: PressConfig,
    raw_pressed: bool,
    raw_changed_at: Millis,
    stable_pressed: bool,
    pressed_at: Option<Millis>,
}

impl PressClassifier {
    /// Creates a classifier that assumes the button starts released.
    #[must_use]
    pub const fn new(config: PressConfig) -> Self {
        Self {
            config,
            raw_pressed: false,
            raw_changed_at: Millis::ZERO,
            stable_pressed: false,
            pressed_at: None,
        }
    }

    /// Returns `true` while the debounced level is pressed.
    #[must_use]
    pub const fn is_pressed(&self) -> bool {
        self.stable_pressed
    }

    /// Feeds one sample and returns the press completed by it, if any.
    pub fn update(&mut self, now: Millis, raw_pressed: bool) -> ButtonEvent {
        if raw_pressed != self.raw_pressed {
            self.raw_pressed = raw_pressed;
            self.raw_changed_at = now;
            return ButtonEvent::NotPressed;
        }

        if raw_pressed == self.stable_pressed
            || now.wrapping_duration_since(self.raw_changed_at) < self.config.debounce
        {
            return ButtonEvent::NotPressed;
        }

        self.stable_pressed = raw_pressed;
        if raw_pressed {
            self.pressed_at = Some(self.raw_changed_at);
            return ButtonEvent::NotPressed;
        }

        match self.pressed_at.take() {
            Some(pressed_at) => {
                let held = self.raw_changed_at.wrapping_duration_since(pressed_at);
                if held >= self.config.long_press {
                    ButtonEvent::LongPressed
                } else {
                    ButtonEvent::ShortPressed
                }
            }
            None => ButtonEvent::NotPressed,
        }
    }
}

impl Default for PressClassifier {
    fn default() -> Self {
        Self::new(PressConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(classifier: &mut PressClassifier, from: u32, to: u32, pressed: bool) -> ButtonEvent {
        let mut last = ButtonEvent::NotPressed;
        for ms in from..to {
            let event = classifier.update(Millis::from_raw(ms), pressed);
            if event != ButtonEvent::NotPressed {
                last = event;
            }
        }
        last
    }

    #[test]
    fn short_press_reported_on_release() {
        let mut classifier = PressClassifier::default();
        assert_eq!(feed(&mut classifier, 0, 300, true), ButtonEvent::NotPressed);
        assert!(classifier.is_pressed());
        assert_eq!(feed(&mut classifier, 300, 500, false), ButtonEvent::ShortPressed);
        assert!(!classifier.is_pressed());
    }

    #[test]
    fn long_press_reported_after_threshold() {
        let mut classifier = PressClassifier::default();
        feed(&mut classifier, 0, 1_200, true);
        assert_eq!(feed(&mut classifier, 1_200, 1_400, false), ButtonEvent::LongPressed);
    }

    #[test]
    fn bounce_shorter_than_debounce_is_ignored() {
        let mut classifier = PressClassifier::default();
        assert_eq!(feed(&mut classifier, 0, 40, true), ButtonEvent::NotPressed);
        assert_eq!(feed(&mut classifier, 40, 400, false), ButtonEvent::NotPressed);
        assert!(!classifier.is_pressed());
    }

    #[test]
    fn release_glitch_does_not_end_press() {
        let mut classifier = PressClassifier::default();
        feed(&mut classifier, 0, 600, true);
        assert_eq!(feed(&mut classifier, 600, 620, false), ButtonEvent::NotPressed);
        feed(&mut classifier, 620, 1_300, true);
        assert_eq!(feed(&mut classifier, 1_300, 1_500, false), ButtonEvent::LongPressed);
    }

    #[test]
    fn custom_thresholds_apply() {
        let config = PressConfig::new(Duration::from_millis(20), Duration::from_millis(300));
        let mut classifier = PressClassifier::new(config);
        feed(&mut classifier, 0, 350, true);
        assert_eq!(feed(&mut classifier, 350, 400, false), ButtonEvent::LongPressed);
    }
}
