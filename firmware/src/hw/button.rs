//! Encoder push button on an EXTI line.

use embassy_stm32::exti::ExtiInput;
use embassy_time::Instant;
use timer_core::input::{Button, ButtonEvent, PressClassifier, PressConfig};

use crate::clock::millis_from_instant;

pub struct ExtiButton {
    input: ExtiInput<'static>,
    classifier: PressClassifier,
}

impl ExtiButton {
    pub fn new(input: ExtiInput<'static>, config: PressConfig) -> Self {
        Self {
            input,
            classifier: PressClassifier::new(config),
        }
    }

    /// Waits for the press that wakes the device.
    pub async fn wait_for_press(&mut self) {
        self.input.wait_for_falling_edge().await;
    }
}

impl Button for ExtiButton {
    fn poll(&mut self) -> ButtonEvent {
        // Pulled up; pressing shorts the line to ground.
        let pressed = self.input.is_low();
        self.classifier
            .update(millis_from_instant(Instant::now()), pressed)
    }
}
