//! Quadrature encoder read through the TIM3 encoder interface.

use embassy_stm32::peripherals::TIM3;
use embassy_stm32::timer::qei::Qei;
use timer_core::input::{DetentDecoder, Encoder, Rotation};

pub struct QeiEncoder {
    qei: Qei<'static, TIM3>,
    decoder: DetentDecoder,
}

impl QeiEncoder {
    pub fn new(qei: Qei<'static, TIM3>) -> Self {
        Self {
            qei,
            decoder: DetentDecoder::new(),
        }
    }

    /// Drops partial steps accumulated before a sleep.
    pub fn resync(&mut self) {
        self.decoder.resync();
    }
}

impl Encoder for QeiEncoder {
    fn poll(&mut self) -> Rotation {
        self.decoder.update(self.qei.count())
    }
}
