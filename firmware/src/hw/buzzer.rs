//! Piezo driven by a 50% duty square wave on TIM2 CH1.

use embassy_stm32::peripherals::TIM2;
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::simple_pwm::SimplePwm;

pub struct PwmBuzzer {
    pwm: SimplePwm<'static, TIM2>,
}

impl PwmBuzzer {
    pub fn new(mut pwm: SimplePwm<'static, TIM2>) -> Self {
        pwm.ch1().disable();
        Self { pwm }
    }

    pub fn start(&mut self, frequency_hz: u16) {
        self.pwm.set_frequency(Hertz::hz(u32::from(frequency_hz)));
        let mut channel = self.pwm.ch1();
        channel.set_duty_cycle_fraction(1, 2);
        channel.enable();
    }

    pub fn silence(&mut self) {
        let mut channel = self.pwm.ch1();
        channel.set_duty_cycle_fully_off();
        channel.disable();
    }
}
