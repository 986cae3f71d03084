use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{OutputType, Pull};
use embassy_stm32::i2c::{self, I2c};
use embassy_stm32::time::Hertz;
use embassy_stm32::timer::low_level::CountingMode;
use embassy_stm32::timer::qei::{Qei, QeiPin};
use embassy_stm32::timer::simple_pwm::{PwmPin, SimplePwm};
use timer_core::input::PressConfig;
use timer_core::machine::TimerConfig;

use crate::hw::button::ExtiButton;
use crate::hw::buzzer::PwmBuzzer;
use crate::hw::display::OledDisplay;
use crate::hw::encoder::QeiEncoder;
use crate::logging::log_boot;
use crate::tone::ToneSignal;

mod buzzer_task;
mod timer_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

pub(super) static TONES: ToneSignal = ToneSignal::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        I2C1,
        PB6,
        PB7,
        TIM3,
        PB4,
        PB5,
        PA0,
        EXTI0,
        TIM2,
        PA15,
        ..
    } = hal::init(config);

    let i2c = I2c::new_blocking(I2C1, PB6, PB7, Hertz::khz(400), i2c::Config::default());
    let display = OledDisplay::new(i2c).expect("display init");

    let encoder = QeiEncoder::new(Qei::new(TIM3, QeiPin::new_ch1(PB4), QeiPin::new_ch2(PB5)));
    let button = ExtiButton::new(ExtiInput::new(PA0, EXTI0, Pull::Up), PressConfig::default());

    let pwm = SimplePwm::new(
        TIM2,
        Some(PwmPin::new(PA15, OutputType::PushPull)),
        None,
        None,
        None,
        Hertz::khz(1),
        CountingMode::EdgeAlignedUp,
    );

    let timer_config = TimerConfig::default();
    log_boot(&timer_config);

    spawner
        .spawn(buzzer_task::run(PwmBuzzer::new(pwm), &TONES))
        .expect("failed to spawn buzzer task");

    spawner
        .spawn(timer_task::run(timer_config, display, encoder, button, &TONES))
        .expect("failed to spawn timer task");

    core::future::pending::<()>().await;
}
