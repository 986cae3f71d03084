use embassy_time::{Duration, Ticker};
use timer_core::alarm::Buzzer;
use timer_core::display::Display;
use timer_core::events::TimerEvent;
use timer_core::machine::{PowerRequest, TimerConfig, TimerStateMachine};

use crate::clock;
use crate::hw::button::ExtiButton;
use crate::hw::display::OledDisplay;
use crate::hw::encoder::QeiEncoder;
use crate::hw::power::sleep_until_pressed;
use crate::logging::{log_display_error, log_events};
use crate::tone::{SignalBuzzer, ToneSignal};

/// Loop period; well below the debounce window so presses are sampled often.
const POLL_INTERVAL: Duration = Duration::from_millis(2);

#[embassy_executor::task]
pub async fn run(
    config: TimerConfig,
    mut display: OledDisplay,
    mut encoder: QeiEncoder,
    mut button: ExtiButton,
    tones: &'static ToneSignal,
) -> ! {
    let mut machine = TimerStateMachine::new(config);
    let mut buzzer = SignalBuzzer::new(tones);
    let mut ticker = Ticker::every(POLL_INTERVAL);

    loop {
        let now = clock::now();
        let outcome = machine.tick(now, &mut encoder, &mut button, &mut buzzer);
        log_events(now, &outcome.events);

        if let Some(frame) = &outcome.render {
            if let Err(err) = display.render(frame) {
                log_display_error(err);
            }
        }

        if outcome.power == PowerRequest::Sleep {
            buzzer.stop();
            sleep_until_pressed(&mut display, &mut button).await;
            encoder.resync();
            let woken_at = clock::now();
            machine.notify_woken(woken_at);
            log_events(woken_at, &[TimerEvent::Woken]);
            ticker.reset();
        }

        ticker.next().await;
    }
}
