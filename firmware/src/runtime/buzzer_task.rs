use embassy_futures::select::{Either, select};
use embassy_time::Timer;

use crate::clock::core_duration_to_embassy;
use crate::hw::buzzer::PwmBuzzer;
use crate::tone::{ToneRequest, ToneSignal};

/// Plays tone requests; a tone ends when its duration passes or when the
/// next request arrives, whichever is first.
#[embassy_executor::task]
pub async fn run(mut buzzer: PwmBuzzer, tones: &'static ToneSignal) -> ! {
    let mut pending = None;
    loop {
        let request = match pending.take() {
            Some(request) => request,
            None => tones.wait().await,
        };

        match request {
            ToneRequest::Stop => buzzer.silence(),
            ToneRequest::Play {
                frequency_hz,
                duration,
            } => {
                buzzer.start(frequency_hz);
                match select(Timer::after(core_duration_to_embassy(duration)), tones.wait()).await {
                    Either::First(()) => buzzer.silence(),
                    Either::Second(next) => pending = Some(next),
                }
            }
        }
    }
}
