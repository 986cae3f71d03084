//! Log sinks: defmt over RTT on the MCU, stdout on host builds.

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use timer_core::clock::Millis;
use timer_core::events::TimerEvent;
use timer_core::machine::TimerConfig;

use crate::hw::PanelError;

#[cfg(target_os = "none")]
pub fn log_boot(config: &TimerConfig) {
    defmt::info!(
        "kitchen-timer: boot tick={=u64}ms timeout={=u64}ms edit={}",
        duration_millis(config.second_tick),
        duration_millis(config.inactivity_timeout),
        config.default_unit
    );
}

#[cfg(not(target_os = "none"))]
pub fn log_boot(config: &TimerConfig) {
    println!(
        "kitchen-timer: boot tick={}ms timeout={}ms edit={}",
        duration_millis(config.second_tick),
        duration_millis(config.inactivity_timeout),
        config.default_unit.label()
    );
}

#[cfg(target_os = "none")]
pub fn log_events(now: Millis, events: &[TimerEvent]) {
    for event in events {
        defmt::info!("timer: {} t={=u32}ms", event, now.as_u32());
    }
}

#[cfg(not(target_os = "none"))]
pub fn log_events(now: Millis, events: &[TimerEvent]) {
    for event in events {
        println!("timer: {event} t={}ms", now.as_u32());
    }
}

#[cfg(target_os = "none")]
pub fn log_display_error(err: PanelError) {
    defmt::warn!("display: {}", defmt::Display2Format(&err));
}

#[cfg(not(target_os = "none"))]
pub fn log_display_error(err: PanelError) {
    println!("display: {err}");
}

fn duration_millis(duration: core::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
