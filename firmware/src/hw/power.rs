//! Low-power wait between interactions.
//!
//! The panel is put into power save and the loop parks on the button's EXTI
//! edge. With nothing else pending the thread-mode executor issues WFE, so the
//! core stays asleep until the press arrives.

use embassy_time::Timer;
use timer_core::display::Display;

use super::PanelError;
use super::button::ExtiButton;
use crate::logging::log_display_error;

/// Settling time around the panel power transitions.
const PANEL_SETTLE: embassy_time::Duration = embassy_time::Duration::from_millis(20);

/// Blanks the panel, waits for a button press and restores the panel.
pub async fn sleep_until_pressed<D>(panel: &mut D, button: &mut ExtiButton)
where
    D: Display<Error = PanelError>,
{
    if let Err(err) = panel.set_power_save(true) {
        log_display_error(err);
    }
    Timer::after(PANEL_SETTLE).await;

    button.wait_for_press().await;

    Timer::after(PANEL_SETTLE).await;
    if let Err(err) = panel.set_power_save(false) {
        log_display_error(err);
    }
}
