//! Board peripherals behind the `timer-core` collaborator traits.
//!
//! Pin map (STM32G0B1KE):
//! - PB6/PB7: I2C1 SCL/SDA to the SSD1306 panel
//! - PB4/PB5: TIM3 CH1/CH2 quadrature input from the encoder
//! - PA0: encoder push button, active low, EXTI0 wake source
//! - PA15: TIM2 CH1 PWM to the piezo

#![cfg_attr(not(target_os = "none"), allow(dead_code))]

use core::fmt;

use timer_core::display::DisplayLayout;

#[cfg(target_os = "none")]
pub mod button;
#[cfg(target_os = "none")]
pub mod buzzer;
#[cfg(target_os = "none")]
pub mod display;
#[cfg(target_os = "none")]
pub mod encoder;
#[cfg(target_os = "none")]
pub mod power;

pub const PANEL_WIDTH: i32 = 128;
#[cfg(not(feature = "display-y32"))]
pub const PANEL_HEIGHT: i32 = 64;
#[cfg(feature = "display-y32")]
pub const PANEL_HEIGHT: i32 = 32;

/// Cell size of `FONT_10X20`.
pub const GLYPH_WIDTH: i32 = 10;
pub const GLYPH_HEIGHT: i32 = 20;

pub const LAYOUT: DisplayLayout =
    DisplayLayout::new(PANEL_WIDTH, PANEL_HEIGHT, GLYPH_WIDTH, GLYPH_HEIGHT);

/// Failure talking to the OLED panel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PanelError {
    /// The I2C transfer to the controller failed.
    Bus,
    /// Drawing into the frame buffer failed.
    Draw,
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::Bus => f.write_str("panel bus error"),
            PanelError::Draw => f.write_str("frame buffer draw error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use timer_core::display::Underline;

    #[test]
    fn frame_fits_on_panel() {
        assert!(LAYOUT.origin_x >= 0);
        assert!(LAYOUT.line_y < PANEL_HEIGHT);
        let (_, end) = LAYOUT
            .underline_span(Underline::Seconds)
            .expect("seconds underline");
        assert!(end < PANEL_WIDTH);
    }
}
