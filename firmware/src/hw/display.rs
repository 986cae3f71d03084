//! SSD1306 panel drawing the countdown with embedded-graphics.

use embassy_stm32::i2c::I2c;
use embassy_stm32::mode::Blocking;
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};
use timer_core::display::{Display, RenderCommand};

use super::{LAYOUT, PanelError};

#[cfg(not(feature = "display-y32"))]
type PanelSize = DisplaySize128x64;
#[cfg(feature = "display-y32")]
type PanelSize = DisplaySize128x32;

type Panel = Ssd1306<I2CInterface<I2c<'static, Blocking>>, PanelSize, BufferedGraphicsMode<PanelSize>>;

pub struct OledDisplay {
    panel: Panel,
    text_style: MonoTextStyle<'static, BinaryColor>,
    line_style: PrimitiveStyle<BinaryColor>,
}

impl OledDisplay {
    /// Initialises the controller and clears the screen.
    pub fn new(i2c: I2c<'static, Blocking>) -> Result<Self, PanelError> {
        let interface = I2CDisplayInterface::new(i2c);
        #[cfg(not(feature = "display-y32"))]
        let size = DisplaySize128x64;
        #[cfg(feature = "display-y32")]
        let size = DisplaySize128x32;

        let mut panel =
            Ssd1306::new(interface, size, DisplayRotation::Rotate0).into_buffered_graphics_mode();
        panel.init().map_err(|_| PanelError::Bus)?;
        panel.clear_buffer();
        panel.flush().map_err(|_| PanelError::Bus)?;

        Ok(Self {
            panel,
            text_style: MonoTextStyleBuilder::new()
                .font(&FONT_10X20)
                .text_color(BinaryColor::On)
                .build(),
            line_style: PrimitiveStyle::with_stroke(BinaryColor::On, 1),
        })
    }
}

impl Display for OledDisplay {
    type Error = PanelError;

    fn render(&mut self, command: &RenderCommand) -> Result<(), Self::Error> {
        self.panel.clear_buffer();

        let text = command.text();
        Text::with_baseline(
            &text,
            Point::new(LAYOUT.origin_x, LAYOUT.baseline_y),
            self.text_style,
            Baseline::Alphabetic,
        )
        .draw(&mut self.panel)
        .map_err(|_| PanelError::Draw)?;

        if let Some((start, end)) = LAYOUT.underline_span(command.underline) {
            Line::new(Point::new(start, LAYOUT.line_y), Point::new(end, LAYOUT.line_y))
                .into_styled(self.line_style)
                .draw(&mut self.panel)
                .map_err(|_| PanelError::Draw)?;
        }

        self.panel.flush().map_err(|_| PanelError::Bus)
    }

    fn set_power_save(&mut self, enabled: bool) -> Result<(), Self::Error> {
        self.panel
            .set_display_on(!enabled)
            .map_err(|_| PanelError::Bus)
    }
}
