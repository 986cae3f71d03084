//! Display seam and `MM:SS` frame geometry.

use core::fmt::Write as _;

use heapless::String;

use crate::countdown::{CountdownValue, TimeUnit};

/// Which field, if any, is marked as being edited.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Underline {
    None,
    Minutes,
    Seconds,
}

impl From<TimeUnit> for Underline {
    fn from(unit: TimeUnit) -> Self {
        match unit {
            TimeUnit::Minutes => Underline::Minutes,
            TimeUnit::Seconds => Underline::Seconds,
        }
    }
}

/// One full frame: the remaining time plus the optional edit marker.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RenderCommand {
    pub minutes: u8,
    pub seconds: u8,
    pub underline: Underline,
}

impl RenderCommand {
    /// Builds a frame for the current countdown value.
    #[must_use]
    pub fn for_countdown(countdown: &CountdownValue, underline: Underline) -> Self {
        Self {
            minutes: u8::try_from(countdown.minutes()).unwrap_or(u8::MAX),
            seconds: u8::try_from(countdown.seconds()).unwrap_or(u8::MAX),
            underline,
        }
    }

    /// Formats the frame as zero-padded `MM:SS`.
    #[must_use]
    pub fn text(&self) -> String<5> {
        let mut text = String::new();
        // Five bytes always fit two two-digit fields and the colon.
        let _ = write!(text, "{:02}:{:02}", self.minutes % 100, self.seconds % 100);
        text
    }
}

/// Output panel that shows the countdown.
pub trait Display {
    type Error;

    /// Clears the panel and draws `command`.
    fn render(&mut self, command: &RenderCommand) -> Result<(), Self::Error>;

    /// Enters or leaves the panel's power-save mode.
    fn set_power_save(&mut self, _enabled: bool) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Character cell geometry of a centered `MM:SS` frame.
///
/// Coordinates are in pixels with the origin at the top-left corner. The text
/// baseline sits below the vertical center so the glyphs appear centered, and
/// the underline runs two pixels under the baseline across two glyphs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DisplayLayout {
    pub origin_x: i32,
    pub baseline_y: i32,
    pub minutes_line_x: i32,
    pub seconds_line_x: i32,
    pub line_y: i32,
    pub line_width: i32,
}

impl DisplayLayout {
    /// Glyph count of the `MM:SS` text.
    pub const TEXT_GLYPHS: i32 = 5;

    /// Computes the layout for a `width`x`height` panel and a monospace font.
    #[must_use]
    pub const fn new(width: i32, height: i32, glyph_width: i32, glyph_height: i32) -> Self {
        let origin_x = (width - Self::TEXT_GLYPHS * glyph_width) / 2;
        let baseline_y = (height + glyph_height) / 2;
        Self {
            origin_x,
            baseline_y,
            minutes_line_x: origin_x,
            seconds_line_x: origin_x + 3 * glyph_width,
            line_y: baseline_y + 2,
            line_width: 2 * glyph_width,
        }
    }

    /// Start and end x coordinates of the underline, if one is drawn.
    #[must_use]
    pub const fn underline_span(&self, underline: Underline) -> Option<(i32, i32)> {
        let start = match underline {
            Underline::None => return None,
            Underline::Minutes => self.minutes_line_x,
            Underline::Seconds => self.seconds_line_x,
        };
        Some((start, start + self.line_width - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_zero_padded() {
        let frame = RenderCommand {
            minutes: 3,
            seconds: 7,
            underline: Underline::None,
        };
        assert_eq!(frame.text().as_str(), "03:07");
    }

    #[test]
    fn frame_tracks_countdown_fields() {
        let countdown = CountdownValue::new(59, 59);
        let frame = RenderCommand::for_countdown(&countdown, Underline::from(TimeUnit::Minutes));
        assert_eq!((frame.minutes, frame.seconds), (59, 59));
        assert_eq!(frame.underline, Underline::Minutes);
        assert_eq!(frame.text().as_str(), "59:59");
    }

    #[test]
    fn layout_centers_text_on_tall_panel() {
        let layout = DisplayLayout::new(128, 64, 10, 20);
        assert_eq!(layout.origin_x, 39);
        assert_eq!(layout.baseline_y, 42);
        assert_eq!(layout.underline_span(Underline::Minutes), Some((39, 58)));
        assert_eq!(layout.underline_span(Underline::Seconds), Some((69, 88)));
        assert_eq!(layout.underline_span(Underline::None), None);
    }

    #[test]
    fn layout_fits_short_panel() {
        let layout = DisplayLayout::new(128, 32, 10, 20);
        assert_eq!(layout.baseline_y, 26);
        assert_eq!(layout.line_y, 28);
    }
}
