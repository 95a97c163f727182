//! SSD1306 status panel
//!
//! 128x64 panel in buffered graphics mode. Each menu row is 12 px tall
//! and drawn in the 7x10 font, so 18 characters fit across.

use embassy_stm32::i2c::{I2c, Master};
use embassy_stm32::mode::Blocking;
use embedded_graphics::mono_font::ascii::FONT_7X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};

use quadpulse_core::display::Span;
use quadpulse_core::settings::NUM_SETTINGS;
use quadpulse_core::traits::{DisplayError, StatusDisplay};

/// Glyph width in pixels
const CHAR_WIDTH: i32 = 7;

/// Row pitch in pixels
const ROW_HEIGHT: i32 = 12;

/// Panel width in pixels
const PANEL_WIDTH: u32 = 128;

type Panel = Ssd1306<
    I2CInterface<I2c<'static, Blocking, Master>>,
    DisplaySize128x64,
    BufferedGraphicsMode<DisplaySize128x64>,
>;

/// Menu renderer on an SSD1306
pub struct OledStatus {
    panel: Panel,
}

impl OledStatus {
    /// Initialise the panel and clear it
    pub fn new(i2c: I2c<'static, Blocking, Master>) -> Result<Self, DisplayError> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        panel.init().map_err(|_| DisplayError::Bus)?;
        panel.clear_buffer();
        panel.flush().map_err(|_| DisplayError::Bus)?;
        Ok(Self { panel })
    }
}

impl StatusDisplay for OledStatus {
    fn draw_row(&mut self, row: usize, spans: &[Span]) -> Result<(), DisplayError> {
        if row >= NUM_SETTINGS {
            return Err(DisplayError::OutOfBounds);
        }

        let top = row as i32 * ROW_HEIGHT;
        Rectangle::new(Point::new(0, top), Size::new(PANEL_WIDTH, ROW_HEIGHT as u32))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
            .draw(&mut self.panel)
            .map_err(|_| DisplayError::Bus)?;

        let mut x = 0;
        for span in spans {
            let width = span.text.len() as i32 * CHAR_WIDTH;
            let area = Rectangle::new(Point::new(x, top), Size::new(width as u32, ROW_HEIGHT as u32));

            let text_color = if span.style.inverted {
                area.into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
                    .draw(&mut self.panel)
                    .map_err(|_| DisplayError::Bus)?;
                BinaryColor::Off
            } else {
                BinaryColor::On
            };

            Text::with_baseline(
                &span.text,
                Point::new(x, top + 1),
                MonoTextStyle::new(&FONT_7X10, text_color),
                Baseline::Top,
            )
            .draw(&mut self.panel)
            .map_err(|_| DisplayError::Bus)?;

            if span.style.boxed {
                area.into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
                    .draw(&mut self.panel)
                    .map_err(|_| DisplayError::Bus)?;
            }

            x += width;
        }

        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.panel.flush().map_err(|_| DisplayError::Bus)
    }
}
