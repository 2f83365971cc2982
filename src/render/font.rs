// SPDX-License-Identifier: GPL-3.0-or-later
use embedded_graphics::mono_font::ascii::FONT_5X8;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use image::{GrayImage, Luma};

use std::convert::{Infallible, TryFrom};

/// The height of a line of text, in pixels.
pub(crate) const GLYPH_HEIGHT: u32 = FONT_5X8.character_size.height;

/// A coverage mask that text can be drawn onto.
struct Mask(GrayImage);

impl OriginDimensions for Mask {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for Mask {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (width, height) = self.0.dimensions();
        for Pixel(point, color) in pixels {
            if color.is_off() {
                continue;
            }
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                if x < width && y < height {
                    self.0.put_pixel(x, y, Luma([u8::MAX]));
                }
            }
        }
        Ok(())
    }
}

/// The width of the rendered text.
pub(crate) fn text_width(text: &str) -> u32 {
    let count = text.chars().count() as u32;
    count * FONT_5X8.character_size.width + count.saturating_sub(1) * FONT_5X8.character_spacing
}

/// Render text onto a coverage mask, with 255 wherever the text is drawn.
pub(crate) fn render_text(text: &str) -> GrayImage {
    let mut mask = Mask(GrayImage::new(text_width(text), GLYPH_HEIGHT));
    let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
    let text = Text::with_baseline(text, Point::zero(), style, Baseline::Top);
    match text.draw(&mut mask) {
        Ok(_) => mask.0,
        Err(never) => match never {},
    }
}
