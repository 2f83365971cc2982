// SPDX-License-Identifier: GPL-3.0-or-later
use image::Rgba;

/// An opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

impl From<colorous::Color> for Color {
    fn from(other_color: colorous::Color) -> Self {
        Color {
            red: other_color.r,
            green: other_color.g,
            blue: other_color.b,
        }
    }
}

impl From<&Rgba<u8>> for Color {
    fn from(pixel: &Rgba<u8>) -> Self {
        Self::new(pixel[0], pixel[1], pixel[2])
    }
}

impl From<Color> for Rgba<u8> {
    fn from(color: Color) -> Self {
        Rgba([color.red, color.green, color.blue, u8::MAX])
    }
}

impl Color {
    pub(crate) const BLACK: Self = Self {
        red: u8::MIN,
        green: u8::MIN,
        blue: u8::MIN,
    };

    pub(crate) const WHITE: Self = Self {
        red: u8::MAX,
        green: u8::MAX,
        blue: u8::MAX,
    };

    /// Create a new [Color] with the given 8-bit color values.
    pub(crate) const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub(crate) fn red(&self) -> u8 {
        self.red
    }

    pub(crate) fn green(&self) -> u8 {
        self.green
    }

    pub(crate) fn blue(&self) -> u8 {
        self.blue
    }

    /// The perceived brightness of the color on a 0-255 scale, using the Rec. 601 luma weights.
    pub(crate) fn brightness(&self) -> f32 {
        0.299 * self.red as f32 + 0.587 * self.green as f32 + 0.114 * self.blue as f32
    }

    /// Treating this color as the background, pick either black or white to draw on top of it.
    pub(crate) fn foreground_color(&self) -> Self {
        if self.brightness() > 128.0 {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }
}
