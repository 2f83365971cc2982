// SPDX-License-Identifier: GPL-3.0-or-later
use std::fmt;

use super::color::Color;
use crate::settings::Palette;

/// The number of entries in a lookup table.
pub(crate) const LUT_SIZE: usize = 256;

/// A control point for a piecewise-linear color ramp.
#[derive(Clone, Copy, Debug)]
struct Stop {
    position: f64,
    color: Color,
}

const fn stop(position: f64, red: u8, green: u8, blue: u8) -> Stop {
    Stop {
        position,
        color: Color::new(red, green, blue),
    }
}

/// The "ironbow" palette commonly used by thermal cameras: black through purple, red, orange and
/// yellow to white.
const IRONBOW: [Stop; 10] = [
    stop(0.00, 0, 0, 0),
    stop(0.10, 32, 0, 64),
    stop(0.25, 96, 0, 128),
    stop(0.40, 192, 0, 64),
    stop(0.50, 220, 40, 0),
    stop(0.60, 255, 100, 0),
    stop(0.70, 255, 160, 0),
    stop(0.80, 255, 220, 40),
    stop(0.90, 255, 255, 128),
    stop(1.00, 255, 255, 255),
];

/// A precomputed table mapping normalized values to colors.
///
/// Tables are built once and then only read, so they can be shared freely between renders.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ColorLut {
    entries: Box<[Color; LUT_SIZE]>,
}

impl ColorLut {
    /// Build the ironbow table.
    pub(crate) fn ironbow() -> Self {
        Self::from_stops(&IRONBOW)
    }

    /// Sample a [colorous] gradient at evenly spaced points.
    pub(crate) fn from_gradient(gradient: colorous::Gradient) -> Self {
        let mut entries = Box::new([Color::default(); LUT_SIZE]);
        for (index, entry) in entries.iter_mut().enumerate() {
            *entry = Color::from(gradient.eval_rational(index, LUT_SIZE));
        }
        Self { entries }
    }

    fn from_stops(stops: &[Stop]) -> Self {
        let mut entries = Box::new([Color::default(); LUT_SIZE]);
        for (index, entry) in entries.iter_mut().enumerate() {
            let t = index as f64 / (LUT_SIZE - 1) as f64;
            let segment = stops
                .windows(2)
                .find(|pair| pair[0].position <= t && t <= pair[1].position);
            *entry = match segment {
                Some(pair) => interpolate(&pair[0], &pair[1], t),
                // Only reachable if the stops don't cover [0, 1].
                None => stops.last().map(|s| s.color).unwrap_or_default(),
            };
        }
        Self { entries }
    }

    /// The color for a value already scaled to `[0, 1]`.
    ///
    /// Values outside that range are clamped, and NaN maps to the first entry.
    pub(crate) fn lookup(&self, normalized: f64) -> Color {
        let normalized = if normalized.is_finite() {
            normalized.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let index = (normalized * (LUT_SIZE - 1) as f64).round() as usize;
        self.entries[index]
    }

    #[cfg(test)]
    pub(crate) fn entry(&self, index: u8) -> Color {
        self.entries[index as usize]
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Color> {
        self.entries.iter()
    }
}

impl Default for ColorLut {
    fn default() -> Self {
        Self::ironbow()
    }
}

impl From<&Palette> for ColorLut {
    fn from(palette: &Palette) -> Self {
        match palette {
            Palette::Ironbow => Self::ironbow(),
            Palette::Gradient(gradient) => Self::from_gradient(*gradient),
        }
    }
}

impl fmt::Debug for ColorLut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorLut")
            .field("first", &self.entries[0])
            .field("last", &self.entries[LUT_SIZE - 1])
            .finish()
    }
}

fn interpolate(low: &Stop, high: &Stop, t: f64) -> Color {
    let span = high.position - low.position;
    let fraction = if span > 0.0 {
        (t - low.position) / span
    } else {
        0.0
    };
    let channel = |low: u8, high: u8| -> u8 {
        let low = low as f64;
        let high = high as f64;
        (low + fraction * (high - low)).round() as u8
    };
    Color::new(
        channel(low.color.red(), high.color.red()),
        channel(low.color.green(), high.color.green()),
        channel(low.color.blue(), high.color.blue()),
    )
}
