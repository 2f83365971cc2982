// SPDX-License-Identifier: GPL-3.0-or-later
use image::{imageops, Pixel, Rgba, RgbaImage};
use tracing::instrument;

use super::autoscale::ScaleRange;
use super::color::Color;
use super::font::{self, GLYPH_HEIGHT};
use super::lut::ColorLut;

pub(crate) const LEGEND_WIDTH: u32 = 48;
pub(crate) const LEGEND_HEIGHT: u32 = 200;
const BAR_WIDTH: u32 = 14;
const LABEL_LEFT: u32 = BAR_WIDTH + 2;
const LABEL_COLOR: Color = Color::new(0xEE, 0xEE, 0xEE);

/// Format a temperature for the legend with one decimal place, rounding halves away from zero.
pub(crate) fn format_label(value: f32) -> String {
    let rounded = (value as f64 * 10.0).round() / 10.0;
    format!("{:.1}", rounded)
}

/// Render the color scale: a vertical gradient bar with the maximum at the top, and the maximum,
/// midpoint and minimum temperatures printed beside it.
///
/// Areas not covered by the bar or the labels are transparent.
#[instrument(level = "trace", skip(lut))]
pub(crate) fn render_legend(scale: ScaleRange, lut: &ColorLut) -> RgbaImage {
    let mut legend = RgbaImage::new(LEGEND_WIDTH, LEGEND_HEIGHT);
    let last_row = (LEGEND_HEIGHT - 1) as f64;
    for y in 0..LEGEND_HEIGHT {
        let color: Rgba<u8> = lut.lookup(1.0 - y as f64 / last_row).into();
        for x in 0..BAR_WIDTH {
            legend.put_pixel(x, y, color);
        }
    }
    // Baselines for the top, middle and bottom labels.
    let labels = [
        (scale.max, 10),
        (scale.midpoint(), LEGEND_HEIGHT / 2 + 4),
        (scale.min, LEGEND_HEIGHT - 2),
    ];
    for (value, baseline) in labels.iter() {
        draw_label(&mut legend, &format_label(*value), baseline - GLYPH_HEIGHT);
    }
    legend
}

fn draw_label(legend: &mut RgbaImage, text: &str, top: u32) {
    let mask = font::render_text(text);
    let mut text_layer = RgbaImage::new(mask.width(), mask.height());
    text_layer
        .pixels_mut()
        .zip(mask.pixels())
        .filter(|(_, coverage)| coverage[0] != 0)
        .for_each(|(pixel, coverage)| {
            let mut text_color: Rgba<u8> = LABEL_COLOR.into();
            text_color.channels_mut()[3] = coverage[0];
            *pixel = text_color;
        });
    imageops::overlay(legend, &text_layer, LABEL_LEFT, top);
}
