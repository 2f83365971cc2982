// SPDX-License-Identifier: GPL-3.0-or-later
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::instrument;

use super::autoscale::ScaleRange;
use super::color::Color;
use super::lut::ColorLut;
use super::resize::Method;
use crate::frame::{ThermalFrame, GRID_SIZE};

/// Ranges narrower than this are treated as flat, to avoid dividing by (nearly) zero.
const MIN_RANGE: f64 = 0.01;

/// Render a frame as a square false-color image.
///
/// Temperatures at or below `scale.min` get the first palette entry, and temperatures at or
/// above `scale.max` the last. If `show_hotspot` is set, a crosshair is drawn over the hottest
/// sensor cell.
#[instrument(level = "trace", skip(frame, lut))]
pub(crate) fn render_heatmap(
    frame: &ThermalFrame,
    scale: ScaleRange,
    method: Method,
    resolution: u32,
    show_hotspot: bool,
    lut: &ColorLut,
) -> RgbaImage {
    let resampled = method
        .resampler()
        .resample(&frame.pixels, resolution, resolution);
    let min = scale.min as f64;
    let range = scale.max as f64 - min;
    let inverse_range = if range > MIN_RANGE { 1.0 / range } else { 1.0 };
    let mut image = RgbaImage::from_fn(resolution, resolution, |x, y| {
        let temperature = resampled.get_pixel(x, y)[0] as f64;
        lut.lookup((temperature - min) * inverse_range).into()
    });
    if show_hotspot && resolution > 0 {
        Crosshair::for_hotspot(frame.hotspot_x, frame.hotspot_y, resolution).draw(&mut image);
    }
    image
}

/// A plus-shaped marker centered on a sensor cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Crosshair {
    center_x: f64,
    center_y: f64,
    /// Half the length of each arm.
    radius: f64,
    stroke_width: f64,
}

impl Crosshair {
    pub(crate) fn for_hotspot(hotspot_x: u8, hotspot_y: u8, resolution: u32) -> Self {
        let cell_size = resolution as f64 / GRID_SIZE as f64;
        Self {
            center_x: (hotspot_x as f64 + 0.5) * cell_size,
            center_y: (hotspot_y as f64 + 0.5) * cell_size,
            radius: cell_size * 0.4,
            stroke_width: (resolution as f64 / 48.0).max(1.0),
        }
    }

    /// The color to draw with, chosen to contrast with the pixel under the center of the marker.
    fn stroke_color(&self, image: &RgbaImage) -> Color {
        let max_x = image.width().saturating_sub(1);
        let max_y = image.height().saturating_sub(1);
        let x = (self.center_x.round().max(0.0) as u32).min(max_x);
        let y = (self.center_y.round().max(0.0) as u32).min(max_y);
        Color::from(image.get_pixel(x, y)).foreground_color()
    }

    pub(crate) fn draw(&self, image: &mut RgbaImage) {
        let color: Rgba<u8> = self.stroke_color(image).into();
        let half_stroke = self.stroke_width / 2.0;
        let horizontal = pixel_rect(
            (self.center_x - self.radius, self.center_x + self.radius),
            (self.center_y - half_stroke, self.center_y + half_stroke),
        );
        let vertical = pixel_rect(
            (self.center_x - half_stroke, self.center_x + half_stroke),
            (self.center_y - self.radius, self.center_y + self.radius),
        );
        for rect in horizontal.into_iter().chain(vertical) {
            draw_filled_rect_mut(image, rect, color);
        }
    }
}

/// The pixels whose centers fall within the given span, as a rectangle.
fn pixel_rect(x_span: (f64, f64), y_span: (f64, f64)) -> Option<Rect> {
    let (left, right) = pixel_span(x_span);
    let (top, bottom) = pixel_span(y_span);
    if right > left && bottom > top {
        Some(Rect::at(left, top).of_size((right - left) as u32, (bottom - top) as u32))
    } else {
        None
    }
}

/// Convert a continuous span into a half-open range of pixel indices.
fn pixel_span((start, end): (f64, f64)) -> (i32, i32) {
    ((start - 0.5).ceil() as i32, (end - 0.5).ceil() as i32)
}

#[cfg(test)]
mod test {
    use image::Rgba;

    use super::{render_heatmap, Crosshair};
    use crate::frame::test_frames;
    use crate::render::autoscale::ScaleRange;
    use crate::render::color::Color;
    use crate::render::lut::ColorLut;
    use crate::render::resize::Method;

    const METHODS: [Method; 3] = [Method::Nearest, Method::Bilinear, Method::Bicubic];

    fn is_crosshair(x: u32, y: u32) -> bool {
        (y == 13 && (9..=11).contains(&x)) || (x == 10 && (12..=14).contains(&y))
    }

    #[test]
    fn uniform_frame_with_hotspot() {
        let lut = ColorLut::ironbow();
        let frame = test_frames::uniform(25.0, (3, 4));
        let background: Rgba<u8> = lut.entry(128).into();
        let white: Rgba<u8> = Color::WHITE.into();
        for method in METHODS.iter() {
            let image = render_heatmap(
                &frame,
                ScaleRange::new(18.0, 32.0),
                *method,
                24,
                true,
                &lut,
            );
            assert_eq!(image.dimensions(), (24, 24));
            for (x, y, pixel) in image.enumerate_pixels() {
                if is_crosshair(x, y) {
                    assert_eq!(*pixel, white, "{:?} at ({}, {})", method, x, y);
                } else {
                    assert_eq!(*pixel, background, "{:?} at ({}, {})", method, x, y);
                }
            }
        }
    }

    #[test]
    fn hotspot_hidden() {
        let lut = ColorLut::ironbow();
        let frame = test_frames::uniform(25.0, (3, 4));
        let image = render_heatmap(
            &frame,
            ScaleRange::new(18.0, 32.0),
            Method::Bicubic,
            24,
            false,
            &lut,
        );
        let background: Rgba<u8> = lut.entry(128).into();
        assert!(image.pixels().all(|p| *p == background));
    }

    #[test]
    fn dark_stroke_on_bright_background() {
        let lut = ColorLut::ironbow();
        // Everything above the scale maps to white, so the crosshair has to be black.
        let frame = test_frames::uniform(50.0, (0, 0));
        let image = render_heatmap(
            &frame,
            ScaleRange::new(18.0, 32.0),
            Method::Nearest,
            24,
            true,
            &lut,
        );
        let black: Rgba<u8> = Color::BLACK.into();
        let white: Rgba<u8> = Color::WHITE.into();
        assert_eq!(*image.get_pixel(1, 1), black);
        assert_eq!(*image.get_pixel(23, 23), white);
    }

    #[test]
    fn zero_range() {
        let lut = ColorLut::ironbow();
        let frame = test_frames::uniform(25.0, (3, 4));
        let image = render_heatmap(
            &frame,
            ScaleRange::new(25.0, 25.0),
            Method::Bilinear,
            24,
            false,
            &lut,
        );
        let low_end: Rgba<u8> = lut.entry(0).into();
        assert!(image.pixels().all(|p| *p == low_end));
    }

    #[test]
    fn inverted_range() {
        let lut = ColorLut::ironbow();
        let frame = test_frames::gradient();
        let image = render_heatmap(
            &frame,
            ScaleRange::new(30.0, 20.0),
            Method::Bicubic,
            32,
            true,
            &lut,
        );
        assert_eq!(image.dimensions(), (32, 32));
        assert!(image.pixels().all(|p| p[3] == u8::MAX));
    }

    #[test]
    fn nan_pixels() {
        let lut = ColorLut::ironbow();
        let mut frame = test_frames::uniform(25.0, (3, 4));
        frame.pixels.put_pixel(2, 2, image::Luma([f32::NAN]));
        let image = render_heatmap(
            &frame,
            ScaleRange::new(18.0, 32.0),
            Method::Nearest,
            8,
            false,
            &lut,
        );
        let low_end: Rgba<u8> = lut.entry(0).into();
        assert_eq!(*image.get_pixel(2, 2), low_end);
    }

    #[test]
    fn zero_resolution() {
        let lut = ColorLut::ironbow();
        let frame = test_frames::uniform(25.0, (3, 4));
        let image = render_heatmap(
            &frame,
            ScaleRange::default(),
            Method::Bicubic,
            0,
            true,
            &lut,
        );
        assert_eq!(image.dimensions(), (0, 0));
    }

    #[test]
    fn crosshair_geometry() {
        let crosshair = Crosshair::for_hotspot(3, 4, 24);
        assert_eq!(
            crosshair,
            Crosshair {
                center_x: 10.5,
                center_y: 13.5,
                radius: 3.0 * 0.4,
                stroke_width: 1.0,
            }
        );
        assert_eq!(Crosshair::for_hotspot(0, 0, 96).stroke_width, 2.0);
    }

    #[test]
    fn out_of_range_hotspot_clamped() {
        let lut = ColorLut::ironbow();
        let frame = test_frames::uniform(25.0, (200, 9));
        // Must not panic even though the hotspot is outside the grid.
        let image = render_heatmap(
            &frame,
            ScaleRange::new(18.0, 32.0),
            Method::Nearest,
            24,
            true,
            &lut,
        );
        assert_eq!(image.dimensions(), (24, 24));
    }
}
