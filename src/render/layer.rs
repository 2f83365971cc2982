// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::{anyhow, bail};
use bytes::Bytes;
use image::flat::FlatSamples;
use image::{imageops, ImageBuffer, Rgba, RgbaImage};

use super::legend::{LEGEND_HEIGHT, LEGEND_WIDTH};
use super::settings::MAX_OUTPUT_SCALE;

/// Rendered raw images intended for viewing. A shared [bytes::Bytes] buffer is used to minimize
/// copying when the same frame is sent to multiple clients.
pub(crate) type BytesImage = ImageBuffer<Rgba<u8>, Bytes>;

/// Space between the heatmap and the legend.
const GAP: u32 = 8;
const BACKGROUND: Rgba<u8> = Rgba([0x20, 0x20, 0x20, 0xFF]);

/// Enlarge an image by an integer factor, turning every pixel into a `factor` sized square.
///
/// The current implementation builds a mono-color view for each pixel (using
/// [image::flat::FlatSamples::with_monocolor]), and then draws these squares onto the final image
/// with [image::imageops::replace]. This is noticeably faster than [image::imageops::resize] with
/// nearest neighbor filtering.
pub(crate) fn enlarge(image: &RgbaImage, factor: u32) -> anyhow::Result<RgbaImage> {
    match factor {
        0 => bail!("Cannot enlarge an image by a factor of 0"),
        1 => return Ok(image.clone()),
        f if f > MAX_OUTPUT_SCALE => bail!(
            "Cannot enlarge an image by more than {}, got {}",
            MAX_OUTPUT_SCALE,
            f
        ),
        _ => (),
    }
    let (width, height) = image
        .width()
        .checked_mul(factor)
        .zip(image.height().checked_mul(factor))
        .ok_or_else(|| {
            anyhow!(
                "Enlarging a {:?} image by {} is too large",
                image.dimensions(),
                factor
            )
        })?;
    let mut full_image = RgbaImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        let tile = FlatSamples::with_monocolor(pixel, factor, factor);
        let tile_view = tile.as_view()?;
        imageops::replace(&mut full_image, &tile_view, x * factor, y * factor);
    }
    Ok(full_image)
}

/// Place the (enlarged) heatmap and the legend side by side on a dark background.
pub(crate) fn compose(
    heatmap: &RgbaImage,
    legend: &RgbaImage,
    factor: u32,
) -> anyhow::Result<BytesImage> {
    let heatmap = enlarge(heatmap, factor)?;
    let width = heatmap.width() + GAP + LEGEND_WIDTH;
    let height = heatmap.height().max(LEGEND_HEIGHT);
    let mut composed = RgbaImage::from_pixel(width, height, BACKGROUND);
    imageops::overlay(&mut composed, &heatmap, 0, 0);
    imageops::overlay(&mut composed, legend, heatmap.width() + GAP, 0);
    let buf = Bytes::from(composed.into_raw());
    BytesImage::from_raw(width, height, buf)
        .ok_or_else(|| anyhow!("Creating BytesImage from composed RGBA image failed"))
}
