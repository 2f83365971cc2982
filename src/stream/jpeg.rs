// SPDX-License-Identifier: GPL-3.0-or-later
use bytes::{BufMut, Bytes, BytesMut};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, Pixel};
use tracing::trace;

use crate::render::BytesImage;

/// Encode a rendered frame as a JPEG image.
pub(crate) fn encode_jpeg(image: &BytesImage, quality: u8) -> anyhow::Result<Bytes> {
    trace!(width = image.width(), height = image.height(), "encoding JPEG image");
    // JPEG has no alpha channel, so drop it before encoding.
    let rgb: Vec<u8> = image.pixels().flat_map(|p| p.to_rgb().0).collect();
    let mut jpeg_buf = BytesMut::new().writer();
    let mut encoder = JpegEncoder::new_with_quality(&mut jpeg_buf, quality.clamp(1, 100));
    encoder.encode(&rgb, image.width(), image.height(), ColorType::Rgb8)?;
    Ok(jpeg_buf.into_inner().freeze())
}
