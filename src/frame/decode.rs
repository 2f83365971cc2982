// SPDX-License-Identifier: GPL-3.0-or-later
use bytes::Buf;
use image::Luma;

use super::{Flags, ThermalFrame, ThermalImage, GRID_SIZE};
use crate::error::DecodeError;

/// The length of the fixed header preceding the pixel data.
const HEADER_LENGTH: usize = 24;

/// The exact length of an encoded frame.
pub(crate) const FRAME_LENGTH: usize =
    HEADER_LENGTH + (GRID_SIZE * GRID_SIZE) as usize * std::mem::size_of::<f32>();

/// Decode a frame from a buffer.
///
/// All fields are little-endian:
///
/// | offset | type     | field                |
/// |--------|----------|----------------------|
/// | 0      | u32      | timestamp (ms)       |
/// | 4      | u8       | frames per second    |
/// | 5      | u8       | flags                |
/// | 6      | f32      | calibration offset   |
/// | 10     | f32      | minimum temperature  |
/// | 14     | f32      | maximum temperature  |
/// | 18     | f32      | mean temperature     |
/// | 22     | u8       | hotspot column       |
/// | 23     | u8       | hotspot row          |
/// | 24     | 64 × f32 | pixels, row-major    |
pub(crate) fn decode<B: Buf>(mut buf: B) -> Result<ThermalFrame, DecodeError> {
    if buf.remaining() != FRAME_LENGTH {
        return Err(DecodeError::Length(buf.remaining()));
    }
    let timestamp_ms = buf.get_u32_le();
    let fps = buf.get_u8();
    let flags = Flags::from(buf.get_u8());
    let calibration_offset = buf.get_f32_le();
    let t_min = buf.get_f32_le();
    let t_max = buf.get_f32_le();
    let t_mean = buf.get_f32_le();
    let hotspot_x = buf.get_u8();
    let hotspot_y = buf.get_u8();
    // from_fn walks rows first, matching the wire order.
    let pixels = ThermalImage::from_fn(GRID_SIZE, GRID_SIZE, |_, _| Luma([buf.get_f32_le()]));
    Ok(ThermalFrame {
        timestamp_ms,
        fps,
        flags,
        calibration_offset,
        t_min,
        t_max,
        t_mean,
        hotspot_x,
        hotspot_y,
        pixels,
    })
}

/// Encode a frame into the same layout [`decode`] reads.
#[cfg(test)]
pub(crate) fn encode(frame: &ThermalFrame) -> bytes::Bytes {
    use bytes::{BufMut, BytesMut};

    let mut buf = BytesMut::with_capacity(FRAME_LENGTH);
    buf.put_u32_le(frame.timestamp_ms);
    buf.put_u8(frame.fps);
    buf.put_u8(frame.flags.bits());
    buf.put_f32_le(frame.calibration_offset);
    buf.put_f32_le(frame.t_min);
    buf.put_f32_le(frame.t_max);
    buf.put_f32_le(frame.t_mean);
    buf.put_u8(frame.hotspot_x);
    buf.put_u8(frame.hotspot_y);
    for pixel in frame.pixels.pixels() {
        buf.put_f32_le(pixel[0]);
    }
    buf.freeze()
}
