// SPDX-License-Identifier: GPL-3.0-or-later
use image::{ImageBuffer, Luma};
use serde::Serialize;

mod decode;

pub(crate) use decode::{decode, FRAME_LENGTH};

#[cfg(test)]
pub(crate) use decode::encode;

/// A grid of temperatures in degrees Celsius.
pub(crate) type ThermalImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// The width and height of the sensor grid.
pub(crate) const GRID_SIZE: u32 = 8;

/// The status bits sent along with every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub(crate) struct Flags(u8);

impl Flags {
    const TEMPORAL_FILTER: u8 = 0x01;
    const IDLE: u8 = 0x02;
    const STA_CONNECTED: u8 = 0x04;

    #[cfg(test)]
    pub(crate) fn bits(self) -> u8 {
        self.0
    }

    /// The sensor is smoothing frames over time before sending them.
    pub(crate) fn temporal_filter(self) -> bool {
        self.0 & Self::TEMPORAL_FILTER != 0
    }

    /// The sensor has dropped to its idle frame rate.
    pub(crate) fn idle(self) -> bool {
        self.0 & Self::IDLE != 0
    }

    /// The sensor is joined to an upstream WiFi network.
    pub(crate) fn sta_connected(self) -> bool {
        self.0 & Self::STA_CONNECTED != 0
    }
}

impl From<u8> for Flags {
    fn from(bits: u8) -> Self {
        Self(bits)
    }
}

/// A single decoded frame from the sensor.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ThermalFrame {
    /// Milliseconds since the sensor booted.
    pub(crate) timestamp_ms: u32,
    pub(crate) fps: u8,
    pub(crate) flags: Flags,
    /// The offset (in degrees Celsius) the sensor has already applied to every value.
    pub(crate) calibration_offset: f32,
    pub(crate) t_min: f32,
    pub(crate) t_max: f32,
    pub(crate) t_mean: f32,
    pub(crate) hotspot_x: u8,
    pub(crate) hotspot_y: u8,
    /// The 8x8 temperature grid, in degrees Celsius.
    pub(crate) pixels: ThermalImage,
}

impl ThermalFrame {
    pub(crate) fn summary(&self) -> FrameSummary {
        FrameSummary {
            timestamp_ms: self.timestamp_ms,
            fps: self.fps,
            idle: self.flags.idle(),
            temporal_filter: self.flags.temporal_filter(),
            sta_connected: self.flags.sta_connected(),
            calibration_offset: self.calibration_offset,
            t_min: self.t_min,
            t_mean: self.t_mean,
            t_max: self.t_max,
            hotspot: [self.hotspot_x, self.hotspot_y],
        }
    }
}

/// The statistics of a frame, without the pixel data.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub(crate) struct FrameSummary {
    pub(crate) timestamp_ms: u32,
    pub(crate) fps: u8,
    pub(crate) idle: bool,
    pub(crate) temporal_filter: bool,
    pub(crate) sta_connected: bool,
    pub(crate) calibration_offset: f32,
    pub(crate) t_min: f32,
    pub(crate) t_mean: f32,
    pub(crate) t_max: f32,
    pub(crate) hotspot: [u8; 2],
}
