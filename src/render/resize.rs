// SPDX-License-Identifier: GPL-3.0-or-later
use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;

use image::Luma;
use serde::{Deserialize, Serialize};

use crate::frame::ThermalImage;

/// Different resampling methods.
#[derive(Copy, Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Method {
    /// Nearest neighbor sampling.
    Nearest,

    /// Bilinear sampling of the four closest points.
    #[serde(alias = "linear", alias = "triangle")]
    Bilinear,

    /// Catmull-Rom (aka bicubic) sampling of the sixteen closest points.
    #[serde(alias = "catmull_rom")]
    Bicubic,
}

impl Default for Method {
    fn default() -> Self {
        Self::Bicubic
    }
}

impl Method {
    /// The resampler implementing this method.
    pub(crate) fn resampler(self) -> &'static dyn Resampler {
        match self {
            Self::Nearest => &NearestResample,
            Self::Bilinear => &BilinearResample,
            Self::Bicubic => &BicubicResample,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct UnknownMethod(String);

impl fmt::Display for UnknownMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown resampling method \"{}\"", self.0)
    }
}

impl StdError for UnknownMethod {}

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "nearest" => Ok(Self::Nearest),
            "bilinear" | "linear" | "triangle" => Ok(Self::Bilinear),
            "bicubic" | "catmull_rom" => Ok(Self::Bicubic),
            _ => Err(UnknownMethod(s.to_string())),
        }
    }
}

pub(crate) trait Resampler: fmt::Debug + Send + Sync {
    /// Resample a grid of temperatures to a new size.
    ///
    /// Points outside of the source grid are clamped to the nearest edge. Resampling to a zero
    /// width or height returns an empty image.
    fn resample(&self, source: &ThermalImage, width: u32, height: u32) -> ThermalImage;
}

/// Each destination pixel takes the value of the source pixel it falls within.
#[derive(Clone, Copy, Debug)]
pub(crate) struct NearestResample;

impl Resampler for NearestResample {
    fn resample(&self, source: &ThermalImage, width: u32, height: u32) -> ThermalImage {
        if is_empty(source, width, height) {
            return ThermalImage::new(width, height);
        }
        let scale_x = source.width() as f64 / width as f64;
        let scale_y = source.height() as f64 / height as f64;
        let max_x = source.width() - 1;
        let max_y = source.height() - 1;
        ThermalImage::from_fn(width, height, |x, y| {
            let source_x = ((x as f64 * scale_x).floor() as u32).min(max_x);
            let source_y = ((y as f64 * scale_y).floor() as u32).min(max_y);
            *source.get_pixel(source_x, source_y)
        })
    }
}

/// Corners of the destination align with the centers of the corner source pixels, with the four
/// surrounding source pixels blended linearly.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BilinearResample;

impl Resampler for BilinearResample {
    fn resample(&self, source: &ThermalImage, width: u32, height: u32) -> ThermalImage {
        if is_empty(source, width, height) {
            return ThermalImage::new(width, height);
        }
        let scale_x = corner_aligned_scale(source.width(), width);
        let scale_y = corner_aligned_scale(source.height(), height);
        ThermalImage::from_fn(width, height, |x, y| {
            let (x0, dx) = split_coordinate(x as f64 * scale_x);
            let (y0, dy) = split_coordinate(y as f64 * scale_y);
            let x1 = x0 + 1;
            let y1 = y0 + 1;
            let value = sample(source, x0, y0) * (1.0 - dx) * (1.0 - dy)
                + sample(source, x1, y0) * dx * (1.0 - dy)
                + sample(source, x0, y1) * (1.0 - dx) * dy
                + sample(source, x1, y1) * dx * dy;
            Luma([value as f32])
        })
    }
}

/// Same mapping as [`BilinearResample`], but with a 4x4 Catmull-Rom kernel.
///
/// This kernel can overshoot slightly around sharp edges, so the output may fall a little outside
/// the range of the input.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BicubicResample;

impl BicubicResample {
    /// The Catmull-Rom cubic convolution kernel (a = -0.5).
    fn weight(t: f64) -> f64 {
        let t = t.abs();
        if t <= 1.0 {
            1.5 * t.powi(3) - 2.5 * t.powi(2) + 1.0
        } else if t <= 2.0 {
            -0.5 * t.powi(3) + 2.5 * t.powi(2) - 4.0 * t + 2.0
        } else {
            0.0
        }
    }
}

impl Resampler for BicubicResample {
    fn resample(&self, source: &ThermalImage, width: u32, height: u32) -> ThermalImage {
        if is_empty(source, width, height) {
            return ThermalImage::new(width, height);
        }
        let scale_x = corner_aligned_scale(source.width(), width);
        let scale_y = corner_aligned_scale(source.height(), height);
        ThermalImage::from_fn(width, height, |x, y| {
            let (x0, dx) = split_coordinate(x as f64 * scale_x);
            let (y0, dy) = split_coordinate(y as f64 * scale_y);
            let mut value = 0.0;
            for m in -1i64..=2 {
                let weight_y = Self::weight(m as f64 - dy);
                for n in -1i64..=2 {
                    let weight_x = Self::weight(n as f64 - dx);
                    value += sample(source, x0 + n, y0 + m) * weight_y * weight_x;
                }
            }
            Luma([value as f32])
        })
    }
}

fn is_empty(source: &ThermalImage, width: u32, height: u32) -> bool {
    width == 0 || height == 0 || source.width() == 0 || source.height() == 0
}

/// The distance in source pixels between adjacent destination pixels, when the first and last
/// destination pixels line up with the first and last source pixels.
fn corner_aligned_scale(source_dimension: u32, destination_dimension: u32) -> f64 {
    if destination_dimension > 1 {
        (source_dimension - 1) as f64 / (destination_dimension - 1) as f64
    } else {
        // A single row/column samples the first source row/column.
        0.0
    }
}

/// Split a source coordinate into its integer and fractional parts.
fn split_coordinate(coordinate: f64) -> (i64, f64) {
    let whole = coordinate.floor();
    (whole as i64, coordinate - whole)
}

/// Read a source pixel, clamping the coordinates to the edges of the image.
fn sample(source: &ThermalImage, x: i64, y: i64) -> f64 {
    let x = x.clamp(0, source.width() as i64 - 1) as u32;
    let y = y.clamp(0, source.height() as i64 - 1) as u32;
    source.get_pixel(x, y)[0] as f64
}
