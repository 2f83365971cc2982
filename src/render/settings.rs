// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::bail;
use serde::Deserialize;

use std::convert::TryFrom;

use crate::settings::Palette;

use super::autoscale::ScaleMode;
use super::context::MAX_RESOLUTION;
use super::resize::Method;

/// The largest factor the heatmap can be enlarged by for the video stream.
pub(crate) const MAX_OUTPUT_SCALE: u32 = 32;

fn default_resolution() -> u32 {
    24
}

fn default_show_hotspot() -> bool {
    true
}

fn default_output_scale() -> u32 {
    10
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(try_from = "InnerRenderSettings")]
pub(crate) struct RenderSettings {
    /// The width and height (in pixels) the 8x8 sensor grid is resampled to.
    pub(crate) resolution: u32,

    pub(crate) scaling_method: Method,

    /// Draw a crosshair over the hottest cell.
    pub(crate) show_hotspot: bool,

    pub(crate) palette: Palette,

    pub(crate) scale: ScaleMode,

    /// Each resampled pixel is drawn as a square this many pixels wide in the video stream.
    pub(crate) output_scale: u32,
}

/// The render settings as written, before the ranges are checked.
#[derive(Debug, Deserialize)]
struct InnerRenderSettings {
    #[serde(default = "default_resolution")]
    resolution: u32,

    #[serde(default)]
    scaling_method: Method,

    #[serde(default = "default_show_hotspot")]
    show_hotspot: bool,

    #[serde(default)]
    palette: Palette,

    #[serde(default)]
    scale: ScaleMode,

    #[serde(default = "default_output_scale")]
    output_scale: u32,
}

impl TryFrom<InnerRenderSettings> for RenderSettings {
    type Error = anyhow::Error;

    fn try_from(inner: InnerRenderSettings) -> anyhow::Result<Self> {
        if inner.resolution == 0 || inner.resolution > MAX_RESOLUTION {
            bail!(
                "resolution must be between 1 and {}, got {}",
                MAX_RESOLUTION,
                inner.resolution
            );
        }
        if inner.output_scale == 0 || inner.output_scale > MAX_OUTPUT_SCALE {
            bail!(
                "output_scale must be between 1 and {}, got {}",
                MAX_OUTPUT_SCALE,
                inner.output_scale
            );
        }
        Ok(Self {
            resolution: inner.resolution,
            scaling_method: inner.scaling_method,
            show_hotspot: inner.show_hotspot,
            palette: inner.palette,
            scale: inner.scale,
            output_scale: inner.output_scale,
        })
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            scaling_method: Method::default(),
            show_hotspot: default_show_hotspot(),
            palette: Palette::default(),
            scale: ScaleMode::default(),
            output_scale: default_output_scale(),
        }
    }
}

#[cfg(test)]
mod render_test {
    use std::convert::TryFrom;

    use super::{RenderSettings, MAX_OUTPUT_SCALE};
    use crate::render::context::MAX_RESOLUTION;
    use crate::render::autoscale::{ScaleMode, Smoothing};
    use crate::render::resize::Method;
    use crate::settings::Palette;

    #[test]
    fn defaults() {
        let parsed: Result<RenderSettings, _> = toml::from_str("");
        assert!(
            parsed.is_ok(),
            "Failed to parse empty TOML: {}",
            parsed.unwrap_err()
        );
        let parsed = parsed.unwrap();
        let expected = RenderSettings::default();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.resolution, 24);
        assert_eq!(parsed.scaling_method, Method::Bicubic);
    }

    #[test]
    fn resolution() {
        let parsed: Result<RenderSettings, _> = toml::from_str("resolution = 48");
        assert!(
            parsed.is_ok(),
            "Failed to parse resolution: {}",
            parsed.unwrap_err()
        );
        let expected = RenderSettings {
            resolution: 48,
            ..RenderSettings::default()
        };
        assert_eq!(parsed.unwrap(), expected);
    }

    #[test]
    fn scaling_method() {
        let parsed: Result<RenderSettings, _> = toml::from_str("scaling_method = \"nearest\"");
        assert!(
            parsed.is_ok(),
            "Failed to parse scaling method: {}",
            parsed.unwrap_err()
        );
        assert_eq!(parsed.unwrap().scaling_method, Method::Nearest);
    }

    #[test]
    fn palette() {
        let parsed: Result<RenderSettings, _> = toml::from_str("palette = \"magma\"");
        assert!(
            parsed.is_ok(),
            "Failed to parse palette: {}",
            parsed.unwrap_err()
        );
        assert_eq!(parsed.unwrap().palette, Palette::Gradient(colorous::MAGMA));
    }

    #[test]
    fn manual_scale() {
        let parsed: Result<RenderSettings, _> =
            toml::from_str("[scale]\nmode = \"manual\"\nmin = 20\nmax = 35.5");
        assert!(
            parsed.is_ok(),
            "Failed to parse manual scale: {}",
            parsed.unwrap_err()
        );
        assert_eq!(
            parsed.unwrap().scale,
            ScaleMode::Manual {
                min: 20.0,
                max: 35.5
            }
        );
    }

    #[test]
    fn auto_scale() {
        let parsed: Result<RenderSettings, _> =
            toml::from_str("scale = { mode = \"auto\", smoothing = 0.75 }");
        assert!(
            parsed.is_ok(),
            "Failed to parse auto scale: {}",
            parsed.unwrap_err()
        );
        assert_eq!(
            parsed.unwrap().scale,
            ScaleMode::Auto {
                smoothing: Smoothing::try_from(0.75).unwrap()
            }
        );
    }

    #[test]
    fn hide_hotspot() {
        let parsed: Result<RenderSettings, _> = toml::from_str("show_hotspot = false");
        assert!(parsed.is_ok());
        assert!(!parsed.unwrap().show_hotspot);
    }

    #[test]
    fn bad_method() {
        let parsed: Result<RenderSettings, _> = toml::from_str("scaling_method = \"lanczos\"");
        assert!(parsed.is_err(), "Parsed an unsupported scaling method");
    }

    #[test]
    fn resolution_limits() {
        let parsed: Result<RenderSettings, _> = toml::from_str("resolution = 0");
        assert!(parsed.is_err(), "Parsed a zero resolution");
        let parsed: Result<RenderSettings, _> =
            toml::from_str(&format!("resolution = {}", MAX_RESOLUTION + 1));
        assert!(parsed.is_err(), "Parsed a resolution above the maximum");
        let parsed: Result<RenderSettings, _> =
            toml::from_str(&format!("resolution = {}", MAX_RESOLUTION));
        assert_eq!(parsed.unwrap().resolution, MAX_RESOLUTION);
    }

    #[test]
    fn output_scale_limits() {
        let parsed: Result<RenderSettings, _> = toml::from_str("output_scale = 0");
        assert!(parsed.is_err(), "Parsed a zero output scale");
        let parsed: Result<RenderSettings, _> = toml::from_str("output_scale = 200000000");
        assert!(parsed.is_err(), "Parsed an output scale above the maximum");
        let parsed: Result<RenderSettings, _> =
            toml::from_str(&format!("output_scale = {}", MAX_OUTPUT_SCALE));
        assert_eq!(parsed.unwrap().output_scale, MAX_OUTPUT_SCALE);
    }
}
