// SPDX-License-Identifier: GPL-3.0-or-later
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::frame::{self, FrameSummary, ThermalFrame};

use super::autoscale::{Autoscale, ScaleMode, ScaleRange};
use super::heatmap::render_heatmap;
use super::layer::{compose, BytesImage};
use super::legend::render_legend;
use super::lut::ColorLut;
use super::resize::Method;
use super::settings::RenderSettings;

/// The largest heatmap resolution that will be accepted.
pub(crate) const MAX_RESOLUTION: u32 = 512;

/// Changes to how frames are rendered, applied between frames.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "command", rename_all = "snake_case")]
pub(crate) enum RenderCommand {
    SetMethod { method: Method },
    SetResolution { resolution: u32 },
    ShowHotspot { enabled: bool },
    SetScaleMode { scale: ScaleMode },
}

/// The output of rendering a single frame.
#[derive(Clone, Debug)]
pub(crate) struct RenderedFrame {
    pub(crate) summary: FrameSummary,
    pub(crate) heatmap: RgbaImage,
    pub(crate) legend: RgbaImage,
}

impl RenderedFrame {
    /// Combine the heatmap and legend into a single image for viewing.
    pub(crate) fn compose(&self, output_scale: u32) -> anyhow::Result<BytesImage> {
        compose(&self.heatmap, &self.legend, output_scale)
    }
}

/// All of the state needed to render frames: the palette, the autoscaling state, and the current
/// display options.
#[derive(Clone, Debug)]
pub(crate) struct RenderContext {
    lut: ColorLut,
    autoscale: Autoscale,
    method: Method,
    resolution: u32,
    show_hotspot: bool,
    scale_mode: ScaleMode,
}

impl RenderContext {
    pub(crate) fn apply(&mut self, command: RenderCommand) {
        match command {
            RenderCommand::SetMethod { method } => self.method = method,
            RenderCommand::SetResolution { resolution } => {
                if resolution == 0 || resolution > MAX_RESOLUTION {
                    warn!(resolution, "ignoring out of range heatmap resolution");
                    return;
                }
                self.resolution = resolution;
            }
            RenderCommand::ShowHotspot { enabled } => self.show_hotspot = enabled,
            RenderCommand::SetScaleMode { scale } => self.scale_mode = scale,
        }
        info!(?command, "render settings changed");
    }

    /// The most recently displayed scale.
    pub(crate) fn scale(&self) -> ScaleRange {
        self.autoscale.current()
    }

    pub(crate) fn method(&self) -> Method {
        self.method
    }

    pub(crate) fn resolution(&self) -> u32 {
        self.resolution
    }

    pub(crate) fn show_hotspot(&self) -> bool {
        self.show_hotspot
    }

    /// Update the scale with a frame, then draw the heatmap and legend for it.
    #[instrument(level = "trace", skip(self, frame), fields(timestamp = frame.timestamp_ms))]
    pub(crate) fn render(&mut self, frame: &ThermalFrame) -> RenderedFrame {
        let scale = self
            .autoscale
            .update(frame.t_min, frame.t_max, &self.scale_mode);
        let heatmap = render_heatmap(
            frame,
            scale,
            self.method,
            self.resolution,
            self.show_hotspot,
            &self.lut,
        );
        let legend = render_legend(scale, &self.lut);
        RenderedFrame {
            summary: frame.summary(),
            heatmap,
            legend,
        }
    }

    /// Decode and render a message from the sensor. Messages that aren't valid frames are
    /// dropped.
    pub(crate) fn handle_message(&mut self, message: &[u8]) -> Option<RenderedFrame> {
        match frame::decode(message) {
            Ok(frame) => {
                debug!(summary = ?frame.summary(), "received frame");
                Some(self.render(&frame))
            }
            Err(err) => {
                debug!(error = %err, "dropping invalid frame");
                None
            }
        }
    }
}

impl From<&RenderSettings> for RenderContext {
    fn from(settings: &RenderSettings) -> Self {
        Self {
            lut: ColorLut::from(&settings.palette),
            autoscale: Autoscale::default(),
            method: settings.scaling_method,
            resolution: settings.resolution,
            show_hotspot: settings.show_hotspot,
            scale_mode: settings.scale,
        }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::from(&RenderSettings::default())
    }
}
