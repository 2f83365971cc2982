// SPDX-License-Identifier: GPL-3.0-or-later
pub(crate) mod autoscale;
pub(crate) mod color;
mod context;
mod font;
pub(crate) mod heatmap;
mod layer;
pub(crate) mod legend;
pub(crate) mod lut;
pub(crate) mod resize;
mod settings;

pub(crate) use autoscale::ScaleRange;
pub(crate) use context::{RenderCommand, RenderContext};
pub(crate) use layer::BytesImage;
pub(crate) use resize::Method;
pub(crate) use settings::RenderSettings;
