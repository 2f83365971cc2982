// SPDX-License-Identifier: GPL-3.0-or-later
mod jpeg;
mod mjpeg;
mod routes;
mod settings;
mod status;

pub(crate) use jpeg::encode_jpeg;
pub(crate) use mjpeg::MjpegStream;
pub(crate) use routes::routes;
pub(crate) use settings::StreamSettings;
pub(crate) use status::{RenderStatus, StatusSources};
