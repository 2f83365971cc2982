// SPDX-License-Identifier: GPL-3.0-or-later
use serde::Serialize;
use tokio::sync::watch;

use crate::connection::{ConnectionState, FrameReceivers};
use crate::device::DeviceConfig;
use crate::frame::FrameSummary;
use crate::render::{Method, RenderContext, ScaleRange};

/// What the render task knows: the last frame it drew and how it drew it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub(crate) struct RenderStatus {
    pub(crate) frame: Option<FrameSummary>,
    pub(crate) scale: ScaleRange,
    pub(crate) method: Method,
    pub(crate) resolution: u32,
    pub(crate) show_hotspot: bool,
}

impl RenderStatus {
    pub(crate) fn new(context: &RenderContext, frame: Option<FrameSummary>) -> Self {
        Self {
            frame,
            scale: context.scale(),
            method: context.method(),
            resolution: context.resolution(),
            show_hotspot: context.show_hotspot(),
        }
    }
}

/// The body of a `/status` response.
#[derive(Clone, Debug, Serialize)]
pub(crate) struct Status {
    pub(crate) connection: ConnectionState,
    #[serde(flatten)]
    pub(crate) render: RenderStatus,
    pub(crate) device: Option<DeviceConfig>,
}

/// Everything needed to build a [`Status`] on demand.
#[derive(Clone, Debug)]
pub(crate) struct StatusSources {
    render: watch::Receiver<RenderStatus>,
    connection: watch::Receiver<ConnectionState>,
    device: watch::Receiver<Option<DeviceConfig>>,
}

impl StatusSources {
    pub(crate) fn new(render: watch::Receiver<RenderStatus>, receivers: &FrameReceivers) -> Self {
        Self {
            render,
            connection: receivers.state.clone(),
            device: receivers.device_config.clone(),
        }
    }

    pub(crate) fn snapshot(&self) -> Status {
        Status {
            connection: *self.connection.borrow(),
            render: *self.render.borrow(),
            device: self.device.borrow().clone(),
        }
    }
}
