// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Context as _;
use serde::Deserialize;
use tracing::{debug, info};

use std::io::ErrorKind;
use std::path::Path;

mod cli;
mod device;
pub(crate) mod gradient;

use crate::render::RenderSettings;
use crate::stream::StreamSettings;
pub(crate) use cli::{Args, Command, ConfigCommand};
pub(crate) use device::DeviceSettings;
pub(crate) use gradient::Palette;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub(crate) struct Settings {
    /// How to reach the sensor.
    #[serde(default)]
    pub(crate) device: DeviceSettings,

    /// Settings related to how frames are rendered.
    #[serde(default)]
    pub(crate) render: RenderSettings,

    /// Settings related to the HTTP server for the rendered stream.
    #[serde(default)]
    pub(crate) streams: StreamSettings,
}

impl Settings {
    /// Load settings from a TOML file. A missing file means every setting uses its default.
    pub(crate) async fn load(path: &Path) -> anyhow::Result<Self> {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => {
                debug!(?path, "loading settings");
                toml::from_str(&contents)
                    .with_context(|| format!("Unable to parse settings from {}", path.display()))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(?path, "settings file not found, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err)
                .with_context(|| format!("Unable to read settings from {}", path.display())),
        }
    }
}
