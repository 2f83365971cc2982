// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::anyhow;
use serde::Deserialize;
use url::Url;

use std::time::Duration;

/// How to reach the sensor.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct DeviceSettings {
    /// The base HTTP address of the sensor. Defaults to the address the sensor uses for its own
    /// access point, `http://192.168.4.1/`.
    #[serde(default = "DeviceSettings::default_address")]
    pub(crate) address: Url,

    /// How long to wait before reconnecting after the frame stream closes, in milliseconds.
    #[serde(default = "DeviceSettings::default_reconnect_delay")]
    reconnect_delay_ms: u64,

    /// How long to wait for a reply to a configuration request, in milliseconds.
    #[serde(default = "DeviceSettings::default_request_timeout")]
    request_timeout_ms: u64,
}

impl DeviceSettings {
    fn default_address() -> Url {
        Url::parse("http://192.168.4.1/").expect("the default device address to be a valid URL")
    }

    fn default_reconnect_delay() -> u64 {
        2000
    }

    fn default_request_timeout() -> u64 {
        5000
    }

    pub(crate) fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub(crate) fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The WebSocket URL frames are streamed from.
    pub(crate) fn websocket_url(&self) -> anyhow::Result<Url> {
        let mut url = self.address.join("/ws")?;
        let scheme = match self.address.scheme() {
            "https" => "wss",
            _ => "ws",
        };
        url.set_scheme(scheme)
            .map_err(|_| anyhow!("Unable to build a WebSocket URL from {}", self.address))?;
        Ok(url)
    }

    /// The URL of the sensor's configuration endpoint.
    pub(crate) fn config_url(&self) -> anyhow::Result<Url> {
        Ok(self.address.join("/api/config")?)
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            address: Self::default_address(),
            reconnect_delay_ms: Self::default_reconnect_delay(),
            request_timeout_ms: Self::default_request_timeout(),
        }
    }
}
