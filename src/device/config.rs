// SPDX-License-Identifier: GPL-3.0-or-later
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The longest SSID the sensor will store, in bytes.
const MAX_SSID_LENGTH: usize = 32;
/// The longest WiFi password the sensor will store, in bytes.
const MAX_PASSWORD_LENGTH: usize = 64;

fn default_normal_fps() -> u8 {
    5
}

fn default_idle_fps() -> u8 {
    1
}

fn default_idle_timeout() -> u16 {
    10
}

fn default_alpha() -> f32 {
    0.3
}

/// The configuration and status document returned by the sensor.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub(crate) struct DeviceConfig {
    #[serde(default = "default_normal_fps")]
    pub(crate) normal_fps: u8,

    #[serde(default = "default_idle_fps")]
    pub(crate) idle_fps: u8,

    /// Seconds without a client before dropping to the idle frame rate.
    #[serde(default = "default_idle_timeout")]
    pub(crate) idle_timeout_sec: u16,

    #[serde(default)]
    pub(crate) temporal_enabled: bool,

    /// The weight of each new reading in the sensor's temporal filter.
    #[serde(default = "default_alpha")]
    pub(crate) alpha: f32,

    #[serde(default)]
    pub(crate) calibration_offset: f32,

    #[serde(default)]
    pub(crate) sta_enabled: bool,

    #[serde(default)]
    pub(crate) sta_ssid: String,

    #[serde(default)]
    pub(crate) sta_ip: String,

    #[serde(default)]
    pub(crate) sta_connected: bool,

    /// The number of connected WebSocket clients.
    #[serde(default)]
    pub(crate) clients: u32,

    #[serde(default)]
    pub(crate) idle: bool,

    #[serde(default)]
    pub(crate) version: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            normal_fps: default_normal_fps(),
            idle_fps: default_idle_fps(),
            idle_timeout_sec: default_idle_timeout(),
            temporal_enabled: false,
            alpha: default_alpha(),
            calibration_offset: 0.0,
            sta_enabled: false,
            sta_ssid: String::new(),
            sta_ip: String::new(),
            sta_connected: false,
            clients: 0,
            idle: false,
            version: String::new(),
        }
    }
}

/// A partial configuration change. Only the fields that are set are sent to the sensor.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub(crate) struct ConfigUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) normal_fps: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) idle_fps: Option<u8>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) idle_timeout_sec: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) temporal_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) alpha: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) calibration_offset: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) sta_enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) sta_ssid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) sta_password: Option<String>,
}

impl ConfigUpdate {
    pub(crate) fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Bring every field into the range the sensor accepts, logging any values that change.
    pub(crate) fn clamped(self) -> Self {
        Self {
            normal_fps: self.normal_fps.map(|fps| logged("normal_fps", fps, clamp_fps(fps))),
            idle_fps: self.idle_fps.map(|fps| logged("idle_fps", fps, clamp_fps(fps))),
            idle_timeout_sec: self
                .idle_timeout_sec
                .map(|sec| logged("idle_timeout_sec", sec, sec.clamp(1, 300))),
            temporal_enabled: self.temporal_enabled,
            alpha: self.alpha.map(|a| logged("alpha", a, clamp_alpha(a))),
            calibration_offset: self
                .calibration_offset
                .map(|o| logged("calibration_offset", o, clamp_offset(o))),
            sta_enabled: self.sta_enabled,
            sta_ssid: self
                .sta_ssid
                .map(|ssid| truncated("sta_ssid", ssid, MAX_SSID_LENGTH)),
            sta_password: self
                .sta_password
                .map(|pass| truncated("sta_password", pass, MAX_PASSWORD_LENGTH)),
        }
    }
}

/// The sensor's reply to a configuration change.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct UpdateResponse {
    #[serde(default)]
    pub(crate) ok: bool,

    #[serde(default)]
    pub(crate) error: Option<String>,
}

/// The sensor only supports 1, 5 and 10 frames per second.
pub(crate) fn clamp_fps(fps: u8) -> u8 {
    match fps {
        0..=1 => 1,
        2..=5 => 5,
        _ => 10,
    }
}

pub(crate) fn clamp_alpha(alpha: f32) -> f32 {
    if alpha.is_nan() {
        default_alpha()
    } else {
        alpha.clamp(0.05, 0.8)
    }
}

pub(crate) fn clamp_offset(offset: f32) -> f32 {
    if offset.is_nan() {
        0.0
    } else {
        offset.clamp(-5.0, 5.0)
    }
}

fn logged<T>(field: &'static str, requested: T, clamped: T) -> T
where
    T: PartialEq + std::fmt::Display,
{
    if requested != clamped {
        warn!(field, %requested, %clamped, "value outside of sensor limits, clamping");
    }
    clamped
}

fn truncated(field: &'static str, mut value: String, max_length: usize) -> String {
    if value.len() > max_length {
        warn!(field, max_length, "value too long, truncating");
        let mut end = max_length;
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        value.truncate(end);
    }
    value
}
