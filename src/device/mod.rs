// SPDX-License-Identifier: GPL-3.0-or-later
mod client;
mod config;

pub(crate) use client::DeviceClient;
pub(crate) use config::{ConfigUpdate, DeviceConfig};
