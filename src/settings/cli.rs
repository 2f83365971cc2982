// SPDX-License-Identifier: GPL-3.0-or-later
use structopt::StructOpt;

use std::path::PathBuf;

use crate::device::ConfigUpdate;

#[derive(Debug, StructOpt)]
#[structopt(about = "Live false-color heatmap viewer for 8x8 thermal sensors")]
pub struct Args {
    /// Path to a configuration file.
    #[structopt(short, long, parse(from_os_str), default_value = "config.toml")]
    pub config_path: PathBuf,

    /// What to do. Defaults to `view`.
    #[structopt(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, PartialEq, StructOpt)]
pub enum Command {
    /// Connect to the sensor, render frames as they arrive, and serve them over HTTP.
    View,

    /// Read or change the sensor's configuration.
    Config(ConfigCommand),

    /// Render a single raw frame to an image file.
    Render {
        /// A raw 280 byte frame, as sent by the sensor.
        #[structopt(short, long, parse(from_os_str))]
        input: PathBuf,

        /// Where to write the rendered image. The format is chosen from the extension.
        #[structopt(short, long, parse(from_os_str), default_value = "frame.png")]
        output: PathBuf,
    },
}

impl Default for Command {
    fn default() -> Self {
        Self::View
    }
}

#[derive(Debug, PartialEq, StructOpt)]
pub enum ConfigCommand {
    /// Print the sensor's current configuration and status as JSON.
    Show,

    /// Change one or more configuration values.
    Set(ConfigArgs),
}

#[derive(Debug, Default, PartialEq, StructOpt)]
pub struct ConfigArgs {
    /// Frames per second while active (1, 5 or 10).
    #[structopt(long)]
    normal_fps: Option<u8>,

    /// Frames per second while idle (1, 5 or 10).
    #[structopt(long)]
    idle_fps: Option<u8>,

    /// Seconds without a client before going idle (1 to 300).
    #[structopt(long)]
    idle_timeout_sec: Option<u16>,

    /// Enable or disable the sensor's temporal filter.
    #[structopt(long)]
    temporal_enabled: Option<bool>,

    /// Temporal filter strength (0.05 to 0.8).
    #[structopt(long)]
    alpha: Option<f32>,

    /// Offset added to every reading, in degrees Celsius (-5 to 5).
    #[structopt(long, allow_hyphen_values = true)]
    calibration_offset: Option<f32>,

    /// Enable or disable joining another WiFi network.
    #[structopt(long)]
    sta_enabled: Option<bool>,

    /// The SSID of the WiFi network to join.
    #[structopt(long)]
    sta_ssid: Option<String>,

    /// The password for the WiFi network to join.
    #[structopt(long)]
    sta_password: Option<String>,
}

impl From<ConfigArgs> for ConfigUpdate {
    fn from(args: ConfigArgs) -> Self {
        Self {
            normal_fps: args.normal_fps,
            idle_fps: args.idle_fps,
            idle_timeout_sec: args.idle_timeout_sec,
            temporal_enabled: args.temporal_enabled,
            alpha: args.alpha,
            calibration_offset: args.calibration_offset,
            sta_enabled: args.sta_enabled,
            sta_ssid: args.sta_ssid,
            sta_password: args.sta_password,
        }
    }
}
