// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Context as _;
use futures::FutureExt;
use structopt::StructOpt;
use tokio::task::spawn_blocking;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::{Path, PathBuf};

mod connection;
mod device;
mod error;
mod frame;
mod pipeline;
mod render;
mod settings;
mod stream;
mod util;

use crate::device::{ConfigUpdate, DeviceClient};
use crate::render::RenderContext;
use crate::settings::{Args, Command, ConfigCommand, Settings};
use crate::util::flatten_join_result;

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout is kept for command output.
    let fmt_layer = fmt::layer().with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

async fn view(settings: Settings) -> anyhow::Result<()> {
    info!(device = %settings.device.address, "starting viewer");
    pipeline::Pipeline::new(settings)?.await
}

async fn show_config(settings: &Settings) -> anyhow::Result<()> {
    let client = DeviceClient::new(&settings.device)?;
    let config = client
        .fetch_config()
        .await
        .context("Unable to read device configuration")?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

async fn set_config(settings: &Settings, update: ConfigUpdate) -> anyhow::Result<()> {
    let client = DeviceClient::new(&settings.device)?;
    client
        .update_config(update)
        .await
        .context("Unable to update device configuration")?;
    info!("device configuration updated");
    Ok(())
}

async fn render_file(settings: &Settings, input: &Path, output: PathBuf) -> anyhow::Result<()> {
    let data = tokio::fs::read(input)
        .await
        .with_context(|| format!("Unable to read frame from {}", input.display()))?;
    let frame = frame::decode(data.as_slice())
        .with_context(|| format!("{} is not a valid frame", input.display()))?;
    debug!(summary = ?frame.summary(), "loaded frame");
    let render_settings = settings.render;
    spawn_blocking(move || {
        let mut context = RenderContext::from(&render_settings);
        let image = context
            .render(&frame)
            .compose(render_settings.output_scale)?;
        image
            .save(&output)
            .with_context(|| format!("Unable to write image to {}", output.display()))?;
        info!(path = %output.display(), "rendered frame");
        Ok::<_, anyhow::Error>(())
    })
    .map(flatten_join_result)
    .await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::from_args();
    let settings = Settings::load(&args.config_path).await?;
    debug!(?settings, "loaded settings");
    match args.command.unwrap_or_default() {
        Command::View => view(settings).await,
        Command::Config(ConfigCommand::Show) => show_config(&settings).await,
        Command::Config(ConfigCommand::Set(config_args)) => {
            set_config(&settings, config_args.into()).await
        }
        Command::Render { input, output } => render_file(&settings, &input, output).await,
    }
}
