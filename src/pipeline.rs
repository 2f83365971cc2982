// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Context as _;
use bytes::Bytes;
use futures::future::{Future, FutureExt};
use futures::ready;
use futures::stream::{FuturesUnordered, Stream};
use pin_project::pin_project;
use tokio::sync::{mpsc, watch};
use tokio::task::spawn_blocking;
use tracing::{debug, info, info_span, trace};
use tracing_futures::Instrument;

use std::pin::Pin;
use std::task::{Context, Poll};

use crate::connection::FrameSource;
use crate::frame::FrameSummary;
use crate::render::{BytesImage, RenderCommand, RenderContext};
use crate::settings::Settings;
use crate::stream::{self, MjpegStream, RenderStatus, StatusSources};
use crate::util::flatten_join_result;

type InnerTask = Pin<Box<dyn Future<Output = anyhow::Result<()>>>>;
type TaskList = FuturesUnordered<InnerTask>;

/// How many render commands can be waiting before the HTTP handlers have to wait.
const COMMAND_BUFFER: usize = 8;

/// The live viewer: a connection to the sensor, the render loop, and the HTTP server.
///
/// The pipeline finishes as soon as any one of those finishes.
#[pin_project]
pub(crate) struct Pipeline {
    #[pin]
    tasks: TaskList,
}

impl Pipeline {
    pub(crate) fn new(settings: Settings) -> anyhow::Result<Self> {
        let tasks = TaskList::new();
        let (source, receivers) =
            FrameSource::new(&settings.device).context("Error configuring frame source")?;
        tasks.push(
            tokio::spawn(source.run().instrument(info_span!("frame_source")))
                .map(flatten_join_result)
                .boxed(),
        );
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let context = RenderContext::from(&settings.render);
        let (status_tx, status_rx) = watch::channel(RenderStatus::new(&context, None));
        let streams = settings.streams;
        let mjpeg = if streams.enabled && streams.mjpeg.enabled {
            Some(MjpegStream::new())
        } else {
            None
        };
        let render_loop = RenderLoop {
            context,
            frames: receivers.frames.clone(),
            commands: command_rx,
            status: status_tx,
            last_summary: None,
            mjpeg: mjpeg.clone(),
            output_scale: settings.render.output_scale,
            jpeg_quality: streams.mjpeg.quality,
        };
        tasks.push(
            tokio::spawn(render_loop.run().instrument(info_span!("render_loop")))
                .map(flatten_join_result)
                .boxed(),
        );
        if streams.enabled {
            let route = stream::routes(
                mjpeg,
                StatusSources::new(status_rx, &receivers),
                command_tx,
            )
            .context("Error creating viewer routes")?;
            let bind_address = streams.bind_address();
            debug!(address = ?bind_address, "creating warp server");
            let (bound_address, server) = warp::serve(route)
                .try_bind_ephemeral(bind_address)
                .with_context(|| format!("Unable to bind HTTP server to {}", bind_address))?;
            info!(address = %bound_address, "serving viewer");
            tasks.push(server.instrument(info_span!("warp_server")).map(Ok).boxed());
        } else {
            info!("HTTP server disabled, frames will only be rendered");
        }
        Ok(Self { tasks })
    }
}

impl Future for Pipeline {
    type Output = anyhow::Result<()>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        let res = ready!(this.tasks.as_mut().poll_next(cx)).unwrap_or(Ok(()));
        debug!(result = ?res, "Pipeline terminating");
        Poll::Ready(res)
    }
}

/// Owns the [`RenderContext`] and renders the newest frame whenever one arrives.
struct RenderLoop {
    context: RenderContext,
    frames: watch::Receiver<Option<Bytes>>,
    commands: mpsc::Receiver<RenderCommand>,
    status: watch::Sender<RenderStatus>,
    last_summary: Option<FrameSummary>,
    mjpeg: Option<MjpegStream>,
    output_scale: u32,
    jpeg_quality: u8,
}

impl RenderLoop {
    async fn run(mut self) -> anyhow::Result<()> {
        loop {
            tokio::select! {
                changed = self.frames.changed() => {
                    if changed.is_err() {
                        info!("frame source closed, stopping renderer");
                        return Ok(());
                    }
                    let message = self.frames.borrow().clone();
                    if let Some(message) = message {
                        self.render(message).await?;
                    }
                }
                Some(command) = self.commands.recv() => {
                    self.context.apply(command);
                    self.publish_status();
                }
            }
        }
    }

    fn publish_status(&self) {
        // Nobody is listening when the HTTP server is disabled.
        let _ = self
            .status
            .send(RenderStatus::new(&self.context, self.last_summary));
    }

    async fn render(&mut self, message: Bytes) -> anyhow::Result<()> {
        // The context is moved onto the blocking thread and back again once the frame is drawn.
        let context = std::mem::take(&mut self.context);
        let output_scale = self.output_scale;
        let (context, rendered) = spawn_blocking(move || {
            let mut context = context;
            let rendered = context
                .handle_message(&message)
                .map(|frame| frame.compose(output_scale).map(|image| (frame.summary, image)))
                .transpose();
            Ok::<_, anyhow::Error>((context, rendered))
        })
        .map(flatten_join_result)
        .await
        .context("Error within render thread")?;
        self.context = context;
        let (summary, image) = match rendered.context("Error composing rendered frame")? {
            Some(rendered) => rendered,
            None => return Ok(()),
        };
        self.last_summary = Some(summary);
        self.publish_status();
        if let Some(mjpeg) = &self.mjpeg {
            self.send_mjpeg(mjpeg, image).await?;
        }
        Ok(())
    }

    async fn send_mjpeg(&self, mjpeg: &MjpegStream, image: BytesImage) -> anyhow::Result<()> {
        let quality = self.jpeg_quality;
        let jpeg = spawn_blocking(move || stream::encode_jpeg(&image, quality))
            .map(flatten_join_result)
            .await
            .context("Error with JPEG encoding thread")?;
        trace!(length = jpeg.len(), "sending MJPEG frame");
        mjpeg
            .send_frame(jpeg)
            .context("Unable to send frame to MJPEG stream")
    }
}
