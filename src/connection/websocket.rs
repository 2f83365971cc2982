// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::bail;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::sync::watch;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, trace, warn};
use tracing_futures::Instrument;
use url::Url;

use std::time::Duration;

use super::state::{ConnectionEvent, ConnectionState};
use crate::device::{DeviceClient, DeviceConfig};
use crate::settings::DeviceSettings;

/// The receiving ends of a [`FrameSource`].
#[derive(Clone, Debug)]
pub(crate) struct FrameReceivers {
    /// The most recent raw frame message. Older frames are overwritten if they haven't been
    /// taken yet.
    pub(crate) frames: watch::Receiver<Option<Bytes>>,
    pub(crate) state: watch::Receiver<ConnectionState>,
    /// The configuration fetched the last time the connection opened.
    pub(crate) device_config: watch::Receiver<Option<DeviceConfig>>,
}

/// Keeps a WebSocket connection to the sensor open, reconnecting after a delay whenever it
/// closes, and publishes every binary message received.
#[derive(Debug)]
pub(crate) struct FrameSource {
    url: Url,
    reconnect_delay: Duration,
    device: DeviceClient,
    state: ConnectionState,
    frames_tx: watch::Sender<Option<Bytes>>,
    state_tx: watch::Sender<ConnectionState>,
    config_tx: watch::Sender<Option<DeviceConfig>>,
}

impl FrameSource {
    pub(crate) fn new(settings: &DeviceSettings) -> anyhow::Result<(Self, FrameReceivers)> {
        let (frames_tx, frames) = watch::channel(None);
        let (state_tx, state) = watch::channel(ConnectionState::default());
        let (config_tx, device_config) = watch::channel(None);
        let source = Self {
            url: settings.websocket_url()?,
            reconnect_delay: settings.reconnect_delay(),
            device: DeviceClient::new(settings)?,
            state: ConnectionState::default(),
            frames_tx,
            state_tx,
            config_tx,
        };
        let receivers = FrameReceivers {
            frames,
            state,
            device_config,
        };
        Ok((source, receivers))
    }

    fn transition(&mut self, event: ConnectionEvent) {
        let next = self.state.on(event);
        if next != self.state {
            info!(url = %self.url, state = ?next, "connection state changed");
            self.state = next;
            // The status server may not be running, so nobody listening is fine.
            let _ = self.state_tx.send(next);
        }
    }

    /// Fetch the device configuration in the background. Failures are only logged.
    fn spawn_config_fetch(&self) {
        let device = self.device.clone();
        let config_tx = self.config_tx.clone();
        tokio::spawn(
            async move {
                match device.fetch_config().await {
                    Ok(config) => {
                        info!(
                            version = %config.version,
                            normal_fps = config.normal_fps,
                            temporal_enabled = config.temporal_enabled,
                            sta_connected = config.sta_connected,
                            "loaded device configuration"
                        );
                        let _ = config_tx.send(Some(config));
                    }
                    Err(err) => warn!("Unable to load device configuration: {:?}", err),
                }
            }
            .instrument(tracing::debug_span!("config_fetch")),
        );
    }

    /// Read messages until the connection closes. Returns an error only if nothing is listening
    /// for frames anymore.
    async fn read_frames<S>(&mut self, mut stream: S) -> anyhow::Result<ConnectionEvent>
    where
        S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
    {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Binary(data)) => {
                    trace!(length = data.len(), "received binary message");
                    if self.frames_tx.send(Some(Bytes::from(data))).is_err() {
                        bail!("Frame receiver closed");
                    }
                }
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "server closed the connection");
                    return Ok(ConnectionEvent::Closed);
                }
                Ok(other) => {
                    trace!(message = ?other, "ignoring non-binary message");
                }
                Err(err) => {
                    warn!("Error reading from frame stream: {:?}", err);
                    return Ok(ConnectionEvent::Failed);
                }
            }
        }
        Ok(ConnectionEvent::Closed)
    }

    /// Connect, stream frames, and reconnect forever.
    pub(crate) async fn run(mut self) -> anyhow::Result<()> {
        self.transition(ConnectionEvent::Connect);
        loop {
            debug!(url = %self.url, "connecting to frame stream");
            let ending = match tokio_tungstenite::connect_async(self.url.as_str()).await {
                Ok((stream, _response)) => {
                    self.transition(ConnectionEvent::Opened);
                    self.spawn_config_fetch();
                    self.read_frames(stream).await?
                }
                Err(err) => {
                    warn!(url = %self.url, "Unable to connect to frame stream: {}", err);
                    ConnectionEvent::Failed
                }
            };
            self.transition(ending);
            debug!(delay = ?self.reconnect_delay, "waiting before reconnecting");
            tokio::time::sleep(self.reconnect_delay).await;
            self.transition(ConnectionEvent::RetryElapsed);
        }
    }
}

#[cfg(test)]
mod test {
    use bytes::Bytes;
    use futures::stream;
    use tokio_tungstenite::tungstenite::{self, Message};

    use super::FrameSource;
    use crate::connection::state::{ConnectionEvent, ConnectionState};
    use crate::settings::DeviceSettings;

    fn source() -> (FrameSource, super::FrameReceivers) {
        FrameSource::new(&DeviceSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn binary_messages_published() {
        let (mut source, receivers) = source();
        let messages = stream::iter(vec![
            Ok(Message::Text("hello".to_string())),
            Ok(Message::Binary(vec![1, 2, 3])),
            Ok(Message::Binary(vec![4, 5])),
        ]);
        let ending = source.read_frames(messages).await.unwrap();
        assert_eq!(ending, ConnectionEvent::Closed);
        // Only the latest frame is kept.
        assert_eq!(*receivers.frames.borrow(), Some(Bytes::from_static(&[4, 5])));
    }

    #[tokio::test]
    async fn text_ignored() {
        let (mut source, receivers) = source();
        let messages = stream::iter(vec![Ok(Message::Text("{}".to_string()))]);
        source.read_frames(messages).await.unwrap();
        assert_eq!(*receivers.frames.borrow(), None);
    }

    #[tokio::test]
    async fn errors_end_the_connection() {
        let (mut source, _receivers) = source();
        let messages = stream::iter(vec![
            Err(tungstenite::Error::ConnectionClosed),
            Ok(Message::Binary(vec![1])),
        ]);
        let ending = source.read_frames(messages).await.unwrap();
        assert_eq!(ending, ConnectionEvent::Failed);
    }

    #[tokio::test]
    async fn dropped_receiver() {
        let (mut source, receivers) = source();
        drop(receivers);
        let messages = stream::iter(vec![Ok(Message::Binary(vec![1]))]);
        assert!(source.read_frames(messages).await.is_err());
    }

    #[test]
    fn state_published() {
        let (mut source, receivers) = source();
        source.transition(ConnectionEvent::Connect);
        assert_eq!(*receivers.state.borrow(), ConnectionState::Connecting);
        source.transition(ConnectionEvent::Opened);
        assert_eq!(*receivers.state.borrow(), ConnectionState::Connected);
        source.transition(ConnectionEvent::Failed);
        assert_eq!(*receivers.state.borrow(), ConnectionState::Disconnected);
    }
}
