// SPDX-License-Identifier: GPL-3.0-or-later
use bytes::{Buf, Bytes};
use futures::future;
use futures::stream::StreamExt;
use hyper::Body;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use std::sync::Arc;

type WriteChannel = watch::Sender<Bytes>;
type ReadChannel = watch::Receiver<Bytes>;

pub(crate) type FrameError = watch::error::SendError<Bytes>;

/// A `multipart/x-mixed-replace` stream of JPEG images.
///
/// Every HTTP client gets its own view of the stream, and only ever sees the most recent frame.
#[derive(Clone, Debug)]
pub(crate) struct MjpegStream {
    boundary: String,
    rx_handle: ReadChannel,
    tx_handle: Arc<WriteChannel>,
}

impl MjpegStream {
    pub(crate) fn new() -> Self {
        let (tx, rx) = watch::channel(Bytes::new());
        Self {
            boundary: "ironbow_view_boundary".to_string(),
            rx_handle: rx,
            tx_handle: Arc::new(tx),
        }
    }

    pub(crate) fn body(&self) -> Body {
        let part_stream = WatchStream::new(self.rx_handle.clone())
            // The channel starts out empty, skip that until a real frame comes in.
            .filter(|part| future::ready(!part.is_empty()))
            .map(Result::<Bytes, hyper::http::Error>::Ok);
        Body::wrap_stream(part_stream)
    }

    pub(crate) fn content_type(&self) -> String {
        format!("multipart/x-mixed-replace; boundary={}", self.boundary)
    }

    /// Frame an encoded JPEG image and send it out to every connected client.
    pub(crate) fn send_frame(&self, jpeg: Bytes) -> Result<(), FrameError> {
        let header = Bytes::from(format!(
            "\r\n--{}\r\nContent-Type: image/jpeg\r\nContent-Length: {}\r\n\r\n",
            self.boundary,
            jpeg.len()
        ));
        let total_length = header.len() + jpeg.len();
        let part = header.chain(jpeg).copy_to_bytes(total_length);
        self.tx_handle.send(part)
    }
}
