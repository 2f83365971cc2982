// SPDX-License-Identifier: GPL-3.0-or-later
use serde::Serialize;
use tracing::trace;

/// The lifecycle of the connection to the sensor's frame stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::Disconnected
    }
}

/// Things that happen to the connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ConnectionEvent {
    /// A connection attempt was started.
    Connect,
    /// The WebSocket handshake completed.
    Opened,
    /// The connection closed, either cleanly or because the attempt failed.
    Closed,
    /// The connection failed with an error.
    Failed,
    /// The reconnection delay has passed.
    RetryElapsed,
}

impl ConnectionState {
    /// The state after `event` happens. Events that don't apply to the current state leave it
    /// unchanged.
    pub(crate) fn on(self, event: ConnectionEvent) -> Self {
        use ConnectionEvent::*;
        use ConnectionState::*;
        let next = match (self, event) {
            (Disconnected, Connect) | (Disconnected, RetryElapsed) => Connecting,
            (Connecting, Opened) => Connected,
            (Connecting, Closed) | (Connecting, Failed) => Disconnected,
            (Connected, Closed) | (Connected, Failed) => Disconnected,
            (state, _) => state,
        };
        trace!(from = ?self, ?event, to = ?next, "connection state transition");
        next
    }
}
