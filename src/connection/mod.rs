// SPDX-License-Identifier: GPL-3.0-or-later
mod state;
mod websocket;

pub(crate) use state::ConnectionState;
pub(crate) use websocket::{FrameReceivers, FrameSource};
