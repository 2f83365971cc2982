// SPDX-License-Identifier: GPL-3.0-or-later
use std::error::Error as StdError;
use std::fmt;

/// Errors that can occur when decoding a frame received from the sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeError {
    /// The buffer was not exactly one frame long. The length of the buffer is included.
    Length(usize),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Length(len) => write!(
                f,
                "frame buffer is {} bytes long, expected {}",
                len,
                crate::frame::FRAME_LENGTH
            ),
        }
    }
}

impl StdError for DecodeError {}
