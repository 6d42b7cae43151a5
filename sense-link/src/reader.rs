//! Streaming frame receiver
//!
//! Frames arrive back to back on the serial line with no delimiter between
//! them. [`MessageReader`] buffers incoming bytes until the header tags tell
//! it a complete frame is present, then decodes it. After a bad frame it
//! drops one byte and tries again from the next, so it locks back onto the
//! frame boundaries once the line is clean. A frame that passed its checksum
//! but carries an unknown error code is dropped whole.

use heapless::Vec;

use crate::codec::{peek_frame_len, MAX_FRAME_SIZE};
use crate::error::DecodeError;
use crate::fmt::{trace, warn};
use crate::message::Message;

/// The result of feeding a slice to the reader
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FeedResult<'input> {
    /// Consumed all input, no complete frame yet
    Consumed,

    /// Decoded a message. Contains the unread part of the input.
    Message {
        message: Message,
        remaining: &'input [u8],
    },

    /// Dropped a byte after a decode error. Contains the unread part of the input.
    Error {
        error: DecodeError,
        remaining: &'input [u8],
    },
}

/// Accumulates bytes from a serial channel into messages
#[derive(Debug, Clone, Default)]
pub struct MessageReader {
    buffer: Vec<u8, MAX_FRAME_SIZE>,
}

impl MessageReader {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Discard any partial frame
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Number of bytes waiting for the rest of their frame
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Feed a single byte to the reader
    ///
    /// Returns `Ok(Some(message))` when a complete valid frame is decoded,
    /// `Ok(None)` when more bytes are needed, or `Err` when the buffered bytes
    /// do not start a valid frame. In the error case one byte is discarded,
    /// or the whole frame when it passed the checksum but carries an
    /// unknown error code.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Message>, DecodeError> {
        if self.buffer.is_full() {
            // A full buffer always resolves in poll(), so this only
            // guards against misuse after an ignored error.
            self.discard(1);
        }
        let _ = self.buffer.push(byte);
        self.poll()
    }

    /// Try to decode what is already buffered
    ///
    /// After an error the bytes behind the dropped one may already hold a
    /// complete frame; call this until it returns `Ok(None)` to drain them
    /// without waiting for more input.
    pub fn poll(&mut self) -> Result<Option<Message>, DecodeError> {
        match Message::decode(&self.buffer) {
            Ok((message, used)) => {
                trace!("decoded {} byte frame", used);
                self.discard(used);
                Ok(Some(message))
            }
            Err(DecodeError::BufferTooShort) => Ok(None),
            Err(DecodeError::InvalidErrorCode) => {
                // The checksum matched, so the frame boundary is known
                let len = peek_frame_len(&self.buffer).unwrap_or(1);
                warn!("dropping {} byte frame with invalid error code", len);
                self.discard(len);
                Err(DecodeError::InvalidErrorCode)
            }
            Err(error) => {
                warn!("dropping byte after decode error: {:?}", error);
                self.discard(1);
                Err(error)
            }
        }
    }

    /// Feed multiple bytes to the reader
    ///
    /// Stops at the first decoded message or error and hands back the
    /// bytes it has not looked at yet.
    pub fn feed_bytes<'input>(&mut self, bytes: &'input [u8]) -> FeedResult<'input> {
        for (i, &byte) in bytes.iter().enumerate() {
            let remaining = &bytes[i + 1..];
            match self.feed(byte) {
                Ok(Some(message)) => return FeedResult::Message { message, remaining },
                Ok(None) => {}
                Err(error) => return FeedResult::Error { error, remaining },
            }
        }
        FeedResult::Consumed
    }

    fn discard(&mut self, n: usize) {
        let n = n.min(self.buffer.len());
        self.buffer.rotate_left(n);
        self.buffer.truncate(self.buffer.len() - n);
    }
}
