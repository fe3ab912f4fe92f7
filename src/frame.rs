//! gRPC message framing.
//!
//! Each gRPC message on the wire is prefixed with a five byte header:
//!
//! ```text
//! +------+----------+----------------+
//! | flag | length   | payload        |
//! | 1B   | 4B (BE)  | length bytes   |
//! +------+----------+----------------+
//! ```
//!
//! The flag marks compressed payloads. Decompression is not supported; the flag is exposed but
//! otherwise ignored and the payload is decoded as-is.

use crate::decode::{Decoder, Message};
use crate::error::*;
use snafu::ensure;

/// Size of the gRPC frame header.
pub const HEADER_LEN: usize = 5;

/// A single gRPC frame borrowed from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a>
{
    /// Compression flag.
    pub flag: u8,

    /// Frame payload.
    pub payload: &'a [u8],
}

impl<'a> Frame<'a>
{
    /// Parse the frame at the start of `data`.
    ///
    /// Bytes after the frame payload are ignored.
    ///
    /// ```
    /// use protoguess::Frame;
    ///
    /// let frame = Frame::parse(b"\x00\x00\x00\x00\x02\x08\x01trailing").unwrap();
    /// assert_eq!(frame.payload, b"\x08\x01");
    /// assert_eq!(frame.total_size(), 7);
    /// ```
    pub fn parse(data: &'a [u8]) -> Result<Self>
    {
        ensure!(
            data.len() >= HEADER_LEN,
            MissingFrameHeader { found: data.len() }
        );

        let flag = data[0];
        let length = u32::from_be_bytes([data[1], data[2], data[3], data[4]]) as usize;
        let body = &data[HEADER_LEN..];
        ensure!(
            body.len() >= length,
            IncompleteFrame {
                wanted: length,
                found: body.len()
            }
        );

        Ok(Frame {
            flag,
            payload: &body[..length],
        })
    }

    /// Bytes the frame occupies in the input, header included.
    pub fn total_size(&self) -> usize
    {
        HEADER_LEN + self.payload.len()
    }

    /// True if the sender marked the payload as compressed.
    pub fn is_compressed(&self) -> bool
    {
        self.flag != 0
    }
}

impl Decoder
{
    /// Strip the gRPC frame header and decode the payload.
    ///
    /// Returns the message and the number of input bytes the frame occupied.
    ///
    /// ```
    /// use protoguess::{Decoder, Field};
    ///
    /// let (msg, consumed) = Decoder::new()
    ///     .decode_grpc(b"\x00\x00\x00\x00\x03\x08\x96\x01")
    ///     .unwrap();
    /// assert_eq!(consumed, 8);
    /// assert_eq!(msg.first(1), Some(&Field::Numeric(150)));
    /// ```
    pub fn decode_grpc(&self, data: &[u8]) -> Result<(Message, usize)>
    {
        let frame = Frame::parse(data)?;
        if frame.is_compressed() {
            log::warn!(
                "gRPC frame has compression flag {}; decoding the payload as-is",
                frame.flag
            );
        }

        let msg = self.decode(frame.payload)?;
        Ok((msg, frame.total_size()))
    }

    /// Decode every gRPC frame in a buffer of back-to-back frames.
    ///
    /// The frames must cover the whole buffer; any malformed frame fails the whole call.
    pub fn decode_grpc_stream(&self, mut data: &[u8]) -> Result<Vec<Message>>
    {
        let mut messages = vec![];
        while !data.is_empty() {
            let (msg, consumed) = self.decode_grpc(data)?;
            messages.push(msg);
            data = &data[consumed..];
        }

        log::debug!("Decoded {} gRPC frames", messages.len());
        Ok(messages)
    }
}

/// Strip the gRPC frame header and decode the payload with the default options.
///
/// See [`Decoder::decode_grpc`].
pub fn decode_grpc(data: &[u8]) -> Result<(Message, usize)>
{
    Decoder::default().decode_grpc(data)
}
