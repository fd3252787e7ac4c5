//! Content-Length framing codec.
//!
//! Implements both the `Encoder` and `Decoder` traits from tokio-util for
//! the DAP wire format:
//!
//! ```text
//! Content-Length: <length>\r\n
//! \r\n
//! <JSON body>
//! ```
//!
//! Decoding performs only the first pass over the body (see
//! [`crate::Envelope`]); the bytes are retained in the produced [`Frame`]
//! for the second, schema-aware pass at the dispatch site.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::envelope::{Envelope, Frame, OutgoingMessage};
use crate::error::CodecError;

/// Default maximum message size (16 MB).
const DEFAULT_MAX_MESSAGE_SIZE: usize = 16 * 1024 * 1024;

const HEADER_NAME: &[u8] = b"Content-Length";

/// Codec for encoding and decoding DAP messages.
#[derive(Debug, Clone)]
pub struct DapCodec {
    /// Maximum allowed message size in bytes.
    max_message_size: usize,
}

impl DapCodec {
    /// Create a new codec with default settings.
    pub fn new() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
        }
    }

    /// Create a new codec with a custom maximum message size.
    ///
    /// Messages larger than this are rejected with
    /// [`CodecError::MessageTooLarge`].
    pub fn with_max_size(max_message_size: usize) -> Self {
        Self { max_message_size }
    }
}

impl Default for DapCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for DapCodec {
    type Item = Frame;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // Resync: skip any noise before the start of the next header. This
        // is what lets a dropped malformed message leave the stream usable.
        let Some(start_pos) = src
            .windows(HEADER_NAME.len())
            .position(|w| w == HEADER_NAME)
        else {
            return Ok(None);
        };
        src.advance(start_pos);

        // Header/body separator.
        let Some(header_end) = src.windows(4).position(|w| w == b"\r\n\r\n") else {
            return Ok(None);
        };

        let content_length = match parse_content_length(&src[..header_end]) {
            Ok(len) => len,
            Err(e) => {
                // The header is unusable, so its length prefix cannot be
                // trusted; skip past it and resync on the next header.
                src.advance(header_end + 4);
                return Err(e);
            }
        };

        if content_length > self.max_message_size {
            return Err(CodecError::MessageTooLarge {
                size: content_length,
                max: self.max_message_size,
            });
        }

        // Header + \r\n\r\n + body.
        let total_length = header_end + 4 + content_length;
        if src.len() < total_length {
            src.reserve(total_length - src.len());
            return Ok(None);
        }

        let body_start = header_end + 4;
        let payload: Bytes = src[body_start..total_length].to_vec().into();

        // The message is consumed whether or not the envelope parses: a
        // malformed body must not affect the frames that follow it.
        src.advance(total_length);

        match Envelope::from_payload(&payload) {
            Ok(envelope) => Ok(Some(Frame::new(envelope, payload))),
            Err(reason) => Err(CodecError::Envelope(reason)),
        }
    }
}

impl Encoder<OutgoingMessage> for DapCodec {
    type Error = CodecError;

    fn encode(&mut self, item: OutgoingMessage, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item).map_err(CodecError::JsonSerialize)?;

        dst.reserve(32 + json.len());
        dst.put_slice(b"Content-Length: ");
        dst.put_slice(json.len().to_string().as_bytes());
        dst.put_slice(b"\r\n\r\n");
        dst.put_slice(&json);

        Ok(())
    }
}

/// Parse the Content-Length value from the header section.
fn parse_content_length(header: &[u8]) -> Result<usize, CodecError> {
    let header_str = std::str::from_utf8(header).map_err(|_| CodecError::InvalidUtf8)?;

    for line in header_str.split("\r\n") {
        if let Some(value) = line.strip_prefix("Content-Length:") {
            return value
                .trim()
                .parse()
                .map_err(|_| CodecError::MalformedContentLength);
        }
    }

    Err(CodecError::MissingContentLength)
}
