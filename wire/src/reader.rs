//! Typed wrapper around a framed async reader producing [`Frame`]s.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use pin_project_lite::pin_project;
use tokio::io::AsyncRead;
use tokio_util::codec::FramedRead;

use crate::codec::DapCodec;
use crate::envelope::Frame;
use crate::error::CodecError;

pin_project! {
    /// An async stream of inbound DAP frames.
    ///
    /// Wraps an [`AsyncRead`] source and decodes envelope-parsed frames
    /// from the byte stream. Non-fatal decode errors are yielded as `Err`
    /// items with the offending message already consumed, so callers can
    /// log and keep reading; `None` means the adapter closed its end.
    pub struct DapReader<R> {
        #[pin]
        inner: FramedRead<R, DapCodec>,
    }
}

impl<R> DapReader<R>
where
    R: AsyncRead + Unpin,
{
    pub fn new(reader: R) -> Self {
        Self {
            inner: FramedRead::new(reader, DapCodec::new()),
        }
    }

    /// Create a reader with a custom codec, e.g. a different maximum
    /// message size.
    pub fn with_codec(reader: R, codec: DapCodec) -> Self {
        Self {
            inner: FramedRead::new(reader, codec),
        }
    }
}

impl<R> Stream for DapReader<R>
where
    R: AsyncRead + Unpin,
{
    type Item = Result<Frame, CodecError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}
