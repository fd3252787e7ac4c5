//! Typed wrapper around a framed async writer for outgoing messages.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Sink;
use pin_project_lite::pin_project;
use tokio::io::AsyncWrite;
use tokio_util::codec::FramedWrite;

use crate::codec::DapCodec;
use crate::envelope::OutgoingMessage;
use crate::error::CodecError;

pin_project! {
    /// An async sink for outgoing DAP messages.
    pub struct DapWriter<W> {
        #[pin]
        inner: FramedWrite<W, DapCodec>,
    }
}

impl<W> DapWriter<W>
where
    W: AsyncWrite + Unpin,
{
    pub fn new(writer: W) -> Self {
        Self {
            inner: FramedWrite::new(writer, DapCodec::new()),
        }
    }

    /// Send one message: feed, flush, and await completion.
    pub async fn send(&mut self, msg: OutgoingMessage) -> Result<(), CodecError> {
        use futures::SinkExt;
        SinkExt::send(&mut self.inner, msg).await
    }
}

impl<W> Sink<OutgoingMessage> for DapWriter<W>
where
    W: AsyncWrite + Unpin,
{
    type Error = CodecError;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.project().inner.poll_ready(cx)
    }

    fn start_send(self: Pin<&mut Self>, item: OutgoingMessage) -> Result<(), Self::Error> {
        self.project().inner.start_send(item)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.project().inner.poll_flush(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.project().inner.poll_close(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Request;
    use crate::requests::Command;
    use std::io::Cursor;

    #[tokio::test]
    async fn write_single_message() {
        let mut writer = DapWriter::new(Cursor::new(Vec::new()));

        let msg = OutgoingMessage::Request(Request {
            seq: 1,
            command: Command::ConfigurationDone,
        });
        writer.send(msg).await.unwrap();

        let output = writer.inner.into_inner().into_inner();
        let output_str = String::from_utf8(output).unwrap();
        assert!(output_str.starts_with("Content-Length: "));
        assert!(output_str.contains("\r\n\r\n"));
        assert!(output_str.contains(r#""command":"configurationDone""#));
    }
}
