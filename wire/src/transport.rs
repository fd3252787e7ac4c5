//! Transport abstraction and split functionality.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::reader::DapReader;
use crate::writer::DapWriter;

/// A bidirectional byte stream to a debug adapter that can be split into
/// separate read and write halves.
///
/// Implemented by the adapter subprocess's stdio pair (in the `adapter`
/// crate) and by the in-memory duplex transport used in tests.
pub trait DapTransport: Send + 'static {
    /// The read half type.
    type Read: AsyncRead + Unpin + Send + 'static;
    /// The write half type.
    type Write: AsyncWrite + Unpin + Send + 'static;

    /// Split the transport into separate read and write halves.
    fn into_split(self) -> (Self::Read, Self::Write);
}

/// Split a transport into a DAP reader and writer pair.
///
/// The returned halves can be used independently and concurrently; the
/// session owns both and multiplexes over them.
pub fn split<T: DapTransport>(transport: T) -> (DapReader<T::Read>, DapWriter<T::Write>) {
    let (read, write) = transport.into_split();
    (DapReader::new(read), DapWriter::new(write))
}
