//! In-memory transport for testing.

use tokio::io::{DuplexStream, duplex};

use crate::transport::DapTransport;

/// An in-memory transport for testing DAP communication without a real
/// adapter process.
///
/// Uses tokio's [`DuplexStream`] to provide a bidirectional channel.
/// [`MemoryTransport::pair`] returns two connected transports: what one
/// side writes, the other side reads, so one half can play the adapter.
pub struct MemoryTransport {
    read: DuplexStream,
    write: DuplexStream,
}

impl MemoryTransport {
    /// Create a connected pair of in-memory transports with a 64KB buffer
    /// per direction.
    pub fn pair() -> (Self, Self) {
        Self::pair_with_buffer_size(64 * 1024)
    }

    /// Create a connected pair with a custom buffer size. Smaller buffers
    /// are useful for exercising backpressure.
    pub fn pair_with_buffer_size(buffer_size: usize) -> (Self, Self) {
        let (a_to_b_write, a_to_b_read) = duplex(buffer_size);
        let (b_to_a_write, b_to_a_read) = duplex(buffer_size);

        let transport_a = MemoryTransport {
            read: b_to_a_read,
            write: a_to_b_write,
        };

        let transport_b = MemoryTransport {
            read: a_to_b_read,
            write: b_to_a_write,
        };

        (transport_a, transport_b)
    }
}

impl DapTransport for MemoryTransport {
    type Read = DuplexStream;
    type Write = DuplexStream;

    fn into_split(self) -> (Self::Read, Self::Write) {
        (self.read, self.write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{OutgoingEvent, OutgoingMessage};
    use crate::split;
    use futures::StreamExt;

    #[tokio::test]
    async fn memory_transport_roundtrip() {
        let (client, server) = MemoryTransport::pair();

        let (mut client_reader, _client_writer) = split(client);
        let (_server_reader, mut server_writer) = split(server);

        let event = OutgoingMessage::Event(OutgoingEvent {
            seq: 1,
            event: "initialized".to_string(),
            body: None,
        });
        server_writer.send(event).await.unwrap();

        let frame = client_reader.next().await.unwrap().unwrap();
        assert_eq!(frame.event_kind(), Some("initialized"));
    }

    #[tokio::test]
    async fn memory_transport_close_signals_eof() {
        let (client, server) = MemoryTransport::pair();

        let (mut client_reader, _client_writer) = split(client);
        let (_server_reader, server_writer) = split(server);

        drop(server_writer);
        assert!(client_reader.next().await.is_none());
    }
}
