//! DAP wire layer.
//!
//! This crate handles the byte-level concerns of talking to a debug
//! adapter: Content-Length framing, the message envelope, and the typed
//! request/response/event schemas.
//!
//! # Architecture
//!
//! The crate is designed around the tokio-util codec pattern:
//!
//! - [`DapCodec`] implements both `Encoder` and `Decoder` for DAP messages
//! - [`DapReader`] wraps an `AsyncRead` to produce a `Stream` of [`Frame`]s
//! - [`DapWriter`] wraps an `AsyncWrite` to provide a `Sink` for outgoing
//!   messages
//!
//! # Two-pass decoding
//!
//! Inbound messages are decoded in two passes. The codec's first pass reads
//! only the [`Envelope`] (`seq`, `type`, and for responses
//! `request_seq`/`success`/`message`) while keeping the raw body bytes
//! unparsed inside the [`Frame`]. The shape of the body depends on which
//! request or event kind the message belongs to, and that is only known
//! once the envelope has been matched against the pending-request registry
//! or the event table. The second pass happens at the dispatch site via
//! [`Frame::parse_body`], deserializing the retained bytes into the
//! concrete schema from [`responses`] or [`events`].
//!
//! # Scope
//!
//! This crate intentionally handles only wire concerns. Request-response
//! correlation, event routing, and session state belong in the `session`
//! crate; process management belongs in `adapter`.

mod codec;
mod envelope;
mod error;
mod reader;
mod transport;
mod writer;

pub mod events;
pub mod requests;
pub mod responses;
pub mod testing;
pub mod types;

pub use codec::DapCodec;
pub use envelope::{Envelope, Frame, OutgoingEvent, OutgoingMessage, OutgoingResponse, Request};
pub use error::{BodyError, CodecError};
pub use reader::DapReader;
pub use transport::{DapTransport, split};
pub use writer::DapWriter;
