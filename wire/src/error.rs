//! Error types for the wire layer.

use std::io;

/// Errors that can occur while encoding or decoding DAP messages.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// An I/O error occurred while reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The header section contained invalid UTF-8.
    #[error("invalid UTF-8 in header")]
    InvalidUtf8,

    /// The Content-Length header value could not be parsed as an integer.
    #[error("malformed Content-Length header value")]
    MalformedContentLength,

    /// No Content-Length header was found in the message.
    #[error("missing Content-Length header")]
    MissingContentLength,

    /// The message body exceeds the configured maximum size.
    #[error("message size {size} exceeds maximum allowed {max}")]
    MessageTooLarge {
        /// The actual message size.
        size: usize,
        /// The maximum allowed size.
        max: usize,
    },

    /// The message body was not valid JSON, or the envelope violated the
    /// protocol (e.g. a response without a `request_seq`).
    #[error("malformed message envelope: {0}")]
    Envelope(String),

    /// Failed to serialize the outgoing message to JSON.
    #[error("JSON serialization failed: {0}")]
    JsonSerialize(#[source] serde_json::Error),
}

impl CodecError {
    /// Whether the error poisons the stream.
    ///
    /// Non-fatal errors consume exactly the offending message, so the next
    /// frame decodes cleanly and the session keeps running. Fatal errors
    /// (I/O failure, an oversized frame the codec cannot skip past) must be
    /// treated as a transport failure.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CodecError::Io(_) | CodecError::MessageTooLarge { .. }
        )
    }
}

/// Errors from the second decode pass, parsing a retained message body
/// into a concrete schema.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    /// The body was present but did not match the expected schema.
    #[error("malformed message body: {0}")]
    Json(#[from] serde_json::Error),

    /// The message carried no body but the schema requires one.
    #[error("message body missing")]
    Missing,
}
