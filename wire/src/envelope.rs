//! The message envelope and the incoming/outgoing frame types.
//!
//! [`Envelope`] is the result of the cheap first decode pass: just enough
//! of the message to route it (sequence numbers, type tag, success flag,
//! event kind). The unparsed body travels alongside it in a [`Frame`] until
//! the dispatch site knows which concrete schema applies.

use bytes::Bytes;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::BodyError;
use crate::requests::Command;
use crate::types::Seq;

/// The light first-pass view of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// A "reverse request" from the adapter to the client.
    Request {
        seq: Seq,
        /// The command the adapter wants the client to execute.
        command: String,
    },
    /// A response to a previously sent request.
    Response {
        seq: Seq,
        /// Sequence number of the request this response answers.
        request_seq: Seq,
        /// Whether the request succeeded.
        success: bool,
        /// The command that was requested, echoed back by the adapter.
        command: Option<String>,
        /// Adapter-supplied error message when `success` is false.
        message: Option<String>,
    },
    /// An unsolicited event.
    Event {
        seq: Seq,
        /// The event kind string, e.g. `"stopped"`.
        event: String,
    },
}

/// Serde-level mirror of the fields the first pass is allowed to look at.
/// Everything else in the message (notably `body`) is skipped.
#[derive(Deserialize)]
struct RawEnvelope {
    seq: Seq,
    #[serde(rename = "type")]
    kind: String,
    request_seq: Option<Seq>,
    success: Option<bool>,
    message: Option<String>,
    event: Option<String>,
    command: Option<String>,
}

impl Envelope {
    /// First decode pass: extract the envelope from a raw message body,
    /// without materializing the kind-specific payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self, String> {
        let raw: RawEnvelope =
            serde_json::from_slice(payload).map_err(|e| e.to_string())?;

        match raw.kind.as_str() {
            "request" => Ok(Envelope::Request {
                seq: raw.seq,
                command: raw
                    .command
                    .ok_or_else(|| "request without command".to_string())?,
            }),
            "response" => Ok(Envelope::Response {
                seq: raw.seq,
                request_seq: raw
                    .request_seq
                    .ok_or_else(|| "response without request_seq".to_string())?,
                success: raw
                    .success
                    .ok_or_else(|| "response without success flag".to_string())?,
                command: raw.command,
                message: raw.message,
            }),
            "event" => Ok(Envelope::Event {
                seq: raw.seq,
                event: raw.event.ok_or_else(|| "event without kind".to_string())?,
            }),
            other => Err(format!("unknown message type {other:?}")),
        }
    }

    /// The message's own sequence number.
    pub fn seq(&self) -> Seq {
        match self {
            Envelope::Request { seq, .. }
            | Envelope::Response { seq, .. }
            | Envelope::Event { seq, .. } => *seq,
        }
    }
}

/// One complete inbound message: the parsed envelope plus the raw body
/// bytes, retained for the second decode pass.
#[derive(Debug, Clone)]
pub struct Frame {
    pub envelope: Envelope,
    payload: Bytes,
}

/// Serde helper: the body is nested under the `body` key of the message.
#[derive(Deserialize)]
struct BodyOnly<T> {
    body: Option<T>,
}

impl Frame {
    /// Construct a frame directly. Useful for tests and mock adapters;
    /// real traffic comes out of [`crate::DapCodec`].
    pub fn new(envelope: Envelope, payload: impl Into<Bytes>) -> Self {
        Self {
            envelope,
            payload: payload.into(),
        }
    }

    /// Second decode pass: re-parse the retained message with a concrete
    /// schema, now that the caller knows which one applies.
    pub fn parse_body<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        let BodyOnly { body } = serde_json::from_slice(&self.payload)?;
        body.ok_or(BodyError::Missing)
    }

    /// Second-pass parse of a request frame's `arguments`. Used for
    /// reverse requests and by mock adapters in tests.
    pub fn parse_arguments<T: DeserializeOwned>(&self) -> Result<T, BodyError> {
        #[derive(Deserialize)]
        struct ArgumentsOnly<T> {
            arguments: Option<T>,
        }
        let ArgumentsOnly { arguments } = serde_json::from_slice(&self.payload)?;
        arguments.ok_or(BodyError::Missing)
    }

    /// The event kind string, if this frame is an event.
    pub fn event_kind(&self) -> Option<&str> {
        match &self.envelope {
            Envelope::Event { event, .. } => Some(event),
            _ => None,
        }
    }
}

/// An outgoing request: `seq` plus the command and its arguments.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    pub seq: Seq,
    #[serde(flatten)]
    pub command: Command,
}

/// An outgoing response message (used by mock adapters in tests).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingResponse {
    pub seq: Seq,
    #[serde(rename = "request_seq")]
    pub request_seq: Seq,
    pub success: bool,
    pub command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// An outgoing event message (used by mock adapters in tests).
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEvent {
    pub seq: Seq,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
}

/// An outgoing message to hand to the encoder.
///
/// The client only ever sends `Request`s; the `Response` and `Event`
/// variants exist so the in-memory mock adapter used in tests can speak
/// the same wire format.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutgoingMessage {
    Request(Request),
    Response(OutgoingResponse),
    Event(OutgoingEvent),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requests::{Command, ContinueArgs};

    #[test]
    fn envelope_from_event() {
        let payload = br#"{"seq":4,"type":"event","event":"stopped","body":{"reason":"breakpoint"}}"#;
        let envelope = Envelope::from_payload(payload).unwrap();
        assert_eq!(
            envelope,
            Envelope::Event {
                seq: 4,
                event: "stopped".to_string()
            }
        );
    }

    #[test]
    fn envelope_from_response() {
        let payload =
            br#"{"seq":9,"type":"response","request_seq":3,"success":false,"command":"continue","message":"nope"}"#;
        let envelope = Envelope::from_payload(payload).unwrap();
        let Envelope::Response {
            request_seq,
            success,
            message,
            ..
        } = envelope
        else {
            panic!("expected response envelope");
        };
        assert_eq!(request_seq, 3);
        assert!(!success);
        assert_eq!(message.as_deref(), Some("nope"));
    }

    #[test]
    fn envelope_rejects_response_without_request_seq() {
        let payload = br#"{"seq":9,"type":"response","success":true}"#;
        assert!(Envelope::from_payload(payload).is_err());
    }

    #[test]
    fn envelope_rejects_unknown_type() {
        let payload = br#"{"seq":1,"type":"banana"}"#;
        assert!(Envelope::from_payload(payload).is_err());
    }

    #[test]
    fn second_pass_reads_retained_body() {
        let payload: &[u8] =
            br#"{"seq":4,"type":"event","event":"exited","body":{"exitCode":3}}"#;
        let envelope = Envelope::from_payload(payload).unwrap();
        let frame = Frame::new(envelope, payload);

        #[derive(serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Exited {
            exit_code: i64,
        }

        let body: Exited = frame.parse_body().unwrap();
        assert_eq!(body.exit_code, 3);
    }

    #[test]
    fn second_pass_reports_missing_body() {
        let payload: &[u8] = br#"{"seq":4,"type":"event","event":"terminated"}"#;
        let envelope = Envelope::from_payload(payload).unwrap();
        let frame = Frame::new(envelope, payload);

        let result: Result<serde_json::Value, _> = frame.parse_body();
        assert!(matches!(result, Err(BodyError::Missing)));
    }

    #[test]
    fn serialize_outgoing_request() {
        let msg = OutgoingMessage::Request(Request {
            seq: 7,
            command: Command::Continue(ContinueArgs { thread_id: 2 }),
        });

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "request");
        assert_eq!(json["seq"], 7);
        assert_eq!(json["command"], "continue");
        assert_eq!(json["arguments"]["threadId"], 2);
    }

    #[test]
    fn serialize_outgoing_request_without_arguments() {
        let msg = OutgoingMessage::Request(Request {
            seq: 1,
            command: Command::ConfigurationDone,
        });

        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["command"], "configurationDone");
        assert!(json.get("arguments").is_none());
    }
}
