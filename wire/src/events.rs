//! Typed event bodies and the per-kind second-pass parser.

use serde::Deserialize;

use crate::envelope::Frame;
use crate::error::BodyError;
use crate::types::{Breakpoint, BreakpointId, ThreadId};

/// A decoded adapter event, one variant per kind the client interprets.
///
/// Kinds the client deliberately ignores (`thread`, `module`, `process`)
/// still get a variant so the router can record the no-op explicitly;
/// anything else lands in `Unknown`.
#[derive(Debug, Clone)]
pub enum EventBody {
    Output(OutputEventBody),
    Initialized,
    Stopped(StoppedEventBody),
    Continued(ContinuedEventBody),
    Breakpoint(BreakpointEventBody),
    Thread,
    Module,
    Process,
    Exited(ExitedEventBody),
    Terminated,
    Unknown(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputEventBody {
    /// `stdout`, `stderr`, `console`, or an adapter-specific category.
    pub category: Option<String>,
    pub output: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoppedEventBody {
    pub reason: String,
    pub description: Option<String>,
    pub thread_id: Option<ThreadId>,
    pub all_threads_stopped: Option<bool>,
    pub hit_breakpoint_ids: Option<Vec<BreakpointId>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinuedEventBody {
    pub thread_id: ThreadId,
    pub all_threads_continued: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BreakpointEventBody {
    /// `changed`, `new` or `removed`.
    pub reason: String,
    pub breakpoint: Breakpoint,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitedEventBody {
    pub exit_code: i64,
}

impl EventBody {
    /// Parse an event frame's body according to its declared kind.
    ///
    /// A parse failure is returned to the caller rather than papered over:
    /// the router applies a kind-specific fallback (a `stopped` event that
    /// fails to parse must still stop the session).
    pub fn parse(frame: &Frame) -> Result<Self, BodyError> {
        let Some(kind) = frame.event_kind() else {
            // Callers only hand us event frames; treat anything else as an
            // unknown kind rather than panicking on adapter garbage.
            return Ok(EventBody::Unknown(String::new()));
        };

        let body = match kind {
            "output" => EventBody::Output(frame.parse_body()?),
            "initialized" => EventBody::Initialized,
            "stopped" => EventBody::Stopped(frame.parse_body()?),
            "continued" => EventBody::Continued(frame.parse_body()?),
            "breakpoint" => EventBody::Breakpoint(frame.parse_body()?),
            "thread" => EventBody::Thread,
            "module" => EventBody::Module,
            "process" => EventBody::Process,
            "exited" => EventBody::Exited(frame.parse_body()?),
            "terminated" => EventBody::Terminated,
            other => EventBody::Unknown(other.to_string()),
        };
        Ok(body)
    }
}
