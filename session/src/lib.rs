//! The DAP client protocol engine.
//!
//! One [`Session`] supervises one debug-adapter connection: it correlates
//! requests with their asynchronous responses, routes unsolicited events,
//! tracks the debugger lifecycle and the stopped-thread set, keeps the
//! authoritative breakpoint set synchronized with the adapter, and
//! translates gdb-style command text (via the `commands` crate) into
//! protocol requests.
//!
//! All mutable state lives in a single reactive loop per session;
//! multiple sessions run concurrently with nothing shared. Presentation
//! concerns stay outside, behind the [`Console`] and [`SessionHooks`]
//! seams.

mod breakpoints;
mod client;
mod console;
mod endian;
mod hooks;
mod internals;
mod pending;
mod stack;
mod status;

pub mod testing;

pub use breakpoints::{BreakpointKind, BreakpointState};
pub use client::{Session, SessionConfig};
pub use console::{Console, NullConsole, Severity, SharedConsole, StdioConsole};
pub use endian::Endianness;
pub use hooks::{NullHooks, SessionHooks};
pub use stack::{FrameTarget, Location};
pub use status::{Availability, Status};

use wire::Frame;

/// The outcome of one protocol request, delivered exactly once.
///
/// Mirrors the three continuations a request can carry: result, error,
/// rejection. Rejection is not an error: it means the request was never
/// sent (illegal in the current status) or was abandoned at teardown.
#[derive(Debug)]
pub enum Outcome {
    /// The adapter answered `success = true`. The frame exposes the
    /// response body for schema-aware parsing via [`Frame::parse_body`].
    Success(Frame),
    /// The adapter answered `success = false`, or the response body could
    /// not be parsed locally.
    Error { message: String },
    /// The request was never sent or was discarded during teardown.
    Rejected,
}

/// The result of one line of user command text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandResult {
    /// The command ran; `evaluate` commands carry the adapter's result
    /// text, others an empty string.
    Output(String),
    /// A diagnostic: bad command details, or an adapter-reported failure.
    Error(String),
    /// The session was not in a state to accept the command.
    Rejected,
}
