//! Tracking pending requests and matching responses.
//!
//! Every outgoing request is stored here, keyed by its sequence number,
//! until its response arrives, it is rejected, or the session is torn
//! down. The registry is owned by the session's reactive loop and only
//! ever touched from there.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::oneshot;

use wire::requests::Command;
use wire::types::Seq;

use crate::{CommandResult, Outcome};
use crate::stack::FrameTarget;

/// Which batch of a breakpoint-synchronization request a response
/// reconciles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SyncKey {
    Source(PathBuf),
    Address,
    Subprogram,
    Exception,
}

/// Why a `stackTrace` request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StackTraceGoal {
    /// A stop arrived without a usable source location; the session is
    /// declared `Stopped` once (or despite) this request finishing.
    DeclareStopped,
    /// Frame navigation needed a fresh stack before selecting.
    SelectFrame(FrameTarget),
}

/// The internal continuation of a request the session sent for its own
/// purposes. Each variant's response handler may enqueue follow-up
/// requests of its own, which is how multi-step flows (launch
/// choreography, stop-location recovery) chain without blocking the loop.
#[derive(Debug)]
pub(crate) enum FollowUp {
    Initialize,
    Launch,
    ConfigurationDone,
    SetBreakpoints(SyncKey),
    Continue,
    Step,
    StackTrace(StackTraceGoal),
    Evaluate {
        /// Echo the result (or error) to the debugger console.
        echo: bool,
        reply: Option<oneshot::Sender<CommandResult>>,
    },
    DetectEndianness,
    Disconnect,
}

/// What to do with a request's outcome. Exactly one of success, error or
/// rejection is ever delivered, and delivering consumes the disposition.
#[derive(Debug)]
pub(crate) enum Disposition {
    /// An external caller is waiting on the oneshot.
    Caller(oneshot::Sender<Outcome>),
    /// The session itself consumes the response.
    FollowUp(FollowUp),
    /// Fire-and-forget; the outcome is only logged.
    Log,
}

impl Disposition {
    /// Deliver the rejection outcome for dispositions that carry an
    /// external reply channel. Internal follow-ups are returned so the
    /// loop can run their kind-specific rejection handling.
    pub(crate) fn reject(self) -> Option<FollowUp> {
        match self {
            Disposition::Caller(tx) => {
                let _ = tx.send(Outcome::Rejected);
                None
            }
            Disposition::FollowUp(follow_up) => Some(follow_up),
            Disposition::Log => None,
        }
    }
}

pub(crate) struct PendingRequest {
    pub(crate) command: Command,
    pub(crate) disposition: Disposition,
}

/// The registry of requests awaiting responses.
pub(crate) struct PendingRequests {
    entries: HashMap<Seq, PendingRequest>,
    last_seq: Seq,
}

impl PendingRequests {
    pub(crate) fn new() -> Self {
        Self {
            entries: HashMap::new(),
            last_seq: 0,
        }
    }

    /// Assign the next sequence number: monotonically increasing,
    /// wrapping from the maximum back to 1, never reusing a number that
    /// is still live in the registry.
    pub(crate) fn next_seq(&mut self) -> Seq {
        loop {
            self.last_seq = if self.last_seq == Seq::MAX {
                1
            } else {
                self.last_seq + 1
            };
            if !self.entries.contains_key(&self.last_seq) {
                return self.last_seq;
            }
        }
    }

    pub(crate) fn insert(&mut self, seq: Seq, request: PendingRequest) {
        debug_assert!(!self.entries.contains_key(&seq));
        self.entries.insert(seq, request);
    }

    /// Remove and return the request a response correlates with. `None`
    /// when the entry was already retired: the adapter may legitimately
    /// answer a request the client gave up on during teardown, so the
    /// caller treats this as a no-op, not an error.
    pub(crate) fn take(&mut self, request_seq: Seq) -> Option<PendingRequest> {
        self.entries.remove(&request_seq)
    }

    /// Drain every live entry for rejection. Idempotent: a second call
    /// finds an empty registry and drains nothing.
    pub(crate) fn drain_for_rejection(&mut self) -> Vec<PendingRequest> {
        self.entries.drain().map(|(_, request)| request).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.entries.values().map(|r| r.command.name()).collect()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::requests::{Command, ContinueArgs};

    fn dummy_request() -> PendingRequest {
        PendingRequest {
            command: Command::Continue(ContinueArgs { thread_id: 1 }),
            disposition: Disposition::Log,
        }
    }

    #[test]
    fn sequence_numbers_are_unique_among_pending() {
        let mut pending = PendingRequests::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let seq = pending.next_seq();
            assert!(seen.insert(seq));
            pending.insert(seq, dummy_request());
        }
    }

    #[test]
    fn wraparound_skips_live_entries() {
        let mut pending = PendingRequests::new();
        // Station the counter just before the wrap point with a live
        // request at seq 1 and seq 2.
        pending.insert(1, dummy_request());
        pending.insert(2, dummy_request());
        pending.last_seq = Seq::MAX - 1;

        assert_eq!(pending.next_seq(), Seq::MAX);
        pending.insert(Seq::MAX, dummy_request());

        // Wraps to 1, finds 1 and 2 still pending, settles on 3.
        assert_eq!(pending.next_seq(), 3);
    }

    #[test]
    fn resolve_unknown_seq_is_a_noop() {
        let mut pending = PendingRequests::new();
        let seq = pending.next_seq();
        pending.insert(seq, dummy_request());

        assert!(pending.take(seq + 1).is_none());
        assert_eq!(pending.len(), 1);
    }

    #[test]
    fn take_retires_exactly_once() {
        let mut pending = PendingRequests::new();
        let seq = pending.next_seq();
        pending.insert(seq, dummy_request());

        assert!(pending.take(seq).is_some());
        assert!(pending.take(seq).is_none());
        assert!(pending.is_empty());
    }

    #[test]
    fn rejection_drain_is_idempotent() {
        let mut pending = PendingRequests::new();
        for _ in 0..3 {
            let seq = pending.next_seq();
            pending.insert(seq, dummy_request());
        }

        assert_eq!(pending.drain_for_rejection().len(), 3);
        assert!(pending.is_empty());
        // second call is a no-op
        assert!(pending.drain_for_rejection().is_empty());
    }

    #[test]
    fn caller_disposition_rejects_via_channel() {
        let (tx, mut rx) = tokio::sync::oneshot::channel();
        let disposition = Disposition::Caller(tx);
        assert!(disposition.reject().is_none());
        assert!(matches!(rx.try_recv(), Ok(Outcome::Rejected)));
    }
}
