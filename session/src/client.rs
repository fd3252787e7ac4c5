//! The public session handle and the reactive loop behind it.
//!
//! [`Session::spawn`] starts one tokio task owning all mutable session
//! state (see [`crate::internals`]); the handle communicates with it over
//! a channel and never blocks on the adapter. Dropping every handle
//! initiates the quit sequence.

use std::path::PathBuf;

use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, oneshot, watch};

use wire::requests::Command;
use wire::{DapReader, DapTransport};

use crate::breakpoints::BreakpointKind;
use crate::console::{NullConsole, SharedConsole};
use crate::hooks::{NullHooks, SessionHooks};
use crate::internals::SessionInner;
use crate::stack::FrameTarget;
use crate::status::Status;
use crate::{CommandResult, Outcome};

/// Everything needed to start a session against a freshly spawned
/// adapter.
pub struct SessionConfig {
    /// The debuggee executable handed to the `launch` request and to the
    /// breakpoint synchronizer.
    pub executable: PathBuf,
    /// Command-line arguments for the debuggee.
    pub launch_args: Vec<String>,
    /// The adapter id reported in the `initialize` request.
    pub adapter_id: String,
    /// Ask the adapter to stop at the beginning of the main subprogram.
    pub stop_at_main: bool,
    /// The debugger console sink.
    pub console: SharedConsole,
    /// The host's notification sink.
    pub hooks: Box<dyn SessionHooks>,
    /// The owning handle of the adapter subprocess, when the session
    /// should tear it down. `None` for in-memory transports in tests.
    pub adapter: Option<adapter::Adapter>,
}

impl SessionConfig {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            launch_args: Vec::new(),
            adapter_id: "gdb".to_string(),
            stop_at_main: false,
            console: std::sync::Arc::new(NullConsole),
            hooks: Box::new(NullHooks),
            adapter: None,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.launch_args = args.into_iter().collect();
        self
    }

    pub fn with_console(mut self, console: SharedConsole) -> Self {
        self.console = console;
        self
    }

    pub fn with_hooks(mut self, hooks: Box<dyn SessionHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_adapter(mut self, adapter: adapter::Adapter) -> Self {
        self.adapter = Some(adapter);
        self
    }
}

/// What the loop publishes for cheap synchronous reads from handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Snapshot {
    pub(crate) status: Status,
    pub(crate) pending: usize,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            status: Status::Initialization,
            pending: 0,
        }
    }
}

pub(crate) enum SessionMessage {
    UserCommand {
        line: String,
        reply: Option<oneshot::Sender<CommandResult>>,
    },
    Execute {
        command: Command,
    },
    Request {
        command: Command,
        reply: oneshot::Sender<Outcome>,
    },
    AddBreakpoint {
        kind: BreakpointKind,
        temporary: bool,
        condition: Option<String>,
    },
    RemoveBreakpoint {
        number: u32,
    },
    ContinueExecution,
    StepOver,
    StepIn,
    StepOut,
    SelectFrame {
        target: FrameTarget,
    },
    Quit,
}

/// Handle to a running debug session.
///
/// Clones share the same underlying session. All methods hand work to the
/// session's reactive loop and return immediately; the `async` ones only
/// await the eventual reply, never the adapter itself.
#[derive(Clone)]
pub struct Session {
    tx: mpsc::UnboundedSender<SessionMessage>,
    snapshot: watch::Receiver<Snapshot>,
}

impl Session {
    /// Start a session over the given transport. The loop immediately
    /// begins the launch choreography (initialize, launch, breakpoints,
    /// configurationDone).
    pub fn spawn<T: DapTransport>(transport: T, config: SessionConfig) -> Self {
        let (reader, writer) = wire::split(transport);
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot::default());

        let inner = SessionInner::new(writer, config, snapshot_tx);
        tokio::spawn(run_loop(inner, reader, rx));

        Self {
            tx,
            snapshot: snapshot_rx,
        }
    }

    pub fn status(&self) -> Status {
        self.snapshot.borrow().status
    }

    /// Whether a fresh user command would be accepted right now: the
    /// session is `Ready` or `Stopped` and nothing is in flight.
    pub fn is_ready_for_command(&self) -> bool {
        let snapshot = *self.snapshot.borrow();
        matches!(snapshot.status, Status::Ready | Status::Stopped) && snapshot.pending == 0
    }

    /// Wait until the status satisfies the predicate, returning it. Also
    /// returns when the session loop has ended.
    pub async fn wait_for_status(&self, pred: impl Fn(Status) -> bool) -> Status {
        let mut rx = self.snapshot.clone();
        loop {
            let status = rx.borrow().status;
            if pred(status) {
                return status;
            }
            if rx.changed().await.is_err() {
                return rx.borrow().status;
            }
        }
    }

    /// Enqueue a raw request, fire-and-forget.
    pub fn execute(&self, command: Command) -> eyre::Result<()> {
        self.send(SessionMessage::Execute { command })
    }

    /// Enqueue a raw request and await its outcome. A successful outcome
    /// carries the response frame for schema-aware parsing by the caller.
    pub async fn request(&self, command: Command) -> eyre::Result<Outcome> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::Request { command, reply })?;
        rx.await.map_err(|_| eyre::eyre!("session ended"))
    }

    /// Submit one line of gdb-style command text; results and
    /// diagnostics go to the console.
    pub fn submit_command(&self, line: impl Into<String>) -> eyre::Result<()> {
        self.send(SessionMessage::UserCommand {
            line: line.into(),
            reply: None,
        })
    }

    /// Submit one line of gdb-style command text and await the result.
    pub async fn run_command(&self, line: impl Into<String>) -> eyre::Result<CommandResult> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionMessage::UserCommand {
            line: line.into(),
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| eyre::eyre!("session ended"))
    }

    pub fn break_source(
        &self,
        file: impl Into<PathBuf>,
        line: usize,
        temporary: bool,
        condition: Option<String>,
    ) -> eyre::Result<()> {
        self.send(SessionMessage::AddBreakpoint {
            kind: BreakpointKind::Source {
                file: file.into(),
                line,
            },
            temporary,
            condition,
        })
    }

    pub fn break_address(&self, address: u64) -> eyre::Result<()> {
        self.send(SessionMessage::AddBreakpoint {
            kind: BreakpointKind::Address(address),
            temporary: false,
            condition: None,
        })
    }

    pub fn break_subprogram(&self, name: impl Into<String>) -> eyre::Result<()> {
        self.send(SessionMessage::AddBreakpoint {
            kind: BreakpointKind::Subprogram(name.into()),
            temporary: false,
            condition: None,
        })
    }

    pub fn catch_exception(&self, name: Option<String>, temporary: bool) -> eyre::Result<()> {
        self.send(SessionMessage::AddBreakpoint {
            kind: BreakpointKind::Exception { name },
            temporary,
            condition: None,
        })
    }

    pub fn remove_breakpoint(&self, number: u32) -> eyre::Result<()> {
        self.send(SessionMessage::RemoveBreakpoint { number })
    }

    /// Resume the debuggee. Ignored unless the session is stopped.
    pub fn continue_execution(&self) -> eyre::Result<()> {
        self.send(SessionMessage::ContinueExecution)
    }

    pub fn step_over(&self) -> eyre::Result<()> {
        self.send(SessionMessage::StepOver)
    }

    pub fn step_in(&self) -> eyre::Result<()> {
        self.send(SessionMessage::StepIn)
    }

    pub fn step_out(&self) -> eyre::Result<()> {
        self.send(SessionMessage::StepOut)
    }

    pub fn select_frame(&self, target: FrameTarget) -> eyre::Result<()> {
        self.send(SessionMessage::SelectFrame { target })
    }

    /// Initiate the quit sequence: disconnect, reject all pending
    /// requests, terminate.
    pub fn quit(&self) -> eyre::Result<()> {
        self.send(SessionMessage::Quit)
    }

    fn send(&self, message: SessionMessage) -> eyre::Result<()> {
        self.tx
            .send(message)
            .map_err(|_| eyre::eyre!("session ended"))
    }
}

/// The reactive loop: one task per session, processing client messages
/// and adapter frames one at a time in arrival order.
async fn run_loop<R, W>(
    mut inner: SessionInner<W>,
    mut reader: DapReader<R>,
    mut rx: mpsc::UnboundedReceiver<SessionMessage>,
) where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    inner.start().await;
    if inner.finished() {
        return;
    }

    let mut inbox_open = true;
    loop {
        tokio::select! {
            message = rx.recv(), if inbox_open => match message {
                Some(message) => inner.on_message(message).await,
                None => {
                    // every handle is gone; tear the session down
                    inbox_open = false;
                    inner.begin_quit().await;
                }
            },
            frame = reader.next() => match frame {
                Some(Ok(frame)) => inner.handle_frame(frame).await,
                Some(Err(e)) if !e.is_fatal() => {
                    // the offending message is already consumed; the next
                    // one decodes cleanly
                    tracing::warn!(error = %e, "dropping undecodable message");
                }
                Some(Err(e)) => {
                    tracing::error!(error = %e, "transport error");
                    inner.transport_failure().await;
                }
                None => {
                    tracing::debug!("adapter closed the connection");
                    inner.transport_failure().await;
                }
            },
        }
        if inner.finished() {
            break;
        }
    }
    tracing::debug!("session loop finished");
}
