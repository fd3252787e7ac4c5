//! The session's single-owner mutable state and the dispatcher that
//! drives it.
//!
//! One `SessionInner` exists per adapter connection, owned exclusively by
//! the reactive loop in [`crate::client`]. Every inbound frame and every
//! client message is processed here, one at a time, in arrival order; no
//! other code touches the registry, the status, or the thread sets.

use std::collections::BTreeSet;

use tokio::io::AsyncWrite;
use tokio::sync::{oneshot, watch};

use wire::events::{
    ContinuedEventBody, EventBody, OutputEventBody, StoppedEventBody,
};
use wire::requests::{
    Command, ContinueArgs, DisconnectArgs, EvaluateArgs, EvaluateContext, InitializeArgs,
    LaunchArgs, NextArgs, PathFormat, StackTraceArgs, StepInArgs, StepOutArgs,
};
use wire::responses::{
    Capabilities, ContinueResponseBody, EvaluateResponseBody, SetBreakpointsResponseBody,
    StackTraceResponseBody,
};
use wire::{BodyError, DapWriter, Envelope, Frame, OutgoingMessage, Request};

use commands::{BreakLocation, FrameNav, ParsedCommand};

use crate::breakpoints::{BreakpointKind, Breakpoints};
use crate::client::{SessionConfig, SessionMessage, Snapshot};
use crate::console::{Severity, SharedConsole};
use crate::endian::{Endianness, parse_show_endian};
use crate::hooks::SessionHooks;
use crate::pending::{Disposition, FollowUp, PendingRequest, PendingRequests, StackTraceGoal};
use crate::stack::{FrameCache, FrameTarget};
use crate::status::Status;
use crate::{CommandResult, Outcome};

/// How many frames a stop-location stack trace asks for.
const STOP_FRAME_DEPTH: usize = 20;

pub(crate) struct SessionInner<W> {
    writer: DapWriter<W>,
    pending: PendingRequests,
    status: Status,

    stopped_threads: BTreeSet<i64>,
    selected_thread: Option<i64>,
    all_threads_stopped: bool,
    frames: FrameCache,
    breakpoints: Option<Breakpoints>,
    capabilities: Capabilities,
    endianness: Option<Endianness>,

    executable: std::path::PathBuf,
    launch_args: Vec<String>,
    adapter_id: String,
    stop_at_main: bool,

    console: SharedConsole,
    debuggee_console: Option<SharedConsole>,
    hooks: Box<dyn SessionHooks>,
    adapter: Option<adapter::Adapter>,
    snapshot: watch::Sender<Snapshot>,

    debugger_started_fired: bool,
    debuggee_started_fired: bool,
    debuggee_terminated_fired: bool,
    endian_probe_sent: bool,
    finished: bool,
}

impl<W> SessionInner<W>
where
    W: AsyncWrite + Unpin,
{
    pub(crate) fn new(
        writer: DapWriter<W>,
        config: SessionConfig,
        snapshot: watch::Sender<Snapshot>,
    ) -> Self {
        Self {
            writer,
            pending: PendingRequests::new(),
            status: Status::Initialization,
            stopped_threads: BTreeSet::new(),
            selected_thread: None,
            all_threads_stopped: false,
            frames: FrameCache::default(),
            breakpoints: None,
            capabilities: Capabilities::default(),
            endianness: None,
            executable: config.executable,
            launch_args: config.launch_args,
            adapter_id: config.adapter_id,
            stop_at_main: config.stop_at_main,
            console: config.console,
            debuggee_console: None,
            hooks: config.hooks,
            adapter: config.adapter,
            snapshot,
            debugger_started_fired: false,
            debuggee_started_fired: false,
            debuggee_terminated_fired: false,
            endian_probe_sent: false,
            finished: false,
        }
    }

    pub(crate) fn finished(&self) -> bool {
        self.finished
    }

    #[cfg(test)]
    pub(crate) fn endianness(&self) -> Option<Endianness> {
        self.endianness
    }

    /// Kick off the launch choreography: everything else chains from the
    /// initialize response and the `initialized` event.
    pub(crate) async fn start(&mut self) {
        let args = InitializeArgs {
            adapter_id: self.adapter_id.clone(),
            client_id: "adept".to_string(),
            lines_start_at_one: true,
            columns_start_at_one: true,
            path_format: PathFormat::Path,
            supports_variable_type: true,
        };
        self.send_request(
            Command::Initialize(args),
            Disposition::FollowUp(FollowUp::Initialize),
            false,
        )
        .await;
    }

    fn publish(&self) {
        self.snapshot.send_replace(Snapshot {
            status: self.status,
            pending: self.pending.len(),
        });
    }

    /// Commands are serialized, not pipelined: the session only accepts a
    /// fresh user command while it is `Ready` or `Stopped` with nothing in
    /// flight.
    fn is_ready_for_command(&self) -> bool {
        matches!(self.status, Status::Ready | Status::Stopped) && self.pending.is_empty()
    }

    /// Assign a sequence number, frame the request and hand it to the
    /// transport. Never blocks on the adapter: the disposition fires later,
    /// when the response arrives.
    ///
    /// New traffic is refused once the session is `Terminating`; the
    /// `force` override exists for the teardown-time disconnect.
    async fn send_request(&mut self, command: Command, disposition: Disposition, force: bool) {
        if self.status == Status::Terminating && !force {
            tracing::debug!(command = command.name(), "rejecting request: session is terminating");
            if let Some(follow_up) = disposition.reject() {
                self.on_follow_up_rejected(follow_up).await;
            }
            return;
        }

        let seq = self.pending.next_seq();
        tracing::debug!(seq, command = command.name(), "sending request");

        let message = OutgoingMessage::Request(Request {
            seq,
            command: command.clone(),
        });
        if let Err(e) = self.writer.send(message).await {
            tracing::warn!(error = %e, seq, "failed to write request");
            if let Some(follow_up) = disposition.reject() {
                self.on_follow_up_rejected(follow_up).await;
            }
            self.transport_failure().await;
            return;
        }

        self.pending.insert(seq, PendingRequest { command, disposition });
        self.publish();
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    pub(crate) async fn handle_frame(&mut self, frame: Frame) {
        match frame.envelope.clone() {
            Envelope::Response {
                request_seq,
                success,
                message,
                ..
            } => self.on_response(request_seq, success, message, frame).await,
            Envelope::Event { .. } => self.on_event(frame).await,
            Envelope::Request { command, .. } => {
                tracing::warn!(%command, "reverse requests are not supported; ignored");
            }
        }
    }

    async fn on_response(
        &mut self,
        request_seq: i64,
        success: bool,
        message: Option<String>,
        frame: Frame,
    ) {
        // A response for a request already retired (teardown raced the
        // adapter) is a no-op, not an error.
        let Some(PendingRequest { command, disposition }) = self.pending.take(request_seq) else {
            tracing::trace!(request_seq, "response for a retired request; discarded");
            return;
        };
        self.publish();
        tracing::debug!(request_seq, command = command.name(), success, "response");

        match disposition {
            Disposition::Caller(tx) => {
                let outcome = if success {
                    Outcome::Success(frame)
                } else {
                    Outcome::Error {
                        message: message
                            .unwrap_or_else(|| format!("{} request failed", command.name())),
                    }
                };
                let _ = tx.send(outcome);
            }
            Disposition::FollowUp(follow_up) => {
                if success {
                    self.on_follow_up_success(follow_up, frame).await;
                } else {
                    self.on_follow_up_error(follow_up, command.name(), message).await;
                }
            }
            Disposition::Log => {
                if !success {
                    tracing::warn!(
                        command = command.name(),
                        message = message.as_deref().unwrap_or(""),
                        "request failed"
                    );
                }
            }
        }
    }

    async fn on_follow_up_success(&mut self, follow_up: FollowUp, frame: Frame) {
        match follow_up {
            FollowUp::Initialize => {
                match frame.parse_body::<Capabilities>() {
                    Ok(capabilities) => self.capabilities = capabilities,
                    Err(e) => {
                        tracing::warn!(error = %e, "cannot parse initialize response; assuming no optional capabilities");
                    }
                }
                let args = LaunchArgs {
                    program: self.executable.clone(),
                    args: self.launch_args.clone(),
                    cwd: None,
                    stop_at_beginning_of_main_subprogram: self.stop_at_main,
                };
                self.send_request(
                    Command::Launch(args),
                    Disposition::FollowUp(FollowUp::Launch),
                    false,
                )
                .await;
            }
            FollowUp::Launch => {
                tracing::debug!("launch acknowledged");
            }
            FollowUp::ConfigurationDone => {
                self.set_status(Status::Ready);
                self.probe_endianness().await;
            }
            FollowUp::SetBreakpoints(key) => match frame.parse_body::<SetBreakpointsResponseBody>()
            {
                Ok(body) => {
                    if let Some(breakpoints) = self.breakpoints.as_mut() {
                        breakpoints.apply_verification(&key, &body.breakpoints);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, ?key, "cannot parse breakpoint response");
                    self.console.error("cannot parse breakpoint response");
                }
            },
            FollowUp::Continue => {
                // the response mirrors the `continued` event semantics;
                // both paths are idempotent so either arrival order works
                let all = match frame.parse_body::<ContinueResponseBody>() {
                    Ok(body) => body.all_threads_continued.unwrap_or(true),
                    Err(_) => true,
                };
                self.apply_continued(all, self.selected_thread);
            }
            FollowUp::Step => {
                tracing::debug!("step acknowledged");
            }
            FollowUp::StackTrace(goal) => match frame.parse_body::<StackTraceResponseBody>() {
                Ok(body) => {
                    self.frames.set_frames(body.stack_frames);
                    match goal {
                        StackTraceGoal::DeclareStopped => self.set_status(Status::Stopped),
                        StackTraceGoal::SelectFrame(target) => self.select_frame(target),
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cannot parse stack trace response");
                    match goal {
                        // the session must never hang believing it is
                        // still running
                        StackTraceGoal::DeclareStopped => self.set_status(Status::Stopped),
                        StackTraceGoal::SelectFrame(_) => {
                            self.console.error("cannot parse stack trace response");
                        }
                    }
                }
            },
            FollowUp::Evaluate { echo, reply } => match frame.parse_body::<EvaluateResponseBody>()
            {
                Ok(body) => {
                    if echo && !body.result.is_empty() {
                        self.console.output(&body.result, Severity::Info, true);
                    }
                    if let Some(tx) = reply {
                        let _ = tx.send(CommandResult::Output(body.result));
                    }
                }
                Err(BodyError::Missing) => {
                    if let Some(tx) = reply {
                        let _ = tx.send(CommandResult::Output(String::new()));
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cannot parse evaluate response");
                    let message = "cannot parse evaluate response".to_string();
                    if echo {
                        self.console.error(&message);
                    }
                    if let Some(tx) = reply {
                        let _ = tx.send(CommandResult::Error(message));
                    }
                }
            },
            FollowUp::DetectEndianness => {
                if let Ok(body) = frame.parse_body::<EvaluateResponseBody>() {
                    self.endianness = parse_show_endian(&body.result);
                    tracing::debug!(endianness = ?self.endianness, "target endianness detected");
                }
            }
            FollowUp::Disconnect => {
                self.finish_teardown().await;
            }
        }
    }

    async fn on_follow_up_error(
        &mut self,
        follow_up: FollowUp,
        command: &str,
        message: Option<String>,
    ) {
        let message = message.unwrap_or_else(|| format!("{command} request failed"));
        tracing::debug!(command, %message, "request failed");

        match follow_up {
            FollowUp::Initialize | FollowUp::Launch => {
                self.console
                    .error(&format!("could not start the debug session: {message}"));
                self.begin_quit().await;
            }
            FollowUp::ConfigurationDone => {
                // the adapter is alive even if it refused configuration;
                // the session stays usable for console commands
                self.console.error(&message);
                self.set_status(Status::Ready);
            }
            FollowUp::SetBreakpoints(_) => {
                self.console
                    .error(&format!("breakpoint synchronization failed: {message}"));
            }
            FollowUp::Continue | FollowUp::Step => {
                self.console.error(&message);
            }
            FollowUp::StackTrace(StackTraceGoal::DeclareStopped) => {
                tracing::warn!(%message, "stack trace failed after stop");
                self.set_status(Status::Stopped);
            }
            FollowUp::StackTrace(StackTraceGoal::SelectFrame(_)) => {
                self.console.error(&message);
            }
            FollowUp::Evaluate { echo, reply } => {
                if echo {
                    self.console.error(&message);
                }
                if let Some(tx) = reply {
                    let _ = tx.send(CommandResult::Error(message));
                }
            }
            FollowUp::DetectEndianness => {}
            FollowUp::Disconnect => {
                self.finish_teardown().await;
            }
        }
    }

    /// Rejection is distinct from error: the request never reached the
    /// adapter, or was abandoned at teardown.
    async fn on_follow_up_rejected(&mut self, follow_up: FollowUp) {
        match follow_up {
            FollowUp::Evaluate { reply, .. } => {
                if let Some(tx) = reply {
                    let _ = tx.send(CommandResult::Rejected);
                }
            }
            FollowUp::Disconnect => {
                // nobody will answer; complete teardown locally
                self.finish_teardown().await;
            }
            other => {
                tracing::debug!(follow_up = ?other, "pending request rejected");
            }
        }
    }

    // ------------------------------------------------------------------
    // Event routing
    // ------------------------------------------------------------------

    async fn on_event(&mut self, frame: Frame) {
        let kind = frame.event_kind().unwrap_or_default().to_string();

        let body = match EventBody::parse(&frame) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(error = %e, event = %kind, "dropping malformed event body");
                if kind == "stopped" {
                    // conservative fallback: a stop we cannot decode must
                    // still stop the session
                    self.set_status(Status::Stopped);
                }
                return;
            }
        };

        match body {
            EventBody::Output(body) => self.route_output(body),
            EventBody::Initialized => self.on_initialized().await,
            EventBody::Stopped(body) => self.on_stopped(body).await,
            EventBody::Continued(body) => {
                let all = body.all_threads_continued.unwrap_or(false);
                let ContinuedEventBody { thread_id, .. } = body;
                self.apply_continued(all, Some(thread_id));
            }
            EventBody::Breakpoint(body) => {
                if let Some(breakpoints) = self.breakpoints.as_mut() {
                    breakpoints.on_breakpoint_event(&body);
                } else {
                    tracing::debug!("breakpoint event before synchronizer exists; dropped");
                }
            }
            EventBody::Thread | EventBody::Module | EventBody::Process => {
                // thread/module state is pulled on demand, not pushed
                tracing::trace!(event = %kind, "ignored event");
            }
            EventBody::Exited(body) => {
                tracing::debug!(exit_code = body.exit_code, "debuggee exited");
                self.fire_debuggee_terminated();
            }
            EventBody::Terminated => {
                self.fire_debuggee_terminated();
                self.set_status(Status::Ready);
                self.console.line("Debuggee terminated");
            }
            EventBody::Unknown(kind) => {
                tracing::debug!(event = %kind, "unrecognized event kind; ignored");
            }
        }
    }

    /// Select a console and severity for an `output` event. Debuggee
    /// categories go to the debuggee console when the host created one.
    fn route_output(&self, body: OutputEventBody) {
        let category = body.category.as_deref().unwrap_or("console");
        let severity = match category {
            "stderr" => Severity::Error,
            "console" => Severity::Verbose,
            _ => Severity::Info,
        };
        let target = match category {
            "stdout" | "stderr" => self.debuggee_console.as_ref().unwrap_or(&self.console),
            _ => &self.console,
        };
        // output events carry their own line endings
        target.output(&body.output, severity, false);
    }

    async fn on_initialized(&mut self) {
        self.set_status(Status::Initialized);

        let breakpoints = Breakpoints::new(self.executable.clone());
        tracing::debug!(executable = %breakpoints.executable().display(), "breakpoint synchronizer ready");
        let sync = breakpoints.initial_sync();
        self.breakpoints = Some(breakpoints);

        for (key, request) in sync {
            self.send_request(request, Disposition::FollowUp(FollowUp::SetBreakpoints(key)), false)
                .await;
        }
        self.send_request(
            Command::ConfigurationDone,
            Disposition::FollowUp(FollowUp::ConfigurationDone),
            false,
        )
        .await;
    }

    async fn on_stopped(&mut self, body: StoppedEventBody) {
        if let Some(thread_id) = body.thread_id {
            self.stopped_threads.insert(thread_id);
            self.selected_thread = Some(thread_id);
        }
        self.all_threads_stopped = body.all_threads_stopped.unwrap_or(false);

        let mut resync = Vec::new();
        if body.reason == "breakpoint" {
            if let (Some(breakpoints), Some(ids)) = (
                self.breakpoints.as_mut(),
                body.hit_breakpoint_ids.as_deref(),
            ) {
                if let Some(location) = breakpoints.resolve_hit(ids) {
                    self.frames.set_location(location);
                }
                resync = breakpoints.clear_hit_temporaries(ids);
            }
        }
        for (key, request) in resync {
            self.send_request(request, Disposition::FollowUp(FollowUp::SetBreakpoints(key)), false)
                .await;
        }

        if !self.debuggee_started_fired {
            self.debuggee_started_fired = true;
            self.hooks.debuggee_started();
        }

        let source_known = self
            .frames
            .location()
            .map(|location| location.has_source())
            .unwrap_or(false);

        if source_known {
            self.set_status(Status::Stopped);
        } else if let Some(thread_id) = self.selected_thread {
            // fetch a stack trace before declaring the session stopped,
            // so the stop notification carries a usable location
            self.send_request(
                Command::StackTrace(StackTraceArgs {
                    thread_id,
                    start_frame: None,
                    levels: Some(STOP_FRAME_DEPTH),
                }),
                Disposition::FollowUp(FollowUp::StackTrace(StackTraceGoal::DeclareStopped)),
                false,
            )
            .await;
        } else {
            self.set_status(Status::Stopped);
        }
    }

    /// Shared semantics of the `continued` event and the `continue`
    /// response.
    fn apply_continued(&mut self, all_threads: bool, thread_id: Option<i64>) {
        if all_threads {
            self.stopped_threads.clear();
            self.selected_thread = None;
        } else if let Some(thread_id) = thread_id {
            self.stopped_threads.remove(&thread_id);
            if self.selected_thread == Some(thread_id) {
                // default back to the lowest-valued stopped thread
                self.selected_thread = self.stopped_threads.iter().next().copied();
            }
        }
        // any cached location is stale the moment the debuggee resumes
        self.frames.clear();
        self.set_status(Status::Running);
    }

    fn fire_debuggee_terminated(&mut self) {
        if self.debuggee_terminated_fired {
            return;
        }
        self.debuggee_terminated_fired = true;
        self.hooks.debuggee_terminated();
    }

    // ------------------------------------------------------------------
    // Status state machine
    // ------------------------------------------------------------------

    pub(crate) fn set_status(&mut self, new: Status) {
        // same-value transitions are no-ops, and Terminating absorbs all
        if self.status == new || self.status == Status::Terminating {
            return;
        }
        let previous = self.status;
        self.status = new;
        tracing::debug!(?previous, status = ?new, "status changed");

        if !new.in_session_range() {
            self.stopped_threads.clear();
            self.selected_thread = None;
            self.all_threads_stopped = false;
            self.frames.clear();
        }

        match new {
            Status::Ready => {
                if self.debuggee_console.is_none() {
                    self.debuggee_console = self.hooks.create_debuggee_console();
                }
                if !self.debugger_started_fired {
                    self.debugger_started_fired = true;
                    self.hooks.debugger_started();
                }
            }
            Status::Stopped => {
                self.hooks.process_stopped();
                if let Some(location) = self.frames.location() {
                    self.hooks.location_changed(location);
                }
            }
            Status::Terminating => {
                if previous.past_initialized() {
                    self.hooks.debugger_terminated();
                }
            }
            _ => {}
        }

        self.hooks.state_changed(new, new.availability());
        self.publish();
    }

    async fn probe_endianness(&mut self) {
        if self.endian_probe_sent {
            return;
        }
        self.endian_probe_sent = true;
        self.send_request(
            Command::Evaluate(EvaluateArgs {
                expression: "show endian".to_string(),
                frame_id: None,
                context: EvaluateContext::Repl,
            }),
            Disposition::FollowUp(FollowUp::DetectEndianness),
            false,
        )
        .await;
    }

    // ------------------------------------------------------------------
    // Client messages
    // ------------------------------------------------------------------

    pub(crate) async fn on_message(&mut self, message: SessionMessage) {
        match message {
            SessionMessage::UserCommand { line, reply } => {
                self.process_user_command(&line, reply).await;
            }
            SessionMessage::Execute { command } => {
                self.send_request(command, Disposition::Log, false).await;
            }
            SessionMessage::Request { command, reply } => {
                self.send_request(command, Disposition::Caller(reply), false).await;
            }
            SessionMessage::AddBreakpoint {
                kind,
                temporary,
                condition,
            } => {
                self.add_breakpoint(kind, temporary, condition).await;
            }
            SessionMessage::RemoveBreakpoint { number } => {
                let removed = self
                    .breakpoints
                    .as_mut()
                    .and_then(|breakpoints| breakpoints.remove(number));
                if let Some((key, request)) = removed {
                    self.send_request(
                        request,
                        Disposition::FollowUp(FollowUp::SetBreakpoints(key)),
                        false,
                    )
                    .await;
                }
            }
            SessionMessage::ContinueExecution => {
                self.continue_execution().await;
            }
            SessionMessage::StepOver => {
                self.step(StepKind::Over).await;
            }
            SessionMessage::StepIn => {
                self.step(StepKind::In).await;
            }
            SessionMessage::StepOut => {
                self.step(StepKind::Out).await;
            }
            SessionMessage::SelectFrame { target } => {
                self.frame_navigate(target).await;
            }
            SessionMessage::Quit => {
                self.begin_quit().await;
            }
        }
    }

    /// Translate one line of user text into protocol traffic, in the
    /// grammar's order. The parse itself lives in the `commands` crate;
    /// this resolves the parts that need session state.
    pub(crate) async fn process_user_command(
        &mut self,
        line: &str,
        reply: Option<oneshot::Sender<CommandResult>>,
    ) {
        let parsed = match commands::parse(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                let message = e.to_string();
                self.console.error(&message);
                if let Some(tx) = reply {
                    let _ = tx.send(CommandResult::Error(message));
                }
                return;
            }
        };

        match parsed {
            ParsedCommand::Empty => {
                if let Some(tx) = reply {
                    let _ = tx.send(CommandResult::Output(String::new()));
                }
            }
            ParsedCommand::Quit => {
                self.begin_quit().await;
                if let Some(tx) = reply {
                    let _ = tx.send(CommandResult::Output(String::new()));
                }
            }
            ParsedCommand::CatchException { name, temporary } => {
                self.add_breakpoint(BreakpointKind::Exception { name }, temporary, None)
                    .await;
                if let Some(tx) = reply {
                    let _ = tx.send(CommandResult::Output(String::new()));
                }
            }
            ParsedCommand::Break(spec) => match self.resolve_break_location(spec.location) {
                Ok(kind) => {
                    self.add_breakpoint(kind, spec.temporary, spec.condition).await;
                    if let Some(tx) = reply {
                        let _ = tx.send(CommandResult::Output(String::new()));
                    }
                }
                Err(diagnostic) => {
                    self.console.error(&diagnostic);
                    if let Some(tx) = reply {
                        let _ = tx.send(CommandResult::Error(diagnostic));
                    }
                }
            },
            ParsedCommand::Continue => {
                let sent = self.continue_execution().await;
                if let Some(tx) = reply {
                    let _ = tx.send(if sent {
                        CommandResult::Output(String::new())
                    } else {
                        CommandResult::Rejected
                    });
                }
            }
            ParsedCommand::Frame(nav) => {
                let target = match nav {
                    FrameNav::Up => FrameTarget::Up,
                    FrameNav::Down => FrameTarget::Down,
                    FrameNav::Select(level) => FrameTarget::Level(level),
                };
                self.frame_navigate(target).await;
                if let Some(tx) = reply {
                    let _ = tx.send(CommandResult::Output(String::new()));
                }
            }
            ParsedCommand::Evaluate(expression) => {
                if !self.is_ready_for_command() {
                    tracing::debug!(%expression, "command rejected: session busy");
                    if let Some(tx) = reply {
                        let _ = tx.send(CommandResult::Rejected);
                    } else {
                        self.console.error("command rejected: the debugger is busy");
                    }
                    return;
                }
                let frame_id = self.frames.selected_frame().map(|frame| frame.id);
                self.send_request(
                    Command::Evaluate(EvaluateArgs {
                        expression,
                        frame_id,
                        context: EvaluateContext::Repl,
                    }),
                    Disposition::FollowUp(FollowUp::Evaluate { echo: true, reply }),
                    false,
                )
                .await;
            }
        }
    }

    /// Resolve the grammar's location forms that depend on the current
    /// execution state.
    fn resolve_break_location(&self, location: BreakLocation) -> Result<BreakpointKind, String> {
        match location {
            BreakLocation::Offset(offset) => {
                let file = self
                    .frames
                    .current_file()
                    .ok_or("no current source file for a relative breakpoint")?
                    .to_path_buf();
                let line = self.frames.current_line().unwrap_or(1) as i64 + offset;
                if line < 1 {
                    return Err(format!("line offset {offset} goes before the start of the file"));
                }
                Ok(BreakpointKind::Source {
                    file,
                    line: line as usize,
                })
            }
            BreakLocation::Address(address) => Ok(BreakpointKind::Address(address)),
            BreakLocation::Line { file: Some(file), line } => Ok(BreakpointKind::Source {
                file: file.into(),
                line,
            }),
            BreakLocation::Line { file: None, line } => {
                let file = self
                    .frames
                    .current_file()
                    .ok_or("no current source file")?
                    .to_path_buf();
                Ok(BreakpointKind::Source { file, line })
            }
            BreakLocation::Subprogram(name) => Ok(BreakpointKind::Subprogram(name)),
            BreakLocation::NextInstruction => {
                let address = self
                    .frames
                    .current_address()
                    .ok_or("no current address for an instruction breakpoint")?;
                Ok(BreakpointKind::Address(address + 1))
            }
        }
    }

    /// A breakpoint request before the synchronizer exists (launch still
    /// in flight) is a no-op.
    async fn add_breakpoint(
        &mut self,
        kind: BreakpointKind,
        temporary: bool,
        condition: Option<String>,
    ) {
        match &kind {
            BreakpointKind::Subprogram(_)
                if self.capabilities.supports_function_breakpoints == Some(false) =>
            {
                self.console
                    .error("the adapter does not support subprogram breakpoints");
                return;
            }
            BreakpointKind::Address(_)
                if self.capabilities.supports_instruction_breakpoints == Some(false) =>
            {
                self.console
                    .error("the adapter does not support address breakpoints");
                return;
            }
            _ => {}
        }

        let Some(breakpoints) = self.breakpoints.as_mut() else {
            tracing::debug!(?kind, "breakpoint requested before launch completed; ignored");
            return;
        };
        let (number, key, request) = breakpoints.add(kind, temporary, condition);
        tracing::debug!(number, ?key, "breakpoint added");
        self.send_request(request, Disposition::FollowUp(FollowUp::SetBreakpoints(key)), false)
            .await;
    }

    /// Resume the debuggee. Only meaningful while stopped; anything else
    /// issues no request at all.
    async fn continue_execution(&mut self) -> bool {
        if self.status != Status::Stopped {
            tracing::debug!(status = ?self.status, "continue ignored: debuggee is not stopped");
            return false;
        }
        let thread_id = self
            .selected_thread
            .or_else(|| self.stopped_threads.iter().next().copied())
            .unwrap_or(1);
        self.send_request(
            Command::Continue(ContinueArgs { thread_id }),
            Disposition::FollowUp(FollowUp::Continue),
            false,
        )
        .await;
        true
    }

    async fn step(&mut self, kind: StepKind) {
        if self.status != Status::Stopped {
            tracing::debug!(status = ?self.status, "step ignored: debuggee is not stopped");
            return;
        }
        let thread_id = self
            .selected_thread
            .or_else(|| self.stopped_threads.iter().next().copied())
            .unwrap_or(1);
        let command = match kind {
            StepKind::Over => Command::Next(NextArgs { thread_id }),
            StepKind::In => Command::StepIn(StepInArgs { thread_id }),
            StepKind::Out => Command::StepOut(StepOutArgs { thread_id }),
        };
        self.send_request(command, Disposition::FollowUp(FollowUp::Step), false)
            .await;
    }

    async fn frame_navigate(&mut self, target: FrameTarget) {
        if self.status != Status::Stopped {
            self.console.error("no stack: the debuggee is not stopped");
            return;
        }
        if self.frames.is_empty() {
            if let Some(thread_id) = self.selected_thread {
                self.send_request(
                    Command::StackTrace(StackTraceArgs {
                        thread_id,
                        start_frame: None,
                        levels: Some(STOP_FRAME_DEPTH),
                    }),
                    Disposition::FollowUp(FollowUp::StackTrace(StackTraceGoal::SelectFrame(
                        target,
                    ))),
                    false,
                )
                .await;
            } else {
                self.console.error("no stack trace available");
            }
            return;
        }
        self.select_frame(target);
    }

    fn select_frame(&mut self, target: FrameTarget) {
        match self.frames.select(target) {
            Ok(frame) => {
                tracing::debug!(frame = %frame.name, "frame selected");
            }
            Err(message) => {
                self.console.error(&message);
                return;
            }
        }
        if let Some(location) = self.frames.location() {
            self.hooks.location_changed(location);
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// The quit sequence: reject everything in flight, become
    /// `Terminating`, then send the final disconnect under the force
    /// override.
    pub(crate) async fn begin_quit(&mut self) {
        if self.status == Status::Terminating || self.finished {
            return;
        }
        self.reject_all().await;
        self.set_status(Status::Terminating);
        self.send_request(
            Command::Disconnect(DisconnectArgs {
                terminate_debuggee: true,
            }),
            Disposition::FollowUp(FollowUp::Disconnect),
            true,
        )
        .await;
    }

    /// Fire the rejection continuation of every pending request.
    /// Idempotent: a second call finds the registry empty.
    pub(crate) async fn reject_all(&mut self) {
        let drained = self.pending.drain_for_rejection();
        if !drained.is_empty() {
            tracing::debug!(count = drained.len(), "rejecting all pending requests");
        }
        self.publish();
        for PendingRequest { disposition, .. } in drained {
            if let Some(follow_up) = disposition.reject() {
                self.on_follow_up_rejected(follow_up).await;
            }
        }
    }

    /// Subprocess death or pipe error: reject everything, terminate.
    pub(crate) async fn transport_failure(&mut self) {
        if self.finished {
            return;
        }
        tracing::warn!("transport failure; terminating session");
        self.reject_all().await;
        self.set_status(Status::Terminating);
        self.finish_teardown().await;
    }

    async fn finish_teardown(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let Some(breakpoints) = self.breakpoints.as_mut() {
            breakpoints.finalize();
        }
        if let Some(adapter) = self.adapter.take() {
            adapter.shutdown().await;
        }
        self.publish();
    }
}

enum StepKind {
    Over,
    In,
    Out,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stack::Location;
    use crate::testing::{BufferConsole, HookEvent, RecordingHooks};
    use std::sync::Arc;
    use tokio::io::DuplexStream;

    struct Fixture {
        inner: SessionInner<DuplexStream>,
        hooks: RecordingHooks,
        console: BufferConsole,
        // keeps the write half connected so request writes succeed
        _peer: DuplexStream,
    }

    fn fixture() -> Fixture {
        let (ours, peer) = tokio::io::duplex(1024 * 1024);
        let hooks = RecordingHooks::new();
        let console = BufferConsole::new();
        let config = SessionConfig::new("/work/main")
            .with_console(Arc::new(console.clone()))
            .with_hooks(Box::new(hooks.clone()));
        let (snapshot_tx, _snapshot_rx) = watch::channel(Snapshot::default());
        let inner = SessionInner::new(DapWriter::new(ours), config, snapshot_tx);
        Fixture {
            inner,
            hooks,
            console,
            _peer: peer,
        }
    }

    fn frame(json: serde_json::Value) -> Frame {
        let payload = serde_json::to_vec(&json).unwrap();
        let envelope = Envelope::from_payload(&payload).unwrap();
        Frame::new(envelope, payload)
    }

    fn state_changes(hooks: &RecordingHooks) -> usize {
        hooks.count(|e| matches!(e, HookEvent::StateChanged(..)))
    }

    #[tokio::test]
    async fn same_status_transition_is_a_noop() {
        let mut f = fixture();
        f.inner.set_status(Status::Running);
        assert_eq!(state_changes(&f.hooks), 1);

        f.inner.set_status(Status::Running);
        assert_eq!(state_changes(&f.hooks), 1);
    }

    #[tokio::test]
    async fn terminating_absorbs_all_transitions() {
        let mut f = fixture();
        f.inner.set_status(Status::Terminating);
        let observed = state_changes(&f.hooks);

        f.inner.set_status(Status::Running);
        f.inner.set_status(Status::Stopped);
        assert_eq!(f.inner.status, Status::Terminating);
        assert_eq!(state_changes(&f.hooks), observed);
    }

    #[tokio::test]
    async fn leaving_session_range_clears_thread_state() {
        let mut f = fixture();
        f.inner.set_status(Status::Stopped);
        f.inner.stopped_threads.extend([1, 2]);
        f.inner.selected_thread = Some(1);

        f.inner.set_status(Status::Terminating);
        assert!(f.inner.stopped_threads.is_empty());
        assert_eq!(f.inner.selected_thread, None);
    }

    #[tokio::test]
    async fn continued_event_clears_or_removes_threads() {
        let mut f = fixture();
        f.inner.set_status(Status::Stopped);
        f.inner.stopped_threads.extend([1, 2, 3]);
        f.inner.selected_thread = Some(2);

        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 1, "type": "event", "event": "continued",
                "body": {"threadId": 2, "allThreadsContinued": false},
            })))
            .await;

        assert_eq!(
            f.inner.stopped_threads.iter().copied().collect::<Vec<_>>(),
            vec![1, 3]
        );
        // selection defaults back to the lowest stopped thread
        assert_eq!(f.inner.selected_thread, Some(1));
        assert_eq!(f.inner.status, Status::Running);

        f.inner.set_status(Status::Stopped);
        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 2, "type": "event", "event": "continued",
                "body": {"threadId": 1, "allThreadsContinued": true},
            })))
            .await;
        assert!(f.inner.stopped_threads.is_empty());
        assert_eq!(f.inner.selected_thread, None);
    }

    #[tokio::test]
    async fn malformed_stopped_event_still_stops_the_session() {
        let mut f = fixture();
        f.inner.set_status(Status::Running);

        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 1, "type": "event", "event": "stopped",
                "body": {"reason": 13},
            })))
            .await;

        assert_eq!(f.inner.status, Status::Stopped);
    }

    #[tokio::test]
    async fn stopped_event_records_thread_and_fires_debuggee_started_once() {
        let mut f = fixture();
        f.inner.set_status(Status::Running);
        // a location is already known, so the stop is declared directly
        f.inner.frames.set_location(Location {
            file: Some("main.adb".into()),
            line: Some(3),
            address: None,
        });

        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 1, "type": "event", "event": "stopped",
                "body": {"reason": "step", "threadId": 4, "allThreadsStopped": true},
            })))
            .await;

        assert_eq!(f.inner.status, Status::Stopped);
        assert!(f.inner.stopped_threads.contains(&4));
        assert_eq!(f.inner.selected_thread, Some(4));
        assert!(f.inner.all_threads_stopped);
        assert_eq!(f.hooks.count(|e| *e == HookEvent::DebuggeeStarted), 1);
        assert_eq!(f.hooks.count(|e| *e == HookEvent::ProcessStopped), 1);

        // a second stop does not re-fire the one-time notification
        f.inner.set_status(Status::Running);
        f.inner.frames.set_location(Location {
            file: Some("main.adb".into()),
            line: Some(9),
            address: None,
        });
        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 2, "type": "event", "event": "stopped",
                "body": {"reason": "step", "threadId": 4},
            })))
            .await;
        assert_eq!(f.hooks.count(|e| *e == HookEvent::DebuggeeStarted), 1);
    }

    #[tokio::test]
    async fn stop_without_location_requests_a_stack_trace_first() {
        let mut f = fixture();
        f.inner.set_status(Status::Running);

        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 1, "type": "event", "event": "stopped",
                "body": {"reason": "pause", "threadId": 1},
            })))
            .await;

        // not stopped yet: a stackTrace request is in flight
        assert_eq!(f.inner.status, Status::Running);
        assert_eq!(f.inner.pending.command_names(), vec!["stackTrace"]);

        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 2, "type": "response", "request_seq": 1, "success": true,
                "command": "stackTrace",
                "body": {"stackFrames": [{
                    "id": 7, "name": "main", "line": 21, "column": 1,
                    "source": {"name": "main.adb", "path": "/work/main.adb"},
                }]},
            })))
            .await;

        assert_eq!(f.inner.status, Status::Stopped);
        assert_eq!(f.inner.frames.current_line(), Some(21));
    }

    #[tokio::test]
    async fn stack_trace_failure_after_stop_is_conservative() {
        let mut f = fixture();
        f.inner.set_status(Status::Running);
        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 1, "type": "event", "event": "stopped",
                "body": {"reason": "pause", "threadId": 1},
            })))
            .await;

        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 2, "type": "response", "request_seq": 1, "success": false,
                "command": "stackTrace", "message": "no such thread",
            })))
            .await;

        assert_eq!(f.inner.status, Status::Stopped);
    }

    #[tokio::test]
    async fn response_with_unknown_request_seq_is_a_noop() {
        let mut f = fixture();
        let before = f.hooks.events().len();

        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 9, "type": "response", "request_seq": 42, "success": true,
                "command": "continue",
            })))
            .await;

        assert_eq!(f.inner.pending.len(), 0);
        assert_eq!(f.hooks.events().len(), before);
    }

    #[tokio::test]
    async fn reject_all_is_idempotent_and_fires_rejections_once() {
        let mut f = fixture();
        let (tx1, mut rx1) = oneshot::channel();
        let (tx2, mut rx2) = oneshot::channel();
        f.inner
            .send_request(Command::Threads, Disposition::Caller(tx1), false)
            .await;
        f.inner
            .send_request(Command::Threads, Disposition::Caller(tx2), false)
            .await;
        assert_eq!(f.inner.pending.len(), 2);

        f.inner.reject_all().await;
        assert!(matches!(rx1.try_recv(), Ok(Outcome::Rejected)));
        assert!(matches!(rx2.try_recv(), Ok(Outcome::Rejected)));
        assert_eq!(f.inner.pending.len(), 0);

        // second call finds nothing to reject
        f.inner.reject_all().await;
        assert_eq!(f.inner.pending.len(), 0);
    }

    #[tokio::test]
    async fn continue_only_runs_while_stopped() {
        let mut f = fixture();
        f.inner.set_status(Status::Running);
        assert!(!f.inner.continue_execution().await);
        assert_eq!(f.inner.pending.len(), 0);

        f.inner.set_status(Status::Stopped);
        f.inner.stopped_threads.insert(5);
        f.inner.selected_thread = Some(5);
        assert!(f.inner.continue_execution().await);
        assert_eq!(f.inner.pending.command_names(), vec!["continue"]);
    }

    #[tokio::test]
    async fn break_commands_before_launch_are_noops() {
        let mut f = fixture();
        f.inner
            .process_user_command("break foo.adb:12", None)
            .await;
        assert_eq!(f.inner.pending.len(), 0);
    }

    #[tokio::test]
    async fn break_command_places_source_breakpoint() {
        let mut f = fixture();
        f.inner.breakpoints = Some(Breakpoints::new("/work/main".into()));
        f.inner.set_status(Status::Stopped);

        f.inner
            .process_user_command("break foo.adb:12", None)
            .await;

        let snapshot = f.inner.breakpoints.as_ref().unwrap().snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(
            snapshot[0].kind,
            BreakpointKind::Source {
                file: "foo.adb".into(),
                line: 12
            }
        );
        assert!(!snapshot[0].temporary);
        assert_eq!(snapshot[0].condition, None);
        assert_eq!(f.inner.pending.command_names(), vec!["setBreakpoints"]);
    }

    #[tokio::test]
    async fn temporary_break_uses_current_file() {
        let mut f = fixture();
        f.inner.breakpoints = Some(Breakpoints::new("/work/main".into()));
        f.inner.set_status(Status::Stopped);
        f.inner.frames.set_location(Location {
            file: Some("bar.adb".into()),
            line: Some(40),
            address: None,
        });

        f.inner.process_user_command("tbreak 5", None).await;

        let snapshot = f.inner.breakpoints.as_ref().unwrap().snapshot();
        assert_eq!(
            snapshot[0].kind,
            BreakpointKind::Source {
                file: "bar.adb".into(),
                line: 5
            }
        );
        assert!(snapshot[0].temporary);
    }

    #[tokio::test]
    async fn break_at_address_command() {
        let mut f = fixture();
        f.inner.breakpoints = Some(Breakpoints::new("/work/main".into()));
        f.inner.set_status(Status::Stopped);

        f.inner.process_user_command("break *0x4010", None).await;

        let snapshot = f.inner.breakpoints.as_ref().unwrap().snapshot();
        assert_eq!(snapshot[0].kind, BreakpointKind::Address(0x4010));
        assert_eq!(
            f.inner.pending.command_names(),
            vec!["setInstructionBreakpoints"]
        );
    }

    #[tokio::test]
    async fn relative_break_without_current_file_is_a_diagnostic() {
        let mut f = fixture();
        f.inner.breakpoints = Some(Breakpoints::new("/work/main".into()));
        f.inner.set_status(Status::Stopped);

        f.inner.process_user_command("break +3", None).await;

        assert_eq!(f.inner.pending.len(), 0);
        assert!(!f.console.errors().is_empty());
    }

    #[tokio::test]
    async fn hardware_break_alias_reports_unsupported() {
        let mut f = fixture();
        let (tx, mut rx) = oneshot::channel();
        f.inner
            .process_user_command("hbreak main", Some(tx))
            .await;
        assert!(matches!(rx.try_recv(), Ok(CommandResult::Error(_))));
        assert!(f.console.text().contains("hardware breakpoints"));
    }

    #[tokio::test]
    async fn unmatched_text_becomes_console_evaluate() {
        let mut f = fixture();
        f.inner.set_status(Status::Stopped);

        f.inner.process_user_command("info registers", None).await;
        assert_eq!(f.inner.pending.command_names(), vec!["evaluate"]);

        // and the result echoes to the console
        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 2, "type": "response", "request_seq": 1, "success": true,
                "command": "evaluate",
                "body": {"result": "rax 0x0", "variablesReference": 0},
            })))
            .await;
        assert!(f.console.text().contains("rax 0x0"));
    }

    #[tokio::test]
    async fn evaluate_while_busy_is_rejected_not_errored() {
        let mut f = fixture();
        f.inner.set_status(Status::Running);

        let (tx, mut rx) = oneshot::channel();
        f.inner
            .process_user_command("print x", Some(tx))
            .await;
        assert!(matches!(rx.try_recv(), Ok(CommandResult::Rejected)));
        assert_eq!(f.inner.pending.len(), 0);
    }

    #[tokio::test]
    async fn commands_are_serialized_not_pipelined() {
        let mut f = fixture();
        f.inner.set_status(Status::Stopped);
        assert!(f.inner.is_ready_for_command());

        f.inner.process_user_command("print x", None).await;
        // one request in flight: the session is no longer ready
        assert!(!f.inner.is_ready_for_command());

        let (tx, mut rx) = oneshot::channel();
        f.inner.process_user_command("print y", Some(tx)).await;
        assert!(matches!(rx.try_recv(), Ok(CommandResult::Rejected)));
    }

    #[tokio::test]
    async fn output_events_route_by_category() {
        let mut f = fixture();
        let debuggee = BufferConsole::new();
        f.inner.debuggee_console = Some(Arc::new(debuggee.clone()));

        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 1, "type": "event", "event": "output",
                "body": {"category": "stdout", "output": "hello from the program\n"},
            })))
            .await;
        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 2, "type": "event", "event": "output",
                "body": {"category": "console", "output": "adapter chatter\n"},
            })))
            .await;
        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 3, "type": "event", "event": "output",
                "body": {"category": "stderr", "output": "boom\n"},
            })))
            .await;

        assert!(debuggee.text().contains("hello from the program"));
        assert_eq!(
            debuggee
                .contents()
                .iter()
                .filter(|(s, _)| *s == Severity::Error)
                .count(),
            1
        );
        let debugger_console = f.console.contents();
        assert_eq!(debugger_console.len(), 1);
        assert_eq!(debugger_console[0].0, Severity::Verbose);
    }

    #[tokio::test]
    async fn duplicate_termination_events_notify_once() {
        let mut f = fixture();
        f.inner.set_status(Status::Running);

        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 1, "type": "event", "event": "exited",
                "body": {"exitCode": 0},
            })))
            .await;
        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 2, "type": "event", "event": "terminated",
            })))
            .await;

        assert_eq!(f.hooks.count(|e| *e == HookEvent::DebuggeeTerminated), 1);
        assert_eq!(f.inner.status, Status::Ready);
        assert!(f.console.text().contains("Debuggee terminated"));
    }

    #[tokio::test]
    async fn endianness_probe_parses_reply() {
        let mut f = fixture();
        f.inner.probe_endianness().await;
        assert_eq!(f.inner.pending.command_names(), vec!["evaluate"]);

        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 2, "type": "response", "request_seq": 1, "success": true,
                "command": "evaluate",
                "body": {
                    "result": "The target endianness is set automatically (currently little endian).",
                    "variablesReference": 0,
                },
            })))
            .await;

        assert_eq!(f.inner.endianness(), Some(Endianness::Little));
    }

    #[tokio::test]
    async fn quit_rejects_pending_and_sends_forced_disconnect() {
        let mut f = fixture();
        f.inner.set_status(Status::Stopped);
        let (tx, mut rx) = oneshot::channel();
        f.inner
            .send_request(Command::Threads, Disposition::Caller(tx), false)
            .await;

        f.inner.begin_quit().await;

        assert!(matches!(rx.try_recv(), Ok(Outcome::Rejected)));
        assert_eq!(f.inner.status, Status::Terminating);
        // the disconnect went out despite Terminating, via the force
        // override
        assert_eq!(f.inner.pending.command_names(), vec!["disconnect"]);
        assert_eq!(f.hooks.count(|e| *e == HookEvent::DebuggerTerminated), 1);

        // the disconnect response completes teardown
        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 3, "type": "response", "request_seq": 2, "success": true,
                "command": "disconnect",
            })))
            .await;
        assert!(f.inner.finished());
    }

    #[tokio::test]
    async fn requests_after_terminating_are_rejected() {
        let mut f = fixture();
        f.inner.begin_quit().await;

        let (tx, mut rx) = oneshot::channel();
        f.inner
            .send_request(Command::Threads, Disposition::Caller(tx), false)
            .await;
        assert!(matches!(rx.try_recv(), Ok(Outcome::Rejected)));
    }

    #[tokio::test]
    async fn breakpoint_hit_resolves_location_and_drops_temporaries() {
        let mut f = fixture();
        let mut breakpoints = Breakpoints::new("/work/main".into());
        let (_, key, _) = breakpoints.add(
            BreakpointKind::Source {
                file: "/work/foo.adb".into(),
                line: 12,
            },
            true,
            None,
        );
        breakpoints.apply_verification(
            &key,
            &[serde_json::from_value(serde_json::json!({
                "id": 7, "verified": true, "line": 12,
            }))
            .unwrap()],
        );
        f.inner.breakpoints = Some(breakpoints);
        f.inner.set_status(Status::Running);

        f.inner
            .handle_frame(frame(serde_json::json!({
                "seq": 1, "type": "event", "event": "stopped",
                "body": {
                    "reason": "breakpoint",
                    "threadId": 1,
                    "hitBreakpointIds": [7],
                },
            })))
            .await;

        // the hit resolved to a source location, so no stack trace was
        // needed before declaring the stop
        assert_eq!(f.inner.status, Status::Stopped);
        assert_eq!(
            f.inner.frames.current_file().unwrap(),
            std::path::Path::new("/work/foo.adb")
        );
        // the temporary breakpoint is gone and its category resynced
        assert!(f.inner.breakpoints.as_ref().unwrap().snapshot().is_empty());
        assert_eq!(f.inner.pending.command_names(), vec!["setBreakpoints"]);
    }
}
