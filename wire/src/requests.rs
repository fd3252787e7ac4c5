//! Requests sent from the client to the debug adapter.
//!
//! [`Command`] is a closed enum: one variant per request kind, each
//! carrying exactly the argument shape that kind defines. Serialization
//! produces the `command`/`arguments` pair of the wire format; the `seq`
//! and `type` fields are added by [`crate::Request`] and
//! [`crate::OutgoingMessage`].

use std::path::PathBuf;

use serde::Serialize;

use crate::types::{
    ExceptionFilterOptions, FunctionBreakpoint, InstructionBreakpoint, Source, SourceBreakpoint,
    StackFrameId, ThreadId,
};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", content = "arguments", rename_all = "camelCase")]
pub enum Command {
    Initialize(InitializeArgs),
    Launch(LaunchArgs),
    ConfigurationDone,
    SetBreakpoints(SetBreakpointsArgs),
    SetFunctionBreakpoints(SetFunctionBreakpointsArgs),
    SetInstructionBreakpoints(SetInstructionBreakpointsArgs),
    SetExceptionBreakpoints(SetExceptionBreakpointsArgs),
    Continue(ContinueArgs),
    Next(NextArgs),
    StepIn(StepInArgs),
    StepOut(StepOutArgs),
    Pause(PauseArgs),
    StackTrace(StackTraceArgs),
    Threads,
    Evaluate(EvaluateArgs),
    Disconnect(DisconnectArgs),
}

impl Command {
    /// The wire-format command string, used for logging and for echoing
    /// request kinds into diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Initialize(_) => "initialize",
            Command::Launch(_) => "launch",
            Command::ConfigurationDone => "configurationDone",
            Command::SetBreakpoints(_) => "setBreakpoints",
            Command::SetFunctionBreakpoints(_) => "setFunctionBreakpoints",
            Command::SetInstructionBreakpoints(_) => "setInstructionBreakpoints",
            Command::SetExceptionBreakpoints(_) => "setExceptionBreakpoints",
            Command::Continue(_) => "continue",
            Command::Next(_) => "next",
            Command::StepIn(_) => "stepIn",
            Command::StepOut(_) => "stepOut",
            Command::Pause(_) => "pause",
            Command::StackTrace(_) => "stackTrace",
            Command::Threads => "threads",
            Command::Evaluate(_) => "evaluate",
            Command::Disconnect(_) => "disconnect",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeArgs {
    #[serde(rename = "adapterID")]
    pub adapter_id: String,
    #[serde(rename = "clientID")]
    pub client_id: String,
    pub lines_start_at_one: bool,
    pub columns_start_at_one: bool,
    pub path_format: PathFormat,
    pub supports_variable_type: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathFormat {
    Path,
    Uri,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchArgs {
    pub program: PathBuf,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
    pub stop_at_beginning_of_main_subprogram: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointsArgs {
    pub source: Source,
    pub breakpoints: Vec<SourceBreakpoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFunctionBreakpointsArgs {
    pub breakpoints: Vec<FunctionBreakpoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetInstructionBreakpointsArgs {
    pub breakpoints: Vec<InstructionBreakpoint>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetExceptionBreakpointsArgs {
    pub filters: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_options: Option<Vec<ExceptionFilterOptions>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueArgs {
    pub thread_id: ThreadId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextArgs {
    pub thread_id: ThreadId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInArgs {
    pub thread_id: ThreadId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutArgs {
    pub thread_id: ThreadId,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseArgs {
    pub thread_id: ThreadId,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceArgs {
    pub thread_id: ThreadId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_frame: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateArgs {
    pub expression: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<StackFrameId>,
    pub context: EvaluateContext,
}

/// Where an `evaluate` request originates; adapters may alter behavior
/// per context (gdb only executes CLI commands in `repl` context).
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EvaluateContext {
    Repl,
    Watch,
    Hover,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectArgs {
    pub terminate_debuggee: bool,
}
