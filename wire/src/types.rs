//! Types shared between [`crate::requests`], [`crate::responses`] and
//! [`crate::events`].

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub type Seq = i64;
pub type ThreadId = i64;
pub type BreakpointId = i64;
pub type StackFrameId = i64;

#[derive(Deserialize, Debug, Clone)]
pub struct Thread {
    pub id: ThreadId,
    pub name: String,
}

#[derive(Default, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Source {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// A breakpoint as the client asks for it, inside a `setBreakpoints`
/// request.
#[derive(Default, Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SourceBreakpoint {
    /// The source line of the breakpoint.
    pub line: usize,
    /// The expression for conditional breakpoints. Only honored by
    /// adapters advertising `supportsConditionalBreakpoints`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// A function breakpoint, inside a `setFunctionBreakpoints` request.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FunctionBreakpoint {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// An instruction breakpoint, inside a `setInstructionBreakpoints`
/// request. The reference is a memory address rendered as `0x...`.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InstructionBreakpoint {
    pub instruction_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// Exception breakpoint options, inside `setExceptionBreakpoints`.
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionFilterOptions {
    pub filter_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

/// A breakpoint as the adapter reports it back.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub id: Option<BreakpointId>,
    pub verified: bool,
    pub message: Option<String>,
    pub source: Option<Source>,
    pub line: Option<usize>,
    pub instruction_reference: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    pub id: StackFrameId,
    pub name: String,
    pub source: Option<Source>,
    pub line: usize,
    pub column: usize,
    /// Memory address of the frame's current instruction, as `0x...`.
    pub instruction_pointer_reference: Option<String>,
}

impl StackFrame {
    /// The frame's instruction address, when the adapter supplied one in
    /// parseable form.
    pub fn address(&self) -> Option<u64> {
        let reference = self.instruction_pointer_reference.as_deref()?;
        let digits = reference
            .strip_prefix("0x")
            .or_else(|| reference.strip_prefix("0X"))?;
        u64::from_str_radix(digits, 16).ok()
    }
}
