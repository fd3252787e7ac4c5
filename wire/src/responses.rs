//! Typed response bodies, parsed in the second decode pass once the
//! pending request identifies which schema applies.

use serde::Deserialize;

use crate::types::{Breakpoint, StackFrame, Thread};

/// The subset of adapter capabilities this client consults. Everything
/// else in the `initialize` response is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub supports_configuration_done_request: Option<bool>,
    pub supports_function_breakpoints: Option<bool>,
    pub supports_conditional_breakpoints: Option<bool>,
    pub supports_instruction_breakpoints: Option<bool>,
    pub supports_exception_filter_options: Option<bool>,
    pub exception_breakpoint_filters: Option<Vec<ExceptionBreakpointsFilter>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionBreakpointsFilter {
    pub filter: String,
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointsResponseBody {
    pub breakpoints: Vec<Breakpoint>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueResponseBody {
    pub all_threads_continued: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceResponseBody {
    pub stack_frames: Vec<StackFrame>,
    pub total_frames: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThreadsResponseBody {
    pub threads: Vec<Thread>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponseBody {
    pub result: String,
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub memory_reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{Envelope, Frame};

    fn response_frame(json: &str) -> Frame {
        let payload = json.as_bytes().to_vec();
        let envelope = Envelope::from_payload(&payload).unwrap();
        Frame::new(envelope, payload)
    }

    #[test]
    fn parse_continue_response_body() {
        let frame = response_frame(
            r#"{"seq":2,"type":"response","request_seq":1,"success":true,"command":"continue","body":{"allThreadsContinued":true}}"#,
        );
        let body: ContinueResponseBody = frame.parse_body().unwrap();
        assert_eq!(body.all_threads_continued, Some(true));
    }

    #[test]
    fn parse_stack_trace_response_body() {
        let frame = response_frame(
            r#"{"seq":2,"type":"response","request_seq":1,"success":true,"command":"stackTrace","body":{
                "stackFrames":[{"id":1,"name":"main","line":12,"column":1,
                    "source":{"name":"foo.adb","path":"/work/foo.adb"}}],
                "totalFrames":1}}"#,
        );
        let body: StackTraceResponseBody = frame.parse_body().unwrap();
        assert_eq!(body.stack_frames.len(), 1);
        assert_eq!(body.stack_frames[0].line, 12);
        assert_eq!(
            body.stack_frames[0].source.as_ref().unwrap().name.as_deref(),
            Some("foo.adb")
        );
    }

    #[test]
    fn parse_capabilities_ignores_unknown_fields() {
        let frame = response_frame(
            r#"{"seq":2,"type":"response","request_seq":1,"success":true,"command":"initialize","body":{
                "supportsConfigurationDoneRequest":true,
                "supportsSteppingGranularity":true,
                "exceptionBreakpointFilters":[{"filter":"exception","label":"Ada exceptions"}]}}"#,
        );
        let body: Capabilities = frame.parse_body().unwrap();
        assert_eq!(body.supports_configuration_done_request, Some(true));
        let filters = body.exception_breakpoint_filters.unwrap();
        assert_eq!(filters[0].filter, "exception");
    }

    #[test]
    fn mismatched_schema_is_a_body_error() {
        let frame = response_frame(
            r#"{"seq":2,"type":"response","request_seq":1,"success":true,"command":"stackTrace","body":{"stackFrames":"oops"}}"#,
        );
        let result: Result<StackTraceResponseBody, _> = frame.parse_body();
        assert!(result.is_err());
    }
}
