//! Test support: recording implementations of the collaborator seams.

use std::sync::{Arc, Mutex};

use crate::console::{Console, Severity, SharedConsole};
use crate::hooks::SessionHooks;
use crate::stack::Location;
use crate::status::{Availability, Status};

/// Every notification a session can emit, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum HookEvent {
    DebuggerStarted,
    DebuggeeStarted,
    ProcessStopped,
    LocationChanged(Location),
    DebuggeeTerminated,
    DebuggerTerminated,
    StateChanged(Status, Availability),
}

/// Hooks that record everything for later assertions.
#[derive(Clone, Default)]
pub struct RecordingHooks {
    events: Arc<Mutex<Vec<HookEvent>>>,
    debuggee_console: Option<SharedConsole>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also hand out a debuggee console when the session asks for one.
    pub fn with_debuggee_console(console: SharedConsole) -> Self {
        Self {
            events: Arc::default(),
            debuggee_console: Some(console),
        }
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&HookEvent) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| pred(e)).count()
    }

    fn push(&self, event: HookEvent) {
        self.events.lock().unwrap().push(event);
    }
}

impl SessionHooks for RecordingHooks {
    fn debugger_started(&mut self) {
        self.push(HookEvent::DebuggerStarted);
    }

    fn debuggee_started(&mut self) {
        self.push(HookEvent::DebuggeeStarted);
    }

    fn process_stopped(&mut self) {
        self.push(HookEvent::ProcessStopped);
    }

    fn location_changed(&mut self, location: &Location) {
        self.push(HookEvent::LocationChanged(location.clone()));
    }

    fn debuggee_terminated(&mut self) {
        self.push(HookEvent::DebuggeeTerminated);
    }

    fn debugger_terminated(&mut self) {
        self.push(HookEvent::DebuggerTerminated);
    }

    fn state_changed(&mut self, status: Status, availability: Availability) {
        self.push(HookEvent::StateChanged(status, availability));
    }

    fn create_debuggee_console(&mut self) -> Option<SharedConsole> {
        self.debuggee_console.clone()
    }
}

/// A console that stores everything written to it.
#[derive(Clone, Default)]
pub struct BufferConsole {
    lines: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl BufferConsole {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Vec<(Severity, String)> {
        self.lines.lock().unwrap().clone()
    }

    /// All text written, concatenated.
    pub fn text(&self) -> String {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.as_str())
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .filter(|(severity, _)| *severity == Severity::Error)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl Console for BufferConsole {
    fn output(&self, text: &str, severity: Severity, newline: bool) {
        let mut text = text.to_string();
        if newline {
            text.push('\n');
        }
        self.lines.lock().unwrap().push((severity, text));
    }
}
