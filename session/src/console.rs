//! The console sink seam.
//!
//! The host application owns the actual console widgets; the session only
//! needs somewhere to put text. Two sinks may exist per session: the
//! debugger console (always present) and the debuggee console (created
//! lazily by the host once the session reaches `Ready`).

use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
    Verbose,
}

/// Where session and adapter text ends up.
pub trait Console: Send + Sync {
    /// Write `text` with the given severity. `newline` asks the sink to
    /// terminate the line; adapter output events carry their own line
    /// endings and pass `false`.
    fn output(&self, text: &str, severity: Severity, newline: bool);

    /// Convenience for a full informational line.
    fn line(&self, text: &str) {
        self.output(text, Severity::Info, true);
    }

    /// Convenience for a full error line.
    fn error(&self, text: &str) {
        self.output(text, Severity::Error, true);
    }
}

/// A console that discards everything.
pub struct NullConsole;

impl Console for NullConsole {
    fn output(&self, _text: &str, _severity: Severity, _newline: bool) {}
}

/// A console that prints to stdout/stderr, for command-line hosts.
pub struct StdioConsole;

impl Console for StdioConsole {
    fn output(&self, text: &str, severity: Severity, newline: bool) {
        match (severity, newline) {
            (Severity::Error, true) => eprintln!("{text}"),
            (Severity::Error, false) => eprint!("{text}"),
            (_, true) => println!("{text}"),
            (_, false) => print!("{text}"),
        }
    }
}

pub type SharedConsole = Arc<dyn Console>;
