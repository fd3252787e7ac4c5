//! The gdb-style command grammar.
//!
//! Translates a raw text line into a [`ParsedCommand`]. The grammar is an
//! ordered list of matchers, first match wins, and the order is load
//! bearing: `continue` is only meaningful once breakpoint/catch text has
//! been consumed by an earlier matcher, and a command line is never
//! matched against two different categories. Anything left over falls
//! through to a verbatim console-context `evaluate`.
//!
//! This crate is pure text processing: no transport, no session state.
//! Resolving relative line offsets against the current file, and gating
//! `continue` on the debugger being stopped, happen in the `session`
//! crate, which owns that state.

use once_cell::sync::Lazy;
use regex::Regex;

/// A recognized command, ready to be synthesized into a protocol request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// Blank input; nothing to do.
    Empty,
    /// `quit`, `qui`, `q` or `-gdb-exit`: initiate the session quit
    /// sequence.
    Quit,
    /// `catch exception [name]` / `tcatch exception [name]`: an exception
    /// breakpoint, temporary iff `tcatch`.
    CatchException {
        name: Option<String>,
        temporary: bool,
    },
    /// One of the `break` family with a parsed location.
    Break(BreakSpec),
    /// `continue`, `c` or `fg`.
    Continue,
    /// `up`, `down` or `frame N`.
    Frame(FrameNav),
    /// No pattern matched: forward verbatim as a console-context
    /// `evaluate` request.
    Evaluate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameNav {
    Up,
    Down,
    Select(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakSpec {
    pub location: BreakLocation,
    pub temporary: bool,
    pub condition: Option<String>,
}

/// Where a breakpoint goes, in the grammar's priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakLocation {
    /// A signed offset relative to the current line; requires a known
    /// current file, which only the session can check.
    Offset(i64),
    /// `*0xHEX`: a raw instruction address.
    Address(u64),
    /// `file:line`, or a bare `line` within the current file.
    Line { file: Option<String>, line: usize },
    /// A bare subprogram name.
    Subprogram(String),
    /// `break` with no details at all: the instruction after the current
    /// one.
    NextInstruction,
}

/// A line that partially matched a command pattern but whose details are
/// unusable. Surfaced as a console diagnostic; no request is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("hardware breakpoints are not supported ({0})")]
    HardwareBreakpointsUnsupported(String),
    #[error("cannot parse breakpoint location {0:?}")]
    InvalidBreakpointSpec(String),
}

static QUIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:quit|qui|q|-gdb-exit)$").unwrap());

static CATCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(t?catch)\s+exception(?:\s+(\S+))?$").unwrap());

static BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(break|tbreak|hbreak|thbreak|rbreak|thb|hb|rb|tb|b)(?:\s+(.+))?$").unwrap()
});

static CONTINUE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:continue|c|fg)$").unwrap());

static FRAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(up)|(down)|frame\s+(\d+))$").unwrap());

static CONDITION_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*?)\s+if\s+(.+)$").unwrap());

/// Parse one command line.
///
/// Matchers are tried in the documented order; the first that recognizes
/// the line consumes it entirely.
pub fn parse(line: &str) -> Result<ParsedCommand, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ParsedCommand::Empty);
    }

    if QUIT.is_match(line) {
        return Ok(ParsedCommand::Quit);
    }

    if let Some(captures) = CATCH.captures(line) {
        return Ok(ParsedCommand::CatchException {
            temporary: &captures[1] == "tcatch",
            name: captures.get(2).map(|m| m.as_str().to_string()),
        });
    }

    if let Some(captures) = BREAK.captures(line) {
        let keyword = &captures[1];
        if matches!(keyword, "hbreak" | "thbreak" | "rbreak" | "thb" | "hb" | "rb") {
            return Err(CommandError::HardwareBreakpointsUnsupported(
                keyword.to_string(),
            ));
        }
        let temporary = matches!(keyword, "tbreak" | "tb");
        let details = captures.get(2).map(|m| m.as_str());
        let spec = parse_break_details(details, temporary)?;
        return Ok(ParsedCommand::Break(spec));
    }

    if CONTINUE.is_match(line) {
        return Ok(ParsedCommand::Continue);
    }

    if let Some(captures) = FRAME.captures(line) {
        let nav = if captures.get(1).is_some() {
            FrameNav::Up
        } else if captures.get(2).is_some() {
            FrameNav::Down
        } else {
            // the frame number is all digits; very large values are as
            // good as out-of-range ones
            let level = captures[3].parse().unwrap_or(usize::MAX);
            FrameNav::Select(level)
        };
        return Ok(ParsedCommand::Frame(nav));
    }

    Ok(ParsedCommand::Evaluate(line.to_string()))
}

/// The secondary grammar for `break` details, in priority order: signed
/// line offset, raw address, `file:line` or bare `line`, subprogram name.
fn parse_break_details(
    details: Option<&str>,
    temporary: bool,
) -> Result<BreakSpec, CommandError> {
    let Some(details) = details else {
        return Ok(BreakSpec {
            location: BreakLocation::NextInstruction,
            temporary,
            condition: None,
        });
    };

    let (location_text, condition) = match CONDITION_SUFFIX.captures(details) {
        Some(captures) => (
            captures.get(1).unwrap().as_str().trim(),
            Some(captures[2].trim().to_string()),
        ),
        None => (details.trim(), None),
    };

    if location_text.is_empty() {
        return Ok(BreakSpec {
            location: BreakLocation::NextInstruction,
            temporary,
            condition,
        });
    }

    let location = parse_break_location(location_text)?;
    Ok(BreakSpec {
        location,
        temporary,
        condition,
    })
}

fn parse_break_location(text: &str) -> Result<BreakLocation, CommandError> {
    let invalid = || CommandError::InvalidBreakpointSpec(text.to_string());

    if let Some(offset) = text.strip_prefix('+') {
        let amount: i64 = offset.trim().parse().map_err(|_| invalid())?;
        return Ok(BreakLocation::Offset(amount));
    }
    if let Some(offset) = text.strip_prefix('-') {
        let amount: i64 = offset.trim().parse().map_err(|_| invalid())?;
        return Ok(BreakLocation::Offset(-amount));
    }

    if let Some(address) = text.strip_prefix('*') {
        let digits = address
            .trim()
            .strip_prefix("0x")
            .or_else(|| address.trim().strip_prefix("0X"))
            .ok_or_else(invalid)?;
        let address = u64::from_str_radix(digits, 16).map_err(|_| invalid())?;
        return Ok(BreakLocation::Address(address));
    }

    if let Some((file, line)) = text.rsplit_once(':') {
        let line: usize = line.trim().parse().map_err(|_| invalid())?;
        let file = file.trim();
        if file.is_empty() {
            return Err(invalid());
        }
        return Ok(BreakLocation::Line {
            file: Some(file.to_string()),
            line,
        });
    }

    if text.chars().all(|c| c.is_ascii_digit()) {
        let line: usize = text.parse().map_err(|_| invalid())?;
        return Ok(BreakLocation::Line { file: None, line });
    }

    Ok(BreakLocation::Subprogram(text.to_string()))
}
