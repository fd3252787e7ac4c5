//! The authoritative breakpoint set and its reconciliation with the
//! adapter.
//!
//! The session owns one `Breakpoints` value per launched debuggee. Client
//! code mutates the set here; every mutation yields the protocol request
//! that pushes the affected category to the adapter, and responses /
//! `breakpoint` events flow back in to reconcile the adapter-assigned
//! verification state.

use std::path::{Path, PathBuf};

use wire::events::BreakpointEventBody;
use wire::requests::{
    Command, SetBreakpointsArgs, SetExceptionBreakpointsArgs, SetFunctionBreakpointsArgs,
    SetInstructionBreakpointsArgs,
};
use wire::types::{
    Breakpoint as ReportedBreakpoint, BreakpointId, ExceptionFilterOptions, FunctionBreakpoint,
    InstructionBreakpoint, Source, SourceBreakpoint,
};

use crate::pending::SyncKey;
use crate::stack::Location;

/// The filter id gdb advertises for Ada exception breakpoints.
const EXCEPTION_FILTER: &str = "exception";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointKind {
    Source { file: PathBuf, line: usize },
    Address(u64),
    Subprogram(String),
    Exception { name: Option<String> },
}

/// One breakpoint as the client tracks it.
#[derive(Debug, Clone)]
pub struct BreakpointState {
    /// Client-local number, stable for the session's lifetime.
    pub number: u32,
    pub kind: BreakpointKind,
    pub temporary: bool,
    pub condition: Option<String>,
    pub enabled: bool,
    /// Adapter-assigned identity and verification, filled in by
    /// responses and `breakpoint` events.
    pub adapter_id: Option<BreakpointId>,
    pub verified: bool,
    /// The line the adapter actually placed the breakpoint on.
    pub actual_line: Option<usize>,
    pub address: Option<u64>,
}

pub(crate) struct Breakpoints {
    executable: PathBuf,
    next_number: u32,
    entries: Vec<BreakpointState>,
    finalized: bool,
}

impl Breakpoints {
    pub(crate) fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            next_number: 0,
            entries: Vec::new(),
            finalized: false,
        }
    }

    pub(crate) fn executable(&self) -> &Path {
        &self.executable
    }

    /// Add a breakpoint and return its number together with the request
    /// that synchronizes its category with the adapter.
    pub(crate) fn add(
        &mut self,
        kind: BreakpointKind,
        temporary: bool,
        condition: Option<String>,
    ) -> (u32, SyncKey, Command) {
        self.next_number += 1;
        let number = self.next_number;
        let key = Self::key_for(&kind);
        self.entries.push(BreakpointState {
            number,
            kind,
            temporary,
            condition,
            enabled: true,
            adapter_id: None,
            verified: false,
            actual_line: None,
            address: None,
        });
        let request = self.sync_request(&key);
        (number, key, request)
    }

    /// Remove a breakpoint by its client-local number. Returns the
    /// request resynchronizing the affected category, when the number was
    /// known.
    pub(crate) fn remove(&mut self, number: u32) -> Option<(SyncKey, Command)> {
        let index = self.entries.iter().position(|b| b.number == number)?;
        let removed = self.entries.remove(index);
        let key = Self::key_for(&removed.kind);
        let request = self.sync_request(&key);
        Some((key, request))
    }

    /// The requests that push the entire current set to the adapter, one
    /// per non-empty category. Used after the `initialized` event.
    pub(crate) fn initial_sync(&self) -> Vec<(SyncKey, Command)> {
        let mut keys: Vec<SyncKey> = Vec::new();
        for entry in &self.entries {
            let key = Self::key_for(&entry.kind);
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys.into_iter()
            .map(|key| {
                let request = self.sync_request(&key);
                (key, request)
            })
            .collect()
    }

    /// Build the request covering every enabled entry of one category.
    pub(crate) fn sync_request(&self, key: &SyncKey) -> Command {
        match key {
            SyncKey::Source(file) => Command::SetBreakpoints(SetBreakpointsArgs {
                source: Source {
                    name: file
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned()),
                    path: Some(file.clone()),
                },
                breakpoints: self
                    .entries_for(key)
                    .map(|b| {
                        let BreakpointKind::Source { line, .. } = &b.kind else {
                            unreachable!("source key selects source entries");
                        };
                        SourceBreakpoint {
                            line: *line,
                            condition: b.condition.clone(),
                        }
                    })
                    .collect(),
            }),
            SyncKey::Address => {
                Command::SetInstructionBreakpoints(SetInstructionBreakpointsArgs {
                    breakpoints: self
                        .entries_for(key)
                        .map(|b| {
                            let BreakpointKind::Address(address) = &b.kind else {
                                unreachable!("address key selects address entries");
                            };
                            InstructionBreakpoint {
                                instruction_reference: format!("{address:#x}"),
                                condition: b.condition.clone(),
                            }
                        })
                        .collect(),
                })
            }
            SyncKey::Subprogram => {
                Command::SetFunctionBreakpoints(SetFunctionBreakpointsArgs {
                    breakpoints: self
                        .entries_for(key)
                        .map(|b| {
                            let BreakpointKind::Subprogram(name) = &b.kind else {
                                unreachable!("subprogram key selects subprogram entries");
                            };
                            FunctionBreakpoint {
                                name: name.clone(),
                                condition: b.condition.clone(),
                            }
                        })
                        .collect(),
                })
            }
            SyncKey::Exception => {
                let options: Vec<ExceptionFilterOptions> = self
                    .entries_for(key)
                    .map(|b| {
                        let BreakpointKind::Exception { name } = &b.kind else {
                            unreachable!("exception key selects exception entries");
                        };
                        ExceptionFilterOptions {
                            filter_id: EXCEPTION_FILTER.to_string(),
                            condition: name.clone(),
                        }
                    })
                    .collect();
                Command::SetExceptionBreakpoints(SetExceptionBreakpointsArgs {
                    filters: if options.is_empty() {
                        Vec::new()
                    } else {
                        vec![EXCEPTION_FILTER.to_string()]
                    },
                    filter_options: if options.is_empty() {
                        None
                    } else {
                        Some(options)
                    },
                })
            }
        }
    }

    /// Reconcile a category with the breakpoints the adapter reported in
    /// a `set*Breakpoints` response. The adapter answers in request
    /// order, so the report zips with our entries for that category.
    pub(crate) fn apply_verification(
        &mut self,
        key: &SyncKey,
        reported: &[ReportedBreakpoint],
    ) {
        let indices: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, b)| b.enabled && Self::key_for(&b.kind) == *key)
            .map(|(i, _)| i)
            .collect();

        if indices.len() != reported.len() {
            tracing::warn!(
                expected = indices.len(),
                got = reported.len(),
                ?key,
                "adapter reported a different number of breakpoints than requested"
            );
        }

        for (index, report) in indices.into_iter().zip(reported) {
            let entry = &mut self.entries[index];
            entry.adapter_id = report.id;
            entry.verified = report.verified;
            entry.actual_line = report.line;
            entry.address = report
                .instruction_reference
                .as_deref()
                .and_then(parse_address);
        }
    }

    /// Reconcile one breakpoint from an unsolicited `breakpoint` event.
    pub(crate) fn on_breakpoint_event(&mut self, body: &BreakpointEventBody) {
        let Some(id) = body.breakpoint.id else {
            tracing::debug!(reason = %body.reason, "breakpoint event without id");
            return;
        };

        match body.reason.as_str() {
            "removed" => {
                self.entries.retain(|b| b.adapter_id != Some(id));
            }
            _ => {
                // "changed", "new", or an adapter-specific reason: update
                // the matching entry when there is one.
                let Some(entry) = self
                    .entries
                    .iter_mut()
                    .find(|b| b.adapter_id == Some(id))
                else {
                    tracing::debug!(id, reason = %body.reason, "breakpoint event for unknown breakpoint");
                    return;
                };
                entry.verified = body.breakpoint.verified;
                if body.breakpoint.line.is_some() {
                    entry.actual_line = body.breakpoint.line;
                }
                if let Some(reference) = body.breakpoint.instruction_reference.as_deref() {
                    entry.address = parse_address(reference);
                }
            }
        }
    }

    /// Resolve a `stopped` event's hit-breakpoint ids to the location of
    /// the first breakpoint the client knows about.
    pub(crate) fn resolve_hit(&self, ids: &[BreakpointId]) -> Option<Location> {
        let entry = ids
            .iter()
            .find_map(|id| self.entries.iter().find(|b| b.adapter_id == Some(*id)))?;

        let (file, line) = match &entry.kind {
            BreakpointKind::Source { file, line } => {
                (Some(file.clone()), entry.actual_line.or(Some(*line)))
            }
            _ => (None, entry.actual_line),
        };
        Some(Location {
            file,
            line,
            address: entry.address.or(match entry.kind {
                BreakpointKind::Address(address) => Some(address),
                _ => None,
            }),
        })
    }

    /// Drop temporary breakpoints that were just hit, returning the
    /// resynchronization requests for the affected categories.
    pub(crate) fn clear_hit_temporaries(
        &mut self,
        ids: &[BreakpointId],
    ) -> Vec<(SyncKey, Command)> {
        let mut keys: Vec<SyncKey> = Vec::new();
        self.entries.retain(|b| {
            let hit = b.temporary
                && b.adapter_id
                    .map(|id| ids.contains(&id))
                    .unwrap_or(false);
            if hit {
                let key = Self::key_for(&b.kind);
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
            !hit
        });
        keys.into_iter()
            .map(|key| {
                let request = self.sync_request(&key);
                (key, request)
            })
            .collect()
    }

    /// A point-in-time copy for hosts that display the set.
    pub(crate) fn snapshot(&self) -> Vec<BreakpointState> {
        self.entries.clone()
    }

    /// Release the synchronizer at session teardown. Called exactly once;
    /// a second call is a logged no-op.
    pub(crate) fn finalize(&mut self) {
        if self.finalized {
            tracing::warn!("breakpoint synchronizer finalized twice");
            return;
        }
        self.finalized = true;
        self.entries.clear();
    }

    fn entries_for<'a>(
        &'a self,
        key: &'a SyncKey,
    ) -> impl Iterator<Item = &'a BreakpointState> + 'a {
        self.entries
            .iter()
            .filter(move |b| b.enabled && Self::key_for(&b.kind) == *key)
    }

    fn key_for(kind: &BreakpointKind) -> SyncKey {
        match kind {
            BreakpointKind::Source { file, .. } => SyncKey::Source(file.clone()),
            BreakpointKind::Address(_) => SyncKey::Address,
            BreakpointKind::Subprogram(_) => SyncKey::Subprogram,
            BreakpointKind::Exception { .. } => SyncKey::Exception,
        }
    }
}

fn parse_address(reference: &str) -> Option<u64> {
    let digits = reference
        .strip_prefix("0x")
        .or_else(|| reference.strip_prefix("0X"))?;
    u64::from_str_radix(digits, 16).ok()
}
