//! The per-session stack-trace cache and frame selection.
//!
//! Holds the frames from the most recent `stackTrace` response plus the
//! current source location, which may be known before any stack trace has
//! been fetched (a breakpoint hit resolves its own file/line/address).

use std::path::{Path, PathBuf};

use wire::types::StackFrame;

/// The current execution location as far as the client knows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    pub file: Option<PathBuf>,
    pub line: Option<usize>,
    pub address: Option<u64>,
}

impl Location {
    pub fn has_source(&self) -> bool {
        self.file.is_some()
    }
}

/// Which frame to select, from the `frame`/`up`/`down` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTarget {
    Up,
    Down,
    Level(usize),
}

#[derive(Default)]
pub(crate) struct FrameCache {
    frames: Vec<StackFrame>,
    selected: usize,
    location: Option<Location>,
}

impl FrameCache {
    pub(crate) fn clear(&mut self) {
        self.frames.clear();
        self.selected = 0;
        self.location = None;
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub(crate) fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub(crate) fn current_file(&self) -> Option<&Path> {
        self.location.as_ref()?.file.as_deref()
    }

    pub(crate) fn current_line(&self) -> Option<usize> {
        self.location.as_ref()?.line
    }

    pub(crate) fn current_address(&self) -> Option<u64> {
        self.location.as_ref()?.address
    }

    pub(crate) fn selected_frame(&self) -> Option<&StackFrame> {
        self.frames.get(self.selected)
    }

    /// Record a location known out-of-band, e.g. resolved from a
    /// breakpoint hit before any stack trace exists.
    pub(crate) fn set_location(&mut self, location: Location) {
        self.location = Some(location);
    }

    /// Install a fresh stack trace; selection resets to the innermost
    /// frame and the location follows it.
    pub(crate) fn set_frames(&mut self, frames: Vec<StackFrame>) {
        self.frames = frames;
        self.selected = 0;
        self.refresh_location();
    }

    /// Move the selection. Errors are user-facing diagnostics.
    pub(crate) fn select(&mut self, target: FrameTarget) -> Result<&StackFrame, String> {
        if self.frames.is_empty() {
            return Err("no stack trace available".to_string());
        }
        let level = match target {
            // "up" in the gdb sense: towards the outermost frame
            FrameTarget::Up => self.selected + 1,
            FrameTarget::Down => self
                .selected
                .checked_sub(1)
                .ok_or_else(|| "already at the innermost frame".to_string())?,
            FrameTarget::Level(level) => level,
        };
        if level >= self.frames.len() {
            return Err(format!(
                "no frame {level}: stack has {} frames",
                self.frames.len()
            ));
        }
        self.selected = level;
        self.refresh_location();
        Ok(&self.frames[self.selected])
    }

    fn refresh_location(&mut self) {
        let Some(frame) = self.frames.get(self.selected) else {
            self.location = None;
            return;
        };
        self.location = Some(Location {
            file: frame.source.as_ref().and_then(|s| s.path.clone()),
            line: Some(frame.line),
            address: frame.address(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::types::Source;

    fn frame(id: i64, file: &str, line: usize) -> StackFrame {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "name": format!("frame_{id}"),
            "line": line,
            "column": 1,
            "source": Source {
                name: Some(file.to_string()),
                path: Some(file.into()),
            },
        }))
        .unwrap()
    }

    #[test]
    fn selection_moves_and_updates_location() {
        let mut cache = FrameCache::default();
        cache.set_frames(vec![
            frame(1, "inner.adb", 10),
            frame(2, "middle.adb", 20),
            frame(3, "outer.adb", 30),
        ]);

        assert_eq!(cache.current_line(), Some(10));

        cache.select(FrameTarget::Up).unwrap();
        assert_eq!(cache.current_file().unwrap(), Path::new("middle.adb"));

        cache.select(FrameTarget::Level(2)).unwrap();
        assert_eq!(cache.current_line(), Some(30));

        cache.select(FrameTarget::Down).unwrap();
        cache.select(FrameTarget::Down).unwrap();
        assert_eq!(cache.current_line(), Some(10));
        assert!(cache.select(FrameTarget::Down).is_err());
    }

    #[test]
    fn out_of_range_selection_is_an_error() {
        let mut cache = FrameCache::default();
        cache.set_frames(vec![frame(1, "only.adb", 1)]);
        assert!(cache.select(FrameTarget::Level(4)).is_err());
        assert!(cache.select(FrameTarget::Up).is_err());
    }

    #[test]
    fn empty_cache_cannot_navigate() {
        let mut cache = FrameCache::default();
        assert!(cache.select(FrameTarget::Up).is_err());
    }

    #[test]
    fn out_of_band_location_before_any_stack_trace() {
        let mut cache = FrameCache::default();
        assert!(cache.location().is_none());

        cache.set_location(Location {
            file: Some("hit.adb".into()),
            line: Some(7),
            address: Some(0x4000),
        });
        assert!(cache.location().unwrap().has_source());
        assert!(cache.is_empty());
    }
}
