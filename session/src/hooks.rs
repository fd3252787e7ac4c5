//! The lifecycle notification seam.
//!
//! The host application's action/hook system is an external collaborator;
//! the session calls into it through this trait and never the other way
//! around. All methods have no-op defaults so hosts implement only what
//! they surface.

use crate::console::SharedConsole;
use crate::stack::Location;
use crate::status::{Availability, Status};

pub trait SessionHooks: Send {
    /// The session finished configuration and is ready for commands.
    /// Fired once per session.
    fn debugger_started(&mut self) {}

    /// The debuggee reached its first stop after launch. Fired once.
    fn debuggee_started(&mut self) {}

    /// The debuggee halted.
    fn process_stopped(&mut self) {}

    /// The current source location changed (stop, frame selection).
    fn location_changed(&mut self, _location: &Location) {}

    /// The debuggee exited or the adapter reported termination. Fired at
    /// most once even when the adapter sends both `exited` and
    /// `terminated`.
    fn debuggee_terminated(&mut self) {}

    /// Session teardown began after the debugger had fully started.
    fn debugger_terminated(&mut self) {}

    /// Fired on every status transition with the coarse availability the
    /// host uses to enable or grey out actions.
    fn state_changed(&mut self, _status: Status, _availability: Availability) {}

    /// Asked once, when the session enters `Ready`, for a console to
    /// carry debuggee output. `None` routes debuggee output to the
    /// debugger console.
    fn create_debuggee_console(&mut self) -> Option<SharedConsole> {
        None
    }
}

/// Hooks that ignore every notification.
pub struct NullHooks;

impl SessionHooks for NullHooks {}
