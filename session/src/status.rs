//! The debugger lifecycle status and its derived availability.

/// The canonical debugger lifecycle.
///
/// Variant order matters: `Ready..=Stopped` is the in-session range whose
/// boundaries gate user commands and whose exit clears the stopped-thread
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Status {
    /// The adapter has been spawned and `initialize` is in flight.
    Initialization,
    /// The adapter announced the `initialized` event; configuration is
    /// being sent.
    Initialized,
    /// Breakpoints are configured and the session accepts commands.
    Ready,
    /// The debuggee is executing.
    Running,
    /// At least one debuggee thread is halted.
    Stopped,
    /// Teardown has begun. Terminal: no further status change is
    /// observable.
    Terminating,
}

/// Coarse classification carried by the "state changed" notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Unavailable,
    Available,
    Busy,
}

impl Status {
    /// Whether the status lies in the `Ready..=Stopped` range.
    pub fn in_session_range(self) -> bool {
        (Status::Ready..=Status::Stopped).contains(&self)
    }

    /// Whether the lifecycle progressed past `Initialized` at this point.
    pub fn past_initialized(self) -> bool {
        self > Status::Initialized
    }

    pub fn availability(self) -> Availability {
        match self {
            Status::Initialization | Status::Initialized | Status::Terminating => {
                Availability::Unavailable
            }
            Status::Ready | Status::Stopped => Availability::Available,
            Status::Running => Availability::Busy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_range_covers_ready_running_stopped() {
        assert!(Status::Ready.in_session_range());
        assert!(Status::Running.in_session_range());
        assert!(Status::Stopped.in_session_range());
        assert!(!Status::Initialization.in_session_range());
        assert!(!Status::Initialized.in_session_range());
        assert!(!Status::Terminating.in_session_range());
    }

    #[test]
    fn availability_classification() {
        assert_eq!(Status::Initialization.availability(), Availability::Unavailable);
        assert_eq!(Status::Ready.availability(), Availability::Available);
        assert_eq!(Status::Running.availability(), Availability::Busy);
        assert_eq!(Status::Stopped.availability(), Availability::Available);
        assert_eq!(Status::Terminating.availability(), Availability::Unavailable);
    }

    #[test]
    fn terminating_is_past_initialized_but_ready_counts_too() {
        assert!(!Status::Initialization.past_initialized());
        assert!(!Status::Initialized.past_initialized());
        assert!(Status::Ready.past_initialized());
        assert!(Status::Terminating.past_initialized());
    }
}
