//! The one-way "end this process" effect.

/// Exit status for every watchdog-initiated termination.
pub const EXIT_SUCCESS: i32 = 0;

/// Ends the process once the shutdown sequence is done.
///
/// Production code uses [`ProcessExit`], which never returns. Other
/// implementations may return, in which case the watchdog stays stopped.
pub trait Terminator: Send + Sync + 'static {
    fn terminate(&self);
}

/// Exits the process with status 0.
///
/// Goes straight to `std::process::exit`, so there is no panic, no unwinding
/// and no backtrace: the exit reads as a clean stop in the host's logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl Terminator for ProcessExit {
    fn terminate(&self) {
        tracing::info!(status = EXIT_SUCCESS, "Scaling to zero, exiting");
        std::process::exit(EXIT_SUCCESS);
    }
}
