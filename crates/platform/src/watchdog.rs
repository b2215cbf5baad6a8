//! Liveness guard for the player task.

/// Per-iteration liveness guard.
///
/// The player task feeds the watchdog once per decode-loop iteration. An
/// implementation that stops being fed past its timeout resets the whole
/// device; that is the intended last-resort recovery, not an error path
/// the core ever handles.
pub trait Watchdog {
    /// Reset the guard's timeout.
    fn feed(&mut self);
}

/// A watchdog that never bites. For hosts and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWatchdog;

impl Watchdog for NoopWatchdog {
    fn feed(&mut self) {}
}
