//! Command channel between the UI context and the player task.
//!
//! A [`CommandBus`] couples a bounded command queue with an acknowledgment
//! queue and a task-alive flag. The UI side holds a [`PlayerHandle`]; the
//! player side polls the bus once per decode-loop iteration.
//!
//! Delivery is best-effort by design: a full queue silently drops the
//! command, and the short acknowledgment wait is a pacing aid, not a
//! delivery guarantee. Callers that care re-send. [`PlayerHandle::terminate`]
//! is the one reliable operation — it blocks until the command is enqueued
//! and then waits for the task to die.

use core::sync::atomic::{AtomicBool, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{with_timeout, Duration, Timer};
use platform::config::{ACK_TIMEOUT_MS, CMD_QUEUE_DEPTH};

/// Control requests understood by the player task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Stop playback and exit the task.
    Terminate,
    /// Toggle between playing and paused.
    Pause,
    /// Skip to the next song.
    Next,
    /// Skip to the previous song.
    Prev,
    /// Tear down and re-create the output sink at the current sample rate.
    ReinitAudio,
    /// Cycle the loop mode.
    ToggleLoopMode,
}

/// Opaque token confirming that a command was processed.
#[derive(Debug, Clone, Copy)]
pub struct Ack;

/// The shared channel pair plus the task-alive flag.
///
/// Create one per player task, typically in a `static`.
pub struct CommandBus {
    commands: Channel<CriticalSectionRawMutex, Command, CMD_QUEUE_DEPTH>,
    acks: Channel<CriticalSectionRawMutex, Ack, CMD_QUEUE_DEPTH>,
    alive: AtomicBool,
}

impl CommandBus {
    /// Create an idle bus.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            commands: Channel::new(),
            acks: Channel::new(),
            alive: AtomicBool::new(false),
        }
    }

    /// UI-side handle for sending commands.
    pub fn handle(&self) -> PlayerHandle<'_> {
        PlayerHandle { bus: self }
    }

    /// Player side: take one pending command without blocking.
    pub fn poll(&self) -> Option<Command> {
        self.commands.try_receive().ok()
    }

    /// Player side: confirm that the last polled command was processed.
    ///
    /// Non-blocking; if nobody is waiting the token just sits in the queue
    /// until a later sender drains it.
    pub fn ack(&self) {
        let _ = self.acks.try_send(Ack);
    }

    /// Player side: publish whether the task is running.
    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Release);
    }

    /// Whether the player task is currently running.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

/// UI-side sender for player commands.
#[derive(Clone, Copy)]
pub struct PlayerHandle<'a> {
    bus: &'a CommandBus,
}

impl PlayerHandle<'_> {
    /// Send a command, best-effort.
    ///
    /// The enqueue never blocks; if the queue is full the command is
    /// dropped. The call then waits up to [`ACK_TIMEOUT_MS`] for an
    /// acknowledgment and returns either way — a timeout does not roll the
    /// send back, the command may still be applied later.
    ///
    /// Returns whether the command was enqueued. Note that `true` does not
    /// mean processed, and the acknowledgment that was awaited may belong
    /// to an earlier command.
    pub async fn send(&self, cmd: Command) -> bool {
        let enqueued = self.bus.commands.try_send(cmd).is_ok();
        #[cfg(feature = "defmt")]
        if !enqueued {
            defmt::warn!("command queue full, dropped {}", cmd);
        }
        let _ = with_timeout(
            Duration::from_millis(ACK_TIMEOUT_MS),
            self.bus.acks.receive(),
        )
        .await;
        enqueued
    }

    /// Shut the player task down and wait for it to exit.
    ///
    /// Blocks until the terminate command is enqueued, then polls the
    /// alive flag until the task has cleared it. Returns immediately if no
    /// task is running.
    pub async fn terminate(&self) {
        if !self.bus.is_alive() {
            return;
        }
        self.bus.commands.send(Command::Terminate).await;
        while self.bus.is_alive() {
            Timer::after_millis(ACK_TIMEOUT_MS).await;
        }
    }
}
