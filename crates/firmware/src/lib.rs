//! Application wiring for the pocketamp handheld player.
//!
//! The platform crate abstracts the hardware and the playback crate owns
//! the engine; this crate connects them: the debounced keypad task that
//! turns button edges into player commands, the button→command map, and
//! host-side sink implementations for the desktop emulator.

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod control;
pub mod input;

#[cfg(feature = "emulator")]
pub mod host;

pub use control::{command_for, volume_delta, VOLUME_STEP};
pub use input::input_task;
