//! Playback engine for the pocketamp handheld player.
//!
//! Everything between "the user picked a directory" and "PCM is leaving
//! the output sink" lives here:
//!
//! - [`codec`] — file extension → codec selection
//! - [`playlist`] — bounded song list, build modes, index resolution
//! - [`command`] — UI→player command queue with acknowledgments
//! - [`metadata`] — ID3v2 title/artist/album extraction
//! - [`decoder`] — per-codec open/decode (WAV built in, MP3 via `mp3`)
//! - [`task`] — the player task state machine and decode loop
//!
//! The crate is `no_std` and allocation-free; it talks to hardware only
//! through the `platform` trait seams, so the entire engine runs unchanged
//! on the device, in the desktop emulator, and under host tests.

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod command;
pub mod decoder;
pub mod metadata;
pub mod playlist;
pub mod task;

pub use codec::Codec;
pub use command::{Command, CommandBus, PlayerHandle};
pub use decoder::{AudioInfo, DecodeError, SongDecoder};
pub use metadata::TrackTags;
pub use playlist::{Completion, LoopMode, Playlist, PlaylistError, Song};
pub use task::{run_player, StartError, StartParams};
