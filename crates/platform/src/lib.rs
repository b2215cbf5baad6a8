//! Hardware Abstraction Layer (HAL) for the pocketamp handheld player.
//!
//! This crate provides trait-based abstractions for every hardware
//! collaborator the playback core touches, enabling development and testing
//! without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate)
//!         ↓
//! Playback Core (playback crate)
//!         ↓
//! Platform HAL (this crate - trait abstractions)
//!         ↓
//! Hardware Layer (board support, out of tree)
//! ```
//!
//! # Abstraction seams
//!
//! - [`Storage`] / [`File`] — removable-media file system access and
//!   single-level directory listing
//! - [`AudioOutput`] — PCM output sink (I²S on hardware)
//! - [`MetadataSink`] — now-playing line on the status display
//! - [`KeypadSource`] — raw button sampling, filtered by [`Debouncer`]
//! - [`Watchdog`] — per-iteration liveness guard for the player task
//!
//! # Features
//!
//! - `std`: host-side implementations ([`storage_local`], [`mocks`])
//! - `defmt`: enable `defmt::Format` derives (hardware builds)

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(async_fn_in_trait)] // single-threaded executor: Send bounds not needed

pub mod audio;
pub mod config;
pub mod display;
pub mod input;
pub mod storage;
pub mod watchdog;

#[cfg(any(test, feature = "std"))]
pub mod mocks;
#[cfg(any(test, feature = "std"))]
pub mod storage_local;

// Re-export main high-level traits
pub use audio::{AudioConfig, AudioOutput, VolumeControl};
pub use display::MetadataSink;
pub use input::{Debouncer, KeyEdges, KeypadSource};
pub use storage::{sort_entries, DirListing, Entry, EntryKind, File, Storage};
pub use watchdog::{NoopWatchdog, Watchdog};

#[cfg(any(test, feature = "std"))]
pub use storage_local::LocalStorage;
