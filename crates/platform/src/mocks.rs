//! Mock implementations of the platform traits.
//!
//! Used by unit and integration tests across the workspace, and available
//! to downstream crates through the `std` feature.

use std::collections::VecDeque;
use std::string::String as StdString;
use std::vec::Vec as StdVec;

use heapless::String;

use crate::audio::AudioOutput;
use crate::display::MetadataSink;
use crate::input::KeypadSource;
use crate::storage::{sort_entries, DirListing, Entry, EntryKind, File, Storage};
use crate::watchdog::Watchdog;

/// Error type shared by the storage mocks.
#[derive(Debug, PartialEq, Eq)]
pub enum MockStorageError {
    /// No file with the requested path.
    NotFound,
}

/// An in-memory file.
#[derive(Debug)]
pub struct MemFile {
    data: StdVec<u8>,
    pos: usize,
}

impl MemFile {
    /// Create a file over the given bytes, positioned at the start.
    #[must_use]
    pub fn new(data: impl Into<StdVec<u8>>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
        }
    }
}

impl File for MemFile {
    type Error = MockStorageError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let remaining = self.data.len().saturating_sub(self.pos);
        let n = remaining.min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    async fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        self.pos = usize::try_from(pos)
            .unwrap_or(usize::MAX)
            .min(self.data.len());
        Ok(self.pos as u64)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// In-memory [`Storage`] holding a flat set of named files.
#[derive(Default)]
pub struct MockStorage {
    files: StdVec<(StdString, StdVec<u8>)>,
}

impl MockStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file under `name` (no directory components).
    pub fn add_file(&mut self, name: &str, data: impl Into<StdVec<u8>>) {
        self.files.push((StdString::from(name), data.into()));
    }
}

impl Storage for MockStorage {
    type Error = MockStorageError;
    type File = MemFile;

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let name = path.trim_start_matches('/');
        self.files
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| MemFile::new(data.clone()))
            .ok_or(MockStorageError::NotFound)
    }

    async fn read_dir(&mut self, _path: &str) -> Result<DirListing, Self::Error> {
        let mut listing = DirListing::new();
        for (name, data) in &self.files {
            let Ok(name) = String::try_from(name.as_str()) else {
                continue;
            };
            let entry = Entry {
                name,
                size: data.len() as u64,
                kind: EntryKind::File,
                mtime: 0,
            };
            if listing.push(entry).is_err() {
                break;
            }
        }
        sort_entries(&mut listing);
        Ok(listing)
    }
}

/// Error type for [`MockAudio`].
#[derive(Debug, PartialEq, Eq)]
pub enum MockAudioError {
    /// `submit` was called while the output path was down.
    NotStarted,
}

/// Recording [`AudioOutput`] stub.
#[derive(Default)]
pub struct MockAudio {
    /// Sample rates passed to `start`, in order.
    pub started_rates: StdVec<u32>,
    /// Total frames accepted.
    pub frames_accepted: usize,
    /// Number of `submit` calls.
    pub submissions: usize,
    /// Number of `shutdown` calls.
    pub shutdowns: usize,
    /// Whether the output path is currently up.
    pub running: bool,
}

impl MockAudio {
    /// Create a stopped sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioOutput for MockAudio {
    type Error = MockAudioError;

    async fn start(&mut self, sample_rate: u32) -> Result<(), Self::Error> {
        self.started_rates.push(sample_rate);
        self.running = true;
        Ok(())
    }

    async fn shutdown(&mut self) {
        self.shutdowns += 1;
        self.running = false;
    }

    async fn submit(&mut self, _buf: &mut [i16], n_frames: usize) -> Result<(), Self::Error> {
        if !self.running {
            return Err(MockAudioError::NotStarted);
        }
        self.submissions += 1;
        self.frames_accepted += n_frames;
        // A real sink blocks on the hardware here; yielding keeps the
        // single-threaded test executor fair.
        embassy_futures::yield_now().await;
        Ok(())
    }

    async fn pause(&mut self) -> Result<(), Self::Error> {
        self.running = false;
        Ok(())
    }

    async fn resume(&mut self) -> Result<(), Self::Error> {
        self.running = true;
        Ok(())
    }

    async fn set_rate(&mut self, config: crate::audio::AudioConfig) -> Result<(), Self::Error> {
        self.started_rates.push(config.sample_rate);
        Ok(())
    }
}

/// Recording [`MetadataSink`] stub.
#[derive(Default)]
pub struct MockDisplay {
    /// `(title, artist)` pairs in the order they were shown.
    pub now_playing: StdVec<(StdString, StdString)>,
}

impl MockDisplay {
    /// Create an empty display.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataSink for MockDisplay {
    async fn set_now_playing(&mut self, title: &str, artist: &str) {
        self.now_playing
            .push((StdString::from(title), StdString::from(artist)));
    }
}

/// Scripted [`KeypadSource`].
///
/// Returns the scripted samples in order, then `idle` forever.
pub struct MockKeypad {
    script: VecDeque<u16>,
    idle: u16,
}

impl MockKeypad {
    /// Create a keypad that plays back `samples`, then rests at 0.
    #[must_use]
    pub fn script(samples: &[u16]) -> Self {
        Self {
            script: samples.iter().copied().collect(),
            idle: 0,
        }
    }
}

impl KeypadSource for MockKeypad {
    async fn sample(&mut self) -> u16 {
        self.script.pop_front().unwrap_or(self.idle)
    }
}

/// Counting [`Watchdog`].
#[derive(Debug, Default)]
pub struct MockWatchdog {
    /// Number of times the guard was fed.
    pub feeds: usize,
}

impl Watchdog for MockWatchdog {
    fn feed(&mut self) {
        self.feeds += 1;
    }
}
