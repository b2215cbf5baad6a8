//! Storage abstraction for file systems on removable media.
//!
//! The playback core never touches a file system driver directly; it goes
//! through [`Storage`] for opening files and listing one directory level,
//! and through [`File`] for positioned reads.

use core::cmp::Ordering;

use heapless::{String, Vec};

use crate::config::{MAX_DIR_ENTRIES, MAX_NAME};

/// What kind of object a directory entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EntryKind {
    /// A regular file.
    File,
    /// A subdirectory.
    Dir,
}

/// One item of a directory listing.
#[derive(Debug, Clone)]
pub struct Entry {
    /// File name, without any path components.
    pub name: String<MAX_NAME>,
    /// Size in bytes (0 when the file system does not report it cheaply).
    pub size: u64,
    /// Regular file or directory.
    pub kind: EntryKind,
    /// Modification time in Unix seconds (0 when unavailable).
    pub mtime: u64,
}

impl Entry {
    /// `true` when this entry is a subdirectory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// A bounded directory listing.
pub type DirListing = Vec<Entry, MAX_DIR_ENTRIES>;

/// Storage trait for file system access.
pub trait Storage {
    /// Error type.
    type Error: core::fmt::Debug;
    /// File type.
    type File: File;

    /// Open a file for reading.
    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error>;

    /// List one directory level.
    ///
    /// Implementations must exclude `.` and `..`, must not recurse, and must
    /// return the entries ordered by [`sort_entries`]. Listings larger than
    /// the [`DirListing`] capacity are truncated.
    async fn read_dir(&mut self, path: &str) -> Result<DirListing, Self::Error>;
}

/// File trait for reading files.
pub trait File {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Read from the current position; returns the number of bytes read
    /// (0 at end of file).
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Seek to an absolute position from the start of the file.
    async fn seek(&mut self, pos: u64) -> Result<u64, Self::Error>;

    /// File size in bytes.
    fn size(&self) -> u64;
}

/// Order a listing the way the browser and the playlist expect it:
/// directories before files, then names ascending, case-insensitively.
pub fn sort_entries(entries: &mut DirListing) {
    entries.sort_unstable_by(|a, b| {
        b.is_dir()
            .cmp(&a.is_dir())
            .then_with(|| name_cmp(&a.name, &b.name))
    });
}

/// Case-insensitive name collation, with a raw comparison as tie-break so
/// that names differing only in case still order deterministically.
fn name_cmp(a: &str, b: &str) -> Ordering {
    let folded_a = a.chars().flat_map(char::to_lowercase);
    let folded_b = b.chars().flat_map(char::to_lowercase);
    folded_a.cmp(folded_b).then_with(|| a.cmp(b))
}
