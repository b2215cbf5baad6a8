//! Local filesystem [`Storage`] implementation for desktop use.
//!
//! `LocalStorage` implements the storage seam with `std::fs`, so the whole
//! player stack can run against a directory of music files on a development
//! machine. All paths are resolved relative to the root provided at
//! construction; a leading `/` is ignored so that device-style absolute
//! paths ("/sdcard/audio/x.mp3") resolve under the local root too.

use std::fs;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::time::UNIX_EPOCH;

use heapless::String;

use crate::storage::{sort_entries, DirListing, Entry, EntryKind, File, Storage};

/// Error type for local filesystem operations.
#[derive(Debug)]
pub struct LocalStorageError(pub std::io::Error);

impl core::fmt::Display for LocalStorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "local storage error: {}", self.0)
    }
}

impl std::error::Error for LocalStorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// An open file on the local filesystem.
pub struct LocalFile {
    inner: fs::File,
    size: u64,
}

impl File for LocalFile {
    type Error = LocalStorageError;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        Read::read(&mut self.inner, buf).map_err(LocalStorageError)
    }

    async fn seek(&mut self, pos: u64) -> Result<u64, Self::Error> {
        Seek::seek(&mut self.inner, SeekFrom::Start(pos)).map_err(LocalStorageError)
    }

    fn size(&self) -> u64 {
        self.size
    }
}

/// A [`Storage`] implementation backed by `std::fs`.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    /// Create a new storage rooted at `root`.
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self {
            root: PathBuf::from(root),
        }
    }

    /// Create from the `MUSIC_PATH` environment variable.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        std::env::var("MUSIC_PATH").ok().map(|p| Self::new(&p))
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

impl Storage for LocalStorage {
    type Error = LocalStorageError;
    type File = LocalFile;

    async fn open_file(&mut self, path: &str) -> Result<Self::File, Self::Error> {
        let full = self.resolve(path);
        let file = fs::File::open(&full).map_err(LocalStorageError)?;
        let meta = file.metadata().map_err(LocalStorageError)?;
        Ok(LocalFile {
            inner: file,
            size: meta.len(),
        })
    }

    async fn read_dir(&mut self, path: &str) -> Result<DirListing, Self::Error> {
        let mut listing = DirListing::new();
        for dirent in fs::read_dir(self.resolve(path)).map_err(LocalStorageError)? {
            let dirent = dirent.map_err(LocalStorageError)?;
            let os_name = dirent.file_name();
            // Non-UTF-8 names and names over the fixed capacity cannot be
            // addressed through the bounded path type; they are not listed.
            let Some(name) = os_name.to_str().and_then(|n| String::try_from(n).ok()) else {
                continue;
            };
            let meta = dirent.metadata().map_err(LocalStorageError)?;
            let kind = if meta.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };
            let mtime = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |d| d.as_secs());
            let entry = Entry {
                name,
                size: meta.len(),
                kind,
                mtime,
            };
            if listing.push(entry).is_err() {
                // Listing capacity reached; deliver the bounded prefix.
                break;
            }
        }
        sort_entries(&mut listing);
        Ok(listing)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn read_full_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("test.bin"), b"hello world").unwrap();
        let mut storage = LocalStorage::new(tmp.path().to_str().unwrap());
        let mut file = storage.open_file("test.bin").await.unwrap();
        let mut buf = [0u8; 11];
        let n = file.read(&mut buf).await.unwrap();
        assert_eq!(n, 11);
        assert_eq!(&buf, b"hello world");
    }

    #[tokio::test]
    async fn size_matches() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("size.bin"), [0u8; 64]).unwrap();
        let mut storage = LocalStorage::new(tmp.path().to_str().unwrap());
        let file = storage.open_file("size.bin").await.unwrap();
        assert_eq!(file.size(), 64);
    }

    #[tokio::test]
    async fn seek_and_read() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("seek.bin"), b"ABCDEFGH").unwrap();
        let mut storage = LocalStorage::new(tmp.path().to_str().unwrap());
        let mut file = storage.open_file("seek.bin").await.unwrap();
        file.seek(4).await.unwrap();
        let mut buf = [0u8; 4];
        file.read(&mut buf).await.unwrap();
        assert_eq!(&buf, b"EFGH");
    }

    #[tokio::test]
    async fn device_style_absolute_path_resolves_under_root() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("song.mp3"), b"x").unwrap();
        let mut storage = LocalStorage::new(tmp.path().to_str().unwrap());
        assert!(storage.open_file("/song.mp3").await.is_ok());
    }

    #[tokio::test]
    async fn read_dir_is_sorted_dirs_first() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("b.txt"), b"").unwrap();
        fs::write(tmp.path().join("c.txt"), b"").unwrap();
        fs::create_dir(tmp.path().join("a")).unwrap();
        let mut storage = LocalStorage::new(tmp.path().to_str().unwrap());
        let listing = storage.read_dir("").await.unwrap();
        let names: Vec<&str> = listing.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["a", "b.txt", "c.txt"]);
        assert!(listing[0].is_dir());
    }

    #[tokio::test]
    async fn read_dir_missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut storage = LocalStorage::new(tmp.path().to_str().unwrap());
        assert!(storage.read_dir("no-such-dir").await.is_err());
    }
}
