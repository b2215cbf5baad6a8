//! Playlist construction and index resolution.
//!
//! A playlist is built once from a directory listing, owns its songs in a
//! fixed-capacity vector, and is consumed exclusively by the player task.

use heapless::{String, Vec};
use platform::config::{MAX_NAME, MAX_PATH, MAX_SONGS};
use platform::storage::Entry;
use thiserror_no_std::Error;

use crate::codec::Codec;

/// One playable file.
#[derive(Debug, Clone)]
pub struct Song {
    /// File name, as shown in the UI.
    pub filename: String<MAX_NAME>,
    /// Full path handed to the storage layer.
    pub path: String<MAX_PATH>,
    /// Codec resolved from the extension.
    pub codec: Codec,
}

/// Loop behavior applied when a song completes naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopMode {
    /// Step through the playlist, wrapping at the end.
    #[default]
    Normal,
    /// Repeat the current song.
    RepeatSong,
    /// Step through the playlist, wrapping at the end.
    RepeatPlaylist,
}

impl LoopMode {
    /// Cycle Normal → RepeatSong → RepeatPlaylist → Normal.
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            Self::Normal => Self::RepeatSong,
            Self::RepeatSong => Self::RepeatPlaylist,
            Self::RepeatPlaylist => Self::Normal,
        }
    }
}

/// Why the current song stopped playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Completion {
    /// The decoder reported end of stream.
    NaturalEnd,
    /// The user skipped forward.
    Next,
    /// The user skipped backward.
    Prev,
    /// The decoder could not open or play the file.
    DecodeError,
}

/// Errors from playlist construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlaylistError {
    /// No entry resolved to a supported codec.
    #[error("no playable files")]
    NoPlayableFiles,
    /// The songs or their paths exceed the fixed capacities.
    #[error("playlist storage exhausted")]
    Capacity,
}

/// Resolve the playlist index that follows `index`.
///
/// `len` must be non-zero; callers guarantee a non-empty playlist before
/// entering the playback loop.
///
/// Repeat-song only pins the index for a natural completion — an explicit
/// skip always moves, and a decode error always force-advances by one so a
/// broken file is never retried forever.
pub fn next_index(index: usize, len: usize, mode: LoopMode, completion: Completion) -> usize {
    debug_assert!(len > 0, "index resolution on an empty playlist");
    match completion {
        Completion::NaturalEnd if mode == LoopMode::RepeatSong => index,
        Completion::NaturalEnd | Completion::Next | Completion::DecodeError => (index + 1) % len,
        Completion::Prev => (index + len - 1) % len,
    }
}

/// Ordered, bounded sequence of songs plus the current position.
#[derive(Debug)]
pub struct Playlist {
    songs: Vec<Song, MAX_SONGS>,
    index: usize,
}

impl Playlist {
    /// Build a playlist from every playable entry of a directory listing,
    /// preserving scan order.
    ///
    /// `selected` is the listing index of the entry the user picked; the
    /// playlist starts at that song. Directories and entries without a
    /// supported extension are filtered out.
    pub fn play_all(entries: &[Entry], cwd: &str, selected: usize) -> Result<Self, PlaylistError> {
        let mut songs: Vec<Song, MAX_SONGS> = Vec::new();
        let mut start = 0;
        for (i, entry) in entries.iter().enumerate() {
            if entry.is_dir() {
                continue;
            }
            let Some(codec) = Codec::from_filename(&entry.name) else {
                continue;
            };
            if i == selected {
                start = songs.len();
            }
            let song = make_song(entry, cwd, codec)?;
            songs.push(song).map_err(|_| PlaylistError::Capacity)?;
        }
        if songs.is_empty() {
            return Err(PlaylistError::NoPlayableFiles);
        }
        Ok(Self {
            songs,
            index: start,
        })
    }

    /// Build a one-song playlist from exactly one entry.
    pub fn single(entry: &Entry, cwd: &str) -> Result<Self, PlaylistError> {
        let codec = Codec::from_filename(&entry.name).ok_or(PlaylistError::NoPlayableFiles)?;
        let mut songs: Vec<Song, MAX_SONGS> = Vec::new();
        songs
            .push(make_song(entry, cwd, codec)?)
            .map_err(|_| PlaylistError::Capacity)?;
        Ok(Self { songs, index: 0 })
    }

    /// Number of songs.
    pub fn len(&self) -> usize {
        self.songs.len()
    }

    /// `true` when the playlist holds no songs. Construction guarantees it
    /// never does; this exists for completeness.
    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }

    /// Current position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The song at the current position.
    pub fn current(&self) -> &Song {
        // Invariant: 0 <= index < len whenever len > 0, and construction
        // rejects empty playlists.
        &self.songs[self.index]
    }

    /// Move the position according to the loop mode and completion reason.
    pub fn advance(&mut self, mode: LoopMode, completion: Completion) {
        self.index = next_index(self.index, self.songs.len(), mode, completion);
    }
}

fn make_song(entry: &Entry, cwd: &str, codec: Codec) -> Result<Song, PlaylistError> {
    let mut path: String<MAX_PATH> = String::new();
    path.push_str(cwd).map_err(|_| PlaylistError::Capacity)?;
    path.push('/').map_err(|_| PlaylistError::Capacity)?;
    path.push_str(&entry.name)
        .map_err(|_| PlaylistError::Capacity)?;
    Ok(Song {
        filename: entry.name.clone(),
        path,
        codec,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use platform::storage::EntryKind;

    fn file(name: &str) -> Entry {
        Entry {
            name: String::try_from(name).unwrap(),
            size: 0,
            kind: EntryKind::File,
            mtime: 0,
        }
    }

    fn dir(name: &str) -> Entry {
        Entry {
            kind: EntryKind::Dir,
            ..file(name)
        }
    }

    #[test]
    fn play_all_filters_and_preserves_order() {
        let entries = [
            dir("albums"),
            file("1.mp3"),
            file("cover.jpg"),
            file("2.ogg"),
            file("notes.txt"),
            file("3.flac"),
        ];
        let playlist = Playlist::play_all(&entries, "/sdcard/audio", 0).unwrap();
        assert_eq!(playlist.len(), 3);
        assert_eq!(playlist.current().filename.as_str(), "1.mp3");
        assert_eq!(playlist.current().path.as_str(), "/sdcard/audio/1.mp3");
    }

    #[test]
    fn play_all_maps_selected_entry_to_playlist_slot() {
        let entries = [file("a.txt"), file("b.mp3"), file("c.txt"), file("d.wav")];
        // Listing index 3 ("d.wav") is playlist slot 1.
        let playlist = Playlist::play_all(&entries, "/m", 3).unwrap();
        assert_eq!(playlist.index(), 1);
        assert_eq!(playlist.current().filename.as_str(), "d.wav");
    }

    #[test]
    fn play_all_with_nothing_playable_fails() {
        let entries = [file("a.txt"), dir("b")];
        assert_eq!(
            Playlist::play_all(&entries, "/m", 0).unwrap_err(),
            PlaylistError::NoPlayableFiles
        );
    }

    #[test]
    fn single_requires_a_supported_codec() {
        assert!(Playlist::single(&file("x.wav"), "/m").is_ok());
        assert_eq!(
            Playlist::single(&file("x.doc"), "/m").unwrap_err(),
            PlaylistError::NoPlayableFiles
        );
    }

    #[test]
    fn overlong_paths_report_capacity() {
        let long = "a".repeat(60);
        let entries = [file(&format!("{long}.mp3"))];
        let deep_cwd = "/".repeat(100);
        assert_eq!(
            Playlist::play_all(&entries, &deep_cwd, 0).unwrap_err(),
            PlaylistError::Capacity
        );
    }

    #[test]
    fn next_wraps_at_the_end() {
        assert_eq!(next_index(2, 3, LoopMode::Normal, Completion::Next), 0);
    }

    #[test]
    fn prev_wraps_at_the_start() {
        assert_eq!(next_index(0, 3, LoopMode::Normal, Completion::Prev), 2);
    }

    #[test]
    fn repeat_song_pins_natural_end_only() {
        assert_eq!(
            next_index(1, 3, LoopMode::RepeatSong, Completion::NaturalEnd),
            1
        );
        assert_eq!(next_index(1, 3, LoopMode::RepeatSong, Completion::Next), 2);
        assert_eq!(next_index(1, 3, LoopMode::RepeatSong, Completion::Prev), 0);
    }

    #[test]
    fn decode_error_always_advances_by_one() {
        for mode in [LoopMode::Normal, LoopMode::RepeatSong, LoopMode::RepeatPlaylist] {
            assert_eq!(next_index(1, 3, mode, Completion::DecodeError), 2);
            assert_eq!(next_index(2, 3, mode, Completion::DecodeError), 0);
        }
    }

    #[test]
    fn natural_end_advances_in_normal_mode() {
        // Playlist ["1.mp3", "2.mp3", "3.mp3"], song 3 ends: back to the top.
        assert_eq!(
            next_index(2, 3, LoopMode::Normal, Completion::NaturalEnd),
            0
        );
    }

    #[test]
    fn loop_mode_cycles_through_all_three() {
        let mut mode = LoopMode::Normal;
        mode = mode.cycle();
        assert_eq!(mode, LoopMode::RepeatSong);
        mode = mode.cycle();
        assert_eq!(mode, LoopMode::RepeatPlaylist);
        mode = mode.cycle();
        assert_eq!(mode, LoopMode::Normal);
    }
}
