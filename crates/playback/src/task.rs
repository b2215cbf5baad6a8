//! The player task: a decode/output loop wrapped around [`PlayerState`].
//!
//! One task owns the playlist and all playback state; nothing outside ever
//! touches them. Control flows in through the [`CommandBus`] only, PCM
//! flows out through the [`AudioOutput`] sink, and the now-playing line
//! goes to the display under its own lock. Decode and open failures skip
//! to the next song instead of stopping playback.
//!
//! Run [`run_player`] as a dedicated task pinned to the audio core; on the
//! desktop it runs under any async executor.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Timer;
use platform::audio::AudioOutput;
use platform::config::{AUDIO_BUFFER_SAMPLES, INTER_SONG_DELAY_MS, PAUSE_POLL_MS};
use platform::display::MetadataSink;
use platform::storage::Storage;
use platform::watchdog::Watchdog;
use thiserror_no_std::Error;

use crate::codec::Codec;
use crate::command::{Command, CommandBus};
use crate::decoder::{AudioInfo, SongDecoder};
use crate::metadata::read_tags;
use crate::playlist::{Completion, LoopMode, Playlist, PlaylistError, Song};

/// Shown when neither the tag nor the filename yields an artist.
const UNKNOWN_ARTIST: &str = "Unknown Artist";

/// What to play and where to start.
#[derive(Debug, Clone, Copy)]
pub struct StartParams<'a> {
    /// Directory to scan for songs.
    pub root: &'a str,
    /// Listing index of the entry the user selected.
    pub selected: usize,
    /// Play every file in the directory, or just the selected one.
    pub play_all: bool,
}

impl<'a> StartParams<'a> {
    /// Play everything under `root`, starting at the first song.
    #[must_use]
    pub fn play_all_from(root: &'a str) -> Self {
        Self {
            root,
            selected: 0,
            play_all: true,
        }
    }
}

/// Failures that prevent playback from starting at all.
///
/// Everything after a successful start is skip-and-continue.
#[derive(Debug, Error)]
pub enum StartError<E: core::fmt::Debug> {
    /// The music directory could not be listed.
    #[error("could not list the music directory")]
    Storage(E),
    /// The listing produced no usable playlist.
    #[error("could not build a playlist")]
    Playlist(PlaylistError),
}

/// Why `play_song` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayResult {
    /// The decoder reached the end of the stream.
    Done,
    /// A Next command arrived.
    NextSong,
    /// A Prev command arrived.
    PrevSong,
    /// The song could not be opened or decoded.
    Error,
    /// A Terminate command arrived.
    Stop,
}

/// Playback flags owned by the task. The playlist travels next to this.
struct PlayerState {
    playing: bool,
    mode: LoopMode,
}

/// Drive playback until terminated.
///
/// Builds the playlist from `params`, then loops: publish metadata, open
/// the current song, decode and submit chunk by chunk while polling the
/// command bus, and resolve the next index from the loop mode and the
/// completion reason. The alive flag on `bus` is set for the whole run so
/// [`crate::command::PlayerHandle::terminate`] can synchronise on exit.
///
/// # Errors
///
/// Returns a [`StartError`] when the directory cannot be listed or no
/// playlist can be built; in that case nothing was played.
pub async fn run_player<S, A, D, W>(
    bus: &CommandBus,
    storage: &mut S,
    audio: &mut A,
    display: &Mutex<CriticalSectionRawMutex, D>,
    watchdog: &mut W,
    params: StartParams<'_>,
) -> Result<(), StartError<S::Error>>
where
    S: Storage,
    A: AudioOutput,
    D: MetadataSink,
    W: Watchdog,
{
    bus.set_alive(true);
    let result = player_main(bus, storage, audio, display, watchdog, params).await;
    bus.set_alive(false);
    result
}

async fn player_main<S, A, D, W>(
    bus: &CommandBus,
    storage: &mut S,
    audio: &mut A,
    display: &Mutex<CriticalSectionRawMutex, D>,
    watchdog: &mut W,
    params: StartParams<'_>,
) -> Result<(), StartError<S::Error>>
where
    S: Storage,
    A: AudioOutput,
    D: MetadataSink,
    W: Watchdog,
{
    let entries = storage
        .read_dir(params.root)
        .await
        .map_err(StartError::Storage)?;
    let mut playlist = if params.play_all {
        Playlist::play_all(&entries, params.root, params.selected)
    } else {
        let entry = entries
            .get(params.selected)
            .ok_or(StartError::Playlist(PlaylistError::NoPlayableFiles))?;
        Playlist::single(entry, params.root)
    }
    .map_err(StartError::Playlist)?;
    drop(entries);

    #[cfg(feature = "defmt")]
    defmt::info!("playing playlist of length {}", playlist.len());

    let mut state = PlayerState {
        playing: false,
        mode: LoopMode::Normal,
    };
    let mut pcm = [0i16; AUDIO_BUFFER_SAMPLES];

    loop {
        let result = play_song(
            bus,
            storage,
            audio,
            display,
            watchdog,
            &mut state,
            playlist.current(),
            &mut pcm,
        )
        .await;

        let completion = match result {
            PlayResult::Stop => break,
            PlayResult::Done => Completion::NaturalEnd,
            PlayResult::NextSong => Completion::Next,
            PlayResult::PrevSong => Completion::Prev,
            PlayResult::Error => Completion::DecodeError,
        };
        playlist.advance(state.mode, completion);
        Timer::after_millis(INTER_SONG_DELAY_MS).await;
    }
    Ok(())
}

/// Play one song to completion, skip, error, or terminate.
#[allow(clippy::too_many_arguments)]
async fn play_song<S, A, D, W>(
    bus: &CommandBus,
    storage: &mut S,
    audio: &mut A,
    display: &Mutex<CriticalSectionRawMutex, D>,
    watchdog: &mut W,
    state: &mut PlayerState,
    song: &Song,
    pcm: &mut [i16],
) -> PlayResult
where
    S: Storage,
    A: AudioOutput,
    D: MetadataSink,
    W: Watchdog,
{
    publish_metadata(storage, display, song).await;

    let file = match storage.open_file(&song.path).await {
        Ok(file) => file,
        Err(_err) => {
            #[cfg(feature = "defmt")]
            defmt::error!("could not open {}, skipping", song.path.as_str());
            return PlayResult::Error;
        }
    };
    let mut decoder = match SongDecoder::open(song.codec, file).await {
        Ok(decoder) => decoder,
        Err(_err) => {
            #[cfg(feature = "defmt")]
            defmt::error!("could not decode {}, skipping", song.path.as_str());
            return PlayResult::Error;
        }
    };
    let info = decoder.info();
    if audio.start(info.sample_rate).await.is_err() {
        return PlayResult::Error;
    }

    state.playing = true;
    let mut result = PlayResult::Done;
    let mut frames: i32 = 1;
    loop {
        watchdog.feed();

        if let Some(cmd) = bus.poll() {
            result = handle_cmd(state, audio, info, cmd, bus).await;
            if result != PlayResult::Done {
                break;
            }
        }

        if state.playing {
            frames = decoder.decode(pcm).await;
            if frames > 0 {
                #[allow(clippy::cast_sign_loss)]
                if audio.submit(pcm, frames as usize).await.is_err() {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("output sink rejected a buffer");
                }
            }
        } else {
            Timer::after_millis(PAUSE_POLL_MS).await;
        }

        // End of stream and decode failure share this exit; the index
        // resolution decides what happens next in either case.
        if frames <= 0 {
            break;
        }
    }

    if state.playing {
        audio.shutdown().await;
    }
    result
}

/// Apply one command. Commands that end the current song are returned as
/// the corresponding [`PlayResult`]; everything else reports `Done`.
async fn handle_cmd<A: AudioOutput>(
    state: &mut PlayerState,
    audio: &mut A,
    info: AudioInfo,
    cmd: Command,
    bus: &CommandBus,
) -> PlayResult {
    #[cfg(feature = "defmt")]
    defmt::info!("received cmd: {}", cmd);
    let result = match cmd {
        Command::Pause => {
            state.playing = !state.playing;
            if state.playing {
                let _ = audio.start(info.sample_rate).await;
            } else {
                audio.shutdown().await;
            }
            PlayResult::Done
        }
        Command::ReinitAudio => {
            if state.playing {
                audio.shutdown().await;
            }
            let _ = audio.start(info.sample_rate).await;
            PlayResult::Done
        }
        Command::ToggleLoopMode => {
            state.mode = state.mode.cycle();
            PlayResult::Done
        }
        Command::Terminate => PlayResult::Stop,
        Command::Next => PlayResult::NextSong,
        Command::Prev => PlayResult::PrevSong,
    };
    bus.ack();
    result
}

/// Push the song's tags (MP3) or its filename to the display.
///
/// Tag extraction failures degrade to the filename and a stock artist
/// line; the display lock is held only for the actual update.
async fn publish_metadata<S, D>(
    storage: &mut S,
    display: &Mutex<CriticalSectionRawMutex, D>,
    song: &Song,
) where
    S: Storage,
    D: MetadataSink,
{
    let mut tags = crate::metadata::TrackTags::default();
    if song.codec == Codec::Mp3 {
        if let Ok(mut file) = storage.open_file(&song.path).await {
            tags = read_tags(&mut file).await;
        }
    }
    let title: &str = if tags.title.is_empty() {
        song.filename.as_str()
    } else {
        tags.title.as_str()
    };
    let artist: &str = if tags.artist.is_empty() {
        UNKNOWN_ARTIST
    } else {
        tags.artist.as_str()
    };
    let mut sink = display.lock().await;
    sink.set_now_playing(title, artist).await;
}
