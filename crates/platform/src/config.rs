//! Application-wide configuration constants.
//!
//! One place for every tunable the firmware bakes in at compile time.
//! Values that describe hardware pins or bus addresses live with the board
//! support code, not here.

/// Default output sample rate in Hz, used until the first song reports its own.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Software volume applied at boot, in percent.
pub const DEFAULT_VOLUME: u8 = 20;

/// Directory scanned for playable files on the removable card.
pub const MUSIC_ROOT: &str = "/sdcard/audio";

/// Maximum number of songs a playlist can hold.
pub const MAX_SONGS: usize = 128;

/// Maximum number of entries returned by a single directory listing.
pub const MAX_DIR_ENTRIES: usize = 128;

/// Capacity of a file name, in bytes.
pub const MAX_NAME: usize = 64;

/// Capacity of a full file path, in bytes.
pub const MAX_PATH: usize = 128;

/// Capacity of one metadata text field (title / artist / album), in bytes.
pub const METADATA_CAP: usize = 64;

/// Depth of the player command queue and its acknowledgment queue.
pub const CMD_QUEUE_DEPTH: usize = 3;

/// How long a command sender waits for an acknowledgment, in milliseconds.
///
/// Timing out is not an error: the command may still be applied later.
pub const ACK_TIMEOUT_MS: u64 = 10;

/// Player decode-loop sleep while paused, in milliseconds.
pub const PAUSE_POLL_MS: u64 = 10;

/// Delay between consecutive songs, in milliseconds.
pub const INTER_SONG_DELAY_MS: u64 = 10;

/// Keypad sampling cadence, in milliseconds.
///
/// The debounce filter needs two consecutive samples to accept a change, so
/// the effective debounce time is twice this value.
pub const KEYPAD_POLL_MS: u64 = 10;

/// Size of the shared PCM decode buffer, in `i16` samples (all channels).
pub const AUDIO_BUFFER_SAMPLES: usize = 4096;

/// Frames decoded per loop iteration.
///
/// Bounds the latency of command handling: one chunk is the longest the
/// player can go without polling the command queue.
pub const AUDIO_CHUNK_FRAMES: usize = 1024;
