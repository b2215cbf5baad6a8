//! Built-in song decoders.
//!
//! Each decoder owns its open file, answers one info query up front, and
//! then produces interleaved 16-bit PCM chunk by chunk. [`SongDecoder`]
//! dispatches over the codecs compiled into the firmware: WAV is always
//! available ("parse the PCM chunks directly" — no third-party crate
//! needed), MP3 ships behind the `mp3` feature via `nanomp3`, and the
//! remaining codec tags report [`DecodeError::Unsupported`], which the
//! player turns into a skip.
//!
//! The `decode` return value intentionally conflates a clean end of stream
//! with a mid-stream failure: any value `<= 0` ends the song. Callers that
//! need to distinguish the two would have to change this contract.

use platform::config::AUDIO_CHUNK_FRAMES;
use platform::storage::File;
use thiserror_no_std::Error;

use crate::codec::Codec;

/// Stream parameters reported by a decoder after opening a song.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioInfo {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count (1 or 2).
    pub channels: u8,
    /// Largest number of frames one `decode` call produces.
    pub chunk_frames: usize,
}

/// Errors from opening a song for decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The codec is known but not compiled into this firmware.
    #[error("codec not compiled in")]
    Unsupported,
    /// The stream header is malformed or uses unsupported parameters.
    #[error("malformed stream header")]
    BadHeader,
    /// The storage layer failed while reading the header.
    #[error("storage read failed")]
    Io,
}

/// A decoder bound to one open song file.
#[derive(Debug)]
pub enum SongDecoder<F: File> {
    /// RIFF WAVE, 16-bit PCM payload.
    Wav(WavDecoder<F>),
    /// MPEG Layer 3 via nanomp3.
    #[cfg(feature = "mp3")]
    Mp3(Mp3Decoder<F>),
}

impl<F: File> SongDecoder<F> {
    /// Open `file` with the decoder selected by `codec`.
    pub async fn open(codec: Codec, file: F) -> Result<Self, DecodeError> {
        match codec {
            Codec::Wav => Ok(Self::Wav(WavDecoder::open(file).await?)),
            #[cfg(feature = "mp3")]
            Codec::Mp3 => Ok(Self::Mp3(Mp3Decoder::open(file).await?)),
            _ => Err(DecodeError::Unsupported),
        }
    }

    /// Stream parameters for sink configuration and buffer sizing.
    pub fn info(&self) -> AudioInfo {
        match self {
            Self::Wav(d) => d.info(),
            #[cfg(feature = "mp3")]
            Self::Mp3(d) => d.info(),
        }
    }

    /// Decode one chunk of interleaved PCM into `buf`.
    ///
    /// Returns the number of frames produced; `0` or a negative value means
    /// end of stream or failure (not distinguished).
    pub async fn decode(&mut self, buf: &mut [i16]) -> i32 {
        match self {
            Self::Wav(d) => d.decode(buf).await,
            #[cfg(feature = "mp3")]
            Self::Mp3(d) => d.decode(buf).await,
        }
    }
}

// ---------------------------------------------------------------------------
// WAV
// ---------------------------------------------------------------------------

/// Streaming decoder for RIFF WAVE files carrying 16-bit PCM.
#[derive(Debug)]
pub struct WavDecoder<F: File> {
    file: F,
    sample_rate: u32,
    channels: u8,
    /// PCM bytes left in the data chunk.
    remaining: u64,
}

impl<F: File> WavDecoder<F> {
    /// Parse the RIFF header and chunk list up to the start of PCM data.
    pub async fn open(mut file: F) -> Result<Self, DecodeError> {
        let mut riff = [0u8; 12];
        read_fully(&mut file, &mut riff)
            .await
            .map_err(|_| DecodeError::Io)?
            .then_some(())
            .ok_or(DecodeError::BadHeader)?;
        if &riff[0..4] != b"RIFF" || &riff[8..12] != b"WAVE" {
            return Err(DecodeError::BadHeader);
        }

        let mut pos: u64 = 12;
        let mut format: Option<(u32, u8)> = None;
        loop {
            let mut chunk = [0u8; 8];
            match read_fully(&mut file, &mut chunk).await {
                Ok(true) => {}
                // Ran off the end without finding a data chunk.
                Ok(false) => return Err(DecodeError::BadHeader),
                Err(()) => return Err(DecodeError::Io),
            }
            pos += 8;
            let id = [chunk[0], chunk[1], chunk[2], chunk[3]];
            let size = u32::from_le_bytes([chunk[4], chunk[5], chunk[6], chunk[7]]);
            match &id {
                b"fmt " => {
                    if size < 16 {
                        return Err(DecodeError::BadHeader);
                    }
                    let mut fmt = [0u8; 16];
                    read_fully(&mut file, &mut fmt)
                        .await
                        .map_err(|_| DecodeError::Io)?
                        .then_some(())
                        .ok_or(DecodeError::BadHeader)?;
                    let audio_format = u16::from_le_bytes([fmt[0], fmt[1]]);
                    let channels = u16::from_le_bytes([fmt[2], fmt[3]]);
                    let sample_rate = u32::from_le_bytes([fmt[4], fmt[5], fmt[6], fmt[7]]);
                    let bits = u16::from_le_bytes([fmt[14], fmt[15]]);
                    // Only uncompressed 16-bit mono/stereo PCM.
                    if audio_format != 1 || bits != 16 || !(1..=2).contains(&channels) {
                        return Err(DecodeError::Unsupported);
                    }
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        format = Some((sample_rate, channels as u8));
                    }
                    pos += u64::from(size) + u64::from(size & 1);
                    file.seek(pos).await.map_err(|_| DecodeError::Io)?;
                }
                b"data" => {
                    let (sample_rate, channels) = format.ok_or(DecodeError::BadHeader)?;
                    return Ok(Self {
                        file,
                        sample_rate,
                        channels,
                        remaining: u64::from(size),
                    });
                }
                _ => {
                    // Chunks are word-aligned; odd sizes carry a pad byte.
                    pos += u64::from(size) + u64::from(size & 1);
                    file.seek(pos).await.map_err(|_| DecodeError::Io)?;
                }
            }
        }
    }

    fn info(&self) -> AudioInfo {
        AudioInfo {
            sample_rate: self.sample_rate,
            channels: self.channels,
            chunk_frames: AUDIO_CHUNK_FRAMES,
        }
    }

    async fn decode(&mut self, buf: &mut [i16]) -> i32 {
        let channels = usize::from(self.channels);
        let frame_bytes = channels * 2;
        let room_frames = (buf.len() / channels).min(AUDIO_CHUNK_FRAMES);
        let mut want = (room_frames * frame_bytes).min(usize::try_from(self.remaining).unwrap_or(usize::MAX));
        want -= want % frame_bytes;
        if want == 0 {
            return 0;
        }

        let mut scratch = [0u8; 256];
        let mut samples_done = 0usize;
        let mut taken = 0usize;
        while taken < want {
            let step = scratch.len().min(want - taken);
            let got = read_upto(&mut self.file, &mut scratch[..step]).await;
            for pair in scratch[..got - got % 2].chunks_exact(2) {
                buf[samples_done] = i16::from_le_bytes([pair[0], pair[1]]);
                samples_done += 1;
            }
            taken += got;
            if got < step {
                // Short read or storage error: surface whatever decoded so
                // far; a bare 0 reads as end of stream upstream.
                break;
            }
        }
        self.remaining = self.remaining.saturating_sub(taken as u64);
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        {
            (samples_done / channels) as i32
        }
    }
}

/// Read as much of `buf` as the stream yields; errors end the read.
async fn read_upto<F: File>(file: &mut F, buf: &mut [u8]) -> usize {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]).await {
            Ok(0) | Err(_) => break,
            Ok(n) => filled += n,
        }
    }
    filled
}

/// Read until `buf` is full. `Ok(false)` = clean short read, `Err` = I/O.
async fn read_fully<F: File>(file: &mut F, buf: &mut [u8]) -> Result<bool, ()> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]).await {
            Ok(0) => return Ok(false),
            Ok(n) => filled += n,
            Err(_) => return Err(()),
        }
    }
    Ok(true)
}

// ---------------------------------------------------------------------------
// MP3 (feature "mp3")
// ---------------------------------------------------------------------------

/// nanomp3-backed MP3 decoder.
///
/// nanomp3 is a pure-Rust, no_std c2rust translation of minimp3 with the
/// ARM soundness fixes; it has no internal buffering, so this wrapper keeps
/// a sliding window of file bytes and feeds whole frames to the inner
/// decoder. The first frame is decoded during `open` to learn the stream
/// parameters and is replayed on the first `decode` call.
#[cfg(feature = "mp3")]
pub struct Mp3Decoder<F: File> {
    file: F,
    inner: nanomp3::Decoder,
    window: [u8; Self::WINDOW],
    filled: usize,
    eof: bool,
    sample_rate: u32,
    channels: u8,
    pending: [i16; nanomp3::MAX_SAMPLES_PER_FRAME],
    pending_len: usize,
}

#[cfg(feature = "mp3")]
impl<F: File> Mp3Decoder<F> {
    const WINDOW: usize = 4096;

    /// Open an MP3 stream and decode the first frame for its parameters.
    pub async fn open(file: F) -> Result<Self, DecodeError> {
        let mut decoder = Self {
            file,
            inner: nanomp3::Decoder::new(),
            window: [0u8; Self::WINDOW],
            filled: 0,
            eof: false,
            sample_rate: 0,
            channels: 0,
            pending: [0i16; nanomp3::MAX_SAMPLES_PER_FRAME],
            pending_len: 0,
        };
        loop {
            let produced = decoder.decode_step().await;
            if produced > 0 {
                decoder.pending_len = produced;
                return Ok(decoder);
            }
            if decoder.eof && decoder.filled == 0 {
                return Err(DecodeError::BadHeader);
            }
            if decoder.stalled() {
                return Err(DecodeError::BadHeader);
            }
        }
    }

    fn info(&self) -> AudioInfo {
        AudioInfo {
            sample_rate: self.sample_rate,
            channels: self.channels,
            chunk_frames: nanomp3::MAX_SAMPLES_PER_FRAME / 2,
        }
    }

    async fn decode(&mut self, buf: &mut [i16]) -> i32 {
        let channels = usize::from(self.channels.max(1));
        if self.pending_len > 0 {
            let n = self.pending_len.min(buf.len());
            buf[..n].copy_from_slice(&self.pending[..n]);
            self.pending_len = 0;
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            return (n / channels) as i32;
        }
        loop {
            let produced = self.decode_step().await;
            if produced > 0 {
                let n = produced.min(buf.len());
                buf[..n].copy_from_slice(&self.pending[..n]);
                self.pending_len = 0;
                #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                return (n / channels) as i32;
            }
            if (self.eof && self.filled == 0) || self.stalled() {
                return 0;
            }
        }
    }

    /// `true` when the window is full of bytes the decoder refuses to eat.
    fn stalled(&self) -> bool {
        self.eof && self.filled == Self::WINDOW
    }

    /// Refill the window and try to decode one frame into `pending`.
    /// Returns the number of samples produced (all channels).
    async fn decode_step(&mut self) -> usize {
        while !self.eof && self.filled < Self::WINDOW {
            match self.file.read(&mut self.window[self.filled..]).await {
                Ok(0) | Err(_) => self.eof = true,
                Ok(n) => self.filled += n,
            }
        }
        if self.filled == 0 {
            return 0;
        }

        let mut pcm = [0f32; nanomp3::MAX_SAMPLES_PER_FRAME];
        let (consumed, frame) = self.inner.decode(&self.window[..self.filled], &mut pcm);
        self.window.copy_within(consumed..self.filled, 0);
        self.filled -= consumed;

        if consumed == 0 && frame.is_none() && self.filled == Self::WINDOW {
            // A full window the decoder refuses to eat can never make
            // progress; stop feeding it.
            self.eof = true;
        }

        match frame {
            Some(info) => {
                self.sample_rate = info.sample_rate;
                #[allow(clippy::cast_possible_truncation)]
                {
                    self.channels = info.channels.num() as u8;
                }
                let n = info.samples_produced.min(self.pending.len());
                for (dst, src) in self.pending[..n].iter_mut().zip(pcm[..n].iter()) {
                    #[allow(clippy::cast_possible_truncation)]
                    {
                        *dst = (src.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                    }
                }
                self.pending_len = n;
                n
            }
            None => 0,
        }
    }
}
