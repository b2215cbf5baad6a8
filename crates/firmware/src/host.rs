//! Host-side sink implementations for the desktop emulator.

use embassy_time::Timer;
use platform::audio::{AudioConfig, AudioOutput, VolumeControl};
use platform::display::MetadataSink;

/// Error type for [`HostAudio`].
#[derive(Debug)]
pub enum HostAudioError {
    /// `submit` was called while the output path was down.
    NotRunning,
}

/// An [`AudioOutput`] that applies the software volume and paces
/// submissions in real time instead of talking to a DAC.
pub struct HostAudio<'a> {
    volume: &'a VolumeControl,
    sample_rate: u32,
    channels: u8,
    running: bool,
}

impl<'a> HostAudio<'a> {
    /// Create a stopped sink scaling by `volume`.
    #[must_use]
    pub fn new(volume: &'a VolumeControl) -> Self {
        Self {
            volume,
            sample_rate: platform::config::DEFAULT_SAMPLE_RATE,
            channels: 2,
            running: false,
        }
    }
}

impl AudioOutput for HostAudio<'_> {
    type Error = HostAudioError;

    async fn start(&mut self, sample_rate: u32) -> Result<(), Self::Error> {
        self.sample_rate = sample_rate.max(1);
        self.running = true;
        tracing::debug!(sample_rate, "audio up");
        Ok(())
    }

    async fn shutdown(&mut self) {
        self.running = false;
        tracing::debug!("audio down");
    }

    async fn submit(&mut self, buf: &mut [i16], n_frames: usize) -> Result<(), Self::Error> {
        if !self.running {
            return Err(HostAudioError::NotRunning);
        }
        let samples = (n_frames * usize::from(self.channels)).min(buf.len());
        self.volume.scale(&mut buf[..samples]);
        // Block for the buffer's real-time duration, like the DMA FIFO would.
        let micros = (n_frames as u64 * 1_000_000) / u64::from(self.sample_rate);
        Timer::after_micros(micros).await;
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

    async fn set_rate(&mut self, config: AudioConfig) -> Result<(), Self::Error> {
        self.sample_rate = config.sample_rate.max(1);
        self.channels = config.channels.max(1);
        Ok(())
    }
}

/// A [`MetadataSink`] that logs the now-playing line.
pub struct HostDisplay;

impl MetadataSink for HostDisplay {
    async fn set_now_playing(&mut self, title: &str, artist: &str) {
        tracing::info!(title, artist, "now playing");
    }
}
