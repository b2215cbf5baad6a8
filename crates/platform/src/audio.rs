//! Audio output abstraction and the shared software volume register.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Output format negotiated with the sink.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels (1 = mono, 2 = stereo).
    pub channels: u8,
    /// Bit depth (16 or 24).
    pub bit_depth: u8,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: crate::config::DEFAULT_SAMPLE_RATE,
            channels: 2,
            bit_depth: 16,
        }
    }
}

/// PCM output sink.
///
/// On hardware this is the I²S peripheral; on the desktop it is a pacing
/// stub. The player task brings the sink up at each song's sample rate and
/// tears it down when paused or terminating.
pub trait AudioOutput {
    /// Error type.
    type Error: core::fmt::Debug;

    /// Bring the output path up at the given sample rate.
    async fn start(&mut self, sample_rate: u32) -> Result<(), Self::Error>;

    /// Tear the output path down. Safe to call when already down.
    async fn shutdown(&mut self);

    /// Submit interleaved 16-bit PCM; blocks until the sink has accepted
    /// the buffer. `n_frames` counts frames, not samples.
    async fn submit(&mut self, buf: &mut [i16], n_frames: usize) -> Result<(), Self::Error>;

    /// Suspend output without tearing the path down.
    async fn pause(&mut self) -> Result<(), Self::Error>;

    /// Resume output after [`pause`](AudioOutput::pause).
    async fn resume(&mut self) -> Result<(), Self::Error>;

    /// Reconfigure the output format.
    async fn set_rate(&mut self, config: AudioConfig) -> Result<(), Self::Error>;
}

/// Software volume register shared between the UI context and the sink.
///
/// The UI adjusts the value while the player task is scaling buffers with
/// it, so every access goes through a lock.
pub struct VolumeControl {
    percent: Mutex<CriticalSectionRawMutex, Cell<u8>>,
}

impl VolumeControl {
    /// Create a register preloaded with `initial` percent (clamped to 100).
    #[must_use]
    pub const fn new(initial: u8) -> Self {
        let initial = if initial > 100 { 100 } else { initial };
        Self {
            percent: Mutex::new(Cell::new(initial)),
        }
    }

    /// Set the volume, clamping to 0–100. Returns the value stored.
    pub fn set(&self, percent: i32) -> u8 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let clamped = percent.clamp(0, 100) as u8;
        self.percent.lock(|p| p.set(clamped));
        clamped
    }

    /// Current volume in percent.
    pub fn get(&self) -> u8 {
        self.percent.lock(Cell::get)
    }

    /// Nudge the volume by `delta` percent, clamping at both ends.
    pub fn adjust(&self, delta: i32) -> u8 {
        self.set(i32::from(self.get()) + delta)
    }

    /// Apply the current volume to an interleaved PCM buffer in place.
    ///
    /// Zero percent writes silence outright.
    pub fn scale(&self, buf: &mut [i16]) {
        let percent = i32::from(self.get());
        match percent {
            0 => buf.fill(0),
            100 => {}
            _ => {
                for sample in buf.iter_mut() {
                    #[allow(clippy::cast_possible_truncation)]
                    let scaled = (i32::from(*sample) * percent / 100) as i16;
                    *sample = scaled;
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn set_clamps_both_ends() {
        let vol = VolumeControl::new(20);
        assert_eq!(vol.set(150), 100);
        assert_eq!(vol.get(), 100);
        assert_eq!(vol.set(-5), 0);
        assert_eq!(vol.get(), 0);
    }

    #[test]
    fn adjust_steps_and_saturates() {
        let vol = VolumeControl::new(98);
        assert_eq!(vol.adjust(5), 100);
        assert_eq!(vol.adjust(-5), 95);
        vol.set(2);
        assert_eq!(vol.adjust(-5), 0);
    }

    #[test]
    fn scale_at_zero_is_silence() {
        let vol = VolumeControl::new(0);
        let mut buf = [1000i16, -1000, 32767, -32768];
        vol.scale(&mut buf);
        assert_eq!(buf, [0i16; 4]);
    }

    #[test]
    fn scale_at_full_volume_is_identity() {
        let vol = VolumeControl::new(100);
        let mut buf = [1000i16, -1000, 32767, -32768];
        vol.scale(&mut buf);
        assert_eq!(buf, [1000, -1000, 32767, -32768]);
    }

    #[test]
    fn scale_is_linear() {
        let vol = VolumeControl::new(50);
        let mut buf = [1000i16, -1000];
        vol.scale(&mut buf);
        assert_eq!(buf, [500, -500]);
    }
}
