//! Codec selection from file names.

/// Audio codec tag resolved from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Codec {
    /// MPEG Layer 3.
    Mp3,
    /// Ogg Vorbis.
    Ogg,
    /// Tracker module formats (XM / MOD / S3M / IT).
    Mod,
    /// RIFF WAVE, PCM payload.
    Wav,
    /// Free Lossless Audio Codec.
    Flac,
}

impl Codec {
    /// Resolve a codec from a file extension, case-insensitively.
    ///
    /// Returns `None` when the extension is not a supported audio format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        if ext.eq_ignore_ascii_case("mp3") {
            Some(Self::Mp3)
        } else if ext.eq_ignore_ascii_case("ogg") {
            Some(Self::Ogg)
        } else if ext.eq_ignore_ascii_case("xm")
            || ext.eq_ignore_ascii_case("mod")
            || ext.eq_ignore_ascii_case("s3m")
            || ext.eq_ignore_ascii_case("it")
        {
            Some(Self::Mod)
        } else if ext.eq_ignore_ascii_case("wav") {
            Some(Self::Wav)
        } else if ext.eq_ignore_ascii_case("flac") {
            Some(Self::Flac)
        } else {
            None
        }
    }

    /// Resolve a codec from a file name by its final extension.
    pub fn from_filename(name: &str) -> Option<Self> {
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Self::from_extension(ext)
    }
}
