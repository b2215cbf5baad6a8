//! ID3v2 tag extraction.
//!
//! Reads the ID3v2.3 / v2.4 text frames the status display cares about
//! (`TIT2`, `TPE1`, `TALB`) from the front of an MP3 file. The parser is
//! deliberately forgiving: a missing tag, a truncated frame, or an unknown
//! text encoding degrades to empty fields — it never fails the player.
//!
//! All reads are typed and bounds-checked; frame payloads are skipped by
//! absolute seeks computed from the declared sizes, so a text payload that
//! is only partially consumed cannot shear the frame stream.

use heapless::String;
use platform::config::METADATA_CAP;
use platform::storage::File;

/// Descriptive fields extracted from a tag.
///
/// Fields left empty mean "not present"; the caller chooses fallbacks.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TrackTags {
    /// Song title (`TIT2`).
    pub title: String<METADATA_CAP>,
    /// Lead artist (`TPE1`).
    pub artist: String<METADATA_CAP>,
    /// Album name (`TALB`).
    pub album: String<METADATA_CAP>,
}

/// Decode a 4-byte syncsafe integer (7 usable bits per byte, MSB first).
pub fn syncsafe_u32(b: [u8; 4]) -> u32 {
    (u32::from(b[0] & 0x7F) << 21)
        | (u32::from(b[1] & 0x7F) << 14)
        | (u32::from(b[2] & 0x7F) << 7)
        | u32::from(b[3] & 0x7F)
}

/// Parse an ID3v2 tag from a stream positioned at the start of the file.
///
/// If the file carries no tag the stream position is restored to the start
/// and empty tags are returned; that is not an error. Read failures and
/// malformed structures end the parse with whatever was collected so far.
pub async fn read_tags<F: File>(file: &mut F) -> TrackTags {
    let mut tags = TrackTags::default();

    let mut header = [0u8; 10];
    if !read_fully(file, &mut header).await {
        return tags;
    }
    if &header[0..3] != b"ID3" {
        let _ = file.seek(0).await;
        return tags;
    }
    let version = header[3];
    let tag_size = u64::from(syncsafe_u32([header[6], header[7], header[8], header[9]]));
    let tag_end = 10 + tag_size;

    let mut pos: u64 = 10;
    while pos < tag_end {
        let mut frame_header = [0u8; 10];
        if !read_fully(file, &mut frame_header).await {
            break;
        }
        pos += 10;
        // A zero id byte means we ran into the padding area.
        if frame_header[0] == 0 {
            break;
        }
        let size_bytes = [
            frame_header[4],
            frame_header[5],
            frame_header[6],
            frame_header[7],
        ];
        // v2.4 frame sizes are syncsafe; v2.3 uses a plain 32-bit integer.
        let size = if version == 4 {
            syncsafe_u32(size_bytes)
        } else {
            u32::from_be_bytes(size_bytes)
        };
        if size == 0 {
            break;
        }

        let id = [
            frame_header[0],
            frame_header[1],
            frame_header[2],
            frame_header[3],
        ];
        match &id {
            b"TIT2" => read_text(file, size, &mut tags.title).await,
            b"TPE1" => read_text(file, size, &mut tags.artist).await,
            b"TALB" => read_text(file, size, &mut tags.album).await,
            _ => {}
        }

        pos += u64::from(size);
        if file.seek(pos).await.is_err() {
            break;
        }
    }
    tags
}

/// Decode one text frame payload of `size` bytes into `out`.
///
/// The first payload byte selects the encoding: 0 / 3 are single-byte
/// (Latin-1 / UTF-8), 1 / 2 are two-byte with a byte-order mark. Anything
/// else yields an empty string. The caller realigns the stream afterwards,
/// so this function is free to stop reading early.
async fn read_text<F: File>(file: &mut F, size: u32, out: &mut String<METADATA_CAP>) {
    out.clear();
    if size <= 1 {
        return;
    }
    let mut enc = [0u8; 1];
    if !read_fully(file, &mut enc).await {
        return;
    }
    let mut remaining = size - 1;

    match enc[0] {
        // Single-byte text: copy up to capacity, cut at the first NUL.
        0 | 3 => {
            let mut buf = [0u8; METADATA_CAP];
            let take = (remaining as usize).min(METADATA_CAP);
            let got = read_upto(file, &mut buf[..take]).await;
            let text = match buf[..got].iter().position(|&b| b == 0) {
                Some(nul) => &buf[..nul],
                None => &buf[..got],
            };
            push_lossy(text, out);
        }
        // Two-byte text with a byte-order mark, decoded lossily to ASCII.
        1 | 2 => {
            if remaining < 2 {
                return;
            }
            let mut bom = [0u8; 2];
            if !read_fully(file, &mut bom).await {
                return;
            }
            remaining -= 2;
            let big_endian = bom == [0xFE, 0xFF];
            let mut unit = [0u8; 2];
            while remaining >= 2 {
                if !read_fully(file, &mut unit).await {
                    break;
                }
                remaining -= 2;
                let code = if big_endian {
                    u16::from_be_bytes(unit)
                } else {
                    u16::from_le_bytes(unit)
                };
                if code == 0 {
                    break;
                }
                let ch = char::from_u32(u32::from(code))
                    .filter(char::is_ascii)
                    .unwrap_or('?');
                if out.push(ch).is_err() {
                    break;
                }
            }
        }
        // Unknown encoding selector: empty string.
        _ => {}
    }
}

/// Append bytes as text, truncating at capacity. Valid UTF-8 is kept as-is;
/// anything else is degraded per byte to ASCII with `?` placeholders.
fn push_lossy(bytes: &[u8], out: &mut String<METADATA_CAP>) {
    match core::str::from_utf8(bytes) {
        Ok(text) => {
            for ch in text.chars() {
                if out.push(ch).is_err() {
                    break;
                }
            }
        }
        Err(_) => {
            for &b in bytes {
                let ch = if b < 0x80 { char::from(b) } else { '?' };
                if out.push(ch).is_err() {
                    break;
                }
            }
        }
    }
}

/// Read until `buf` is full. Returns `false` on a short read or error.
async fn read_fully<F: File>(file: &mut F, buf: &mut [u8]) -> bool {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..]).await {
            Ok(0) | Err(_) => return false,
            Ok(n) => filled += n,
        }
    }
    true
}

/// Read as much of `buf` as the stream yields. Returns the byte count.
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
