//! Status display seam.
//!
//! The playback core only ever pushes a now-playing line; rendering, widget
//! layout, and the display bus all live outside this workspace. The display
//! is shared with the browser UI, so the player reaches its sink through an
//! `embassy_sync::mutex::Mutex` and calls [`MetadataSink::set_now_playing`]
//! only while holding the guard.

/// Sink for the now-playing line on the status display.
pub trait MetadataSink {
    /// Show the given title and artist.
    async fn set_now_playing(&mut self, title: &str, artist: &str);
}
