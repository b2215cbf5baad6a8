//! Keypad input task.
//!
//! Samples the keypad on a fixed cadence, debounces, and forwards press
//! edges as player commands or volume steps. Runs in the UI execution
//! context, never in the player task.

use embassy_time::Timer;
use platform::audio::VolumeControl;
use platform::config::KEYPAD_POLL_MS;
use platform::input::{Debouncer, KeypadSource};
use playback::{Command, PlayerHandle};

/// Poll the keypad and drive the player until Terminate is issued.
///
/// Commands are sent best-effort; a drop on a full queue is acceptable
/// because the user just presses the button again. The Terminate path is
/// the exception: it blocks until the player task has exited, then this
/// task returns so the caller can hand the screen back to the browser.
pub async fn input_task<K: KeypadSource>(
    keypad: &mut K,
    handle: PlayerHandle<'_>,
    volume: &VolumeControl,
) {
    let mut debouncer = Debouncer::new();
    loop {
        let sample = keypad.sample().await;
        let edges = debouncer.update(sample);
        let pressed = edges.pressed();
        if pressed != 0 {
            let delta = crate::control::volume_delta(pressed);
            if delta != 0 {
                let _ = volume.adjust(delta);
            }
            match crate::control::command_for(pressed) {
                Some(Command::Terminate) => {
                    handle.terminate().await;
                    return;
                }
                Some(cmd) => {
                    let _ = handle.send(cmd).await;
                }
                None => {}
            }
        }
        Timer::after_millis(KEYPAD_POLL_MS).await;
    }
}
