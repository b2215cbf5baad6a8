//! Button → player action map.
//!
//! The browser screen owns the navigation buttons (UP/DOWN/B); while the
//! player screen is active, the mappings below apply. Volume is not a
//! player command — it goes straight to the shared register.

use platform::input::keys;
use playback::Command;

/// Volume change per shoulder-button press, in percent.
pub const VOLUME_STEP: i32 = 5;

/// Player command for a press-edge mask, if any.
///
/// When several buttons land on the same debounce round the highest
/// priority one wins; Terminate outranks everything.
pub fn command_for(pressed: u16) -> Option<Command> {
    if pressed & keys::MENU != 0 {
        Some(Command::Terminate)
    } else if pressed & keys::A != 0 {
        Some(Command::Pause)
    } else if pressed & keys::RIGHT != 0 {
        Some(Command::Next)
    } else if pressed & keys::LEFT != 0 {
        Some(Command::Prev)
    } else if pressed & keys::SELECT != 0 {
        Some(Command::ToggleLoopMode)
    } else {
        None
    }
}

/// Volume adjustment for a press-edge mask, in percent.
pub fn volume_delta(pressed: u16) -> i32 {
    let mut delta = 0;
    if pressed & keys::R != 0 {
        delta += VOLUME_STEP;
    }
    if pressed & keys::L != 0 {
        delta -= VOLUME_STEP;
    }
    delta
}
