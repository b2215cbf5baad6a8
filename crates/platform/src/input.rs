//! Keypad input: raw sampling seam and the debounce filter.
//!
//! The handheld has eight buttons behind an I²C expander (one active-low
//! byte) and three more on discrete active-low lines. A board-support
//! implementation of [`KeypadSource`] folds all of them into one bitmask;
//! [`Debouncer`] then filters out single-sample glitches before the input
//! task acts on edges.

/// Button bitmask constants.
///
/// Bits 0–7 come from the I²C byte device, bits 8–10 from discrete lines.
pub mod keys {
    /// Start button.
    pub const START: u16 = 1 << 0;
    /// Select button.
    pub const SELECT: u16 = 1 << 1;
    /// Up button.
    pub const UP: u16 = 1 << 2;
    /// Down button.
    pub const DOWN: u16 = 1 << 3;
    /// Left button.
    pub const LEFT: u16 = 1 << 4;
    /// Right button.
    pub const RIGHT: u16 = 1 << 5;
    /// A button.
    pub const A: u16 = 1 << 6;
    /// B button.
    pub const B: u16 = 1 << 7;
    /// Menu button.
    pub const MENU: u16 = 1 << 8;
    /// Left shoulder button.
    pub const L: u16 = 1 << 9;
    /// Right shoulder button.
    pub const R: u16 = 1 << 10;
}

/// Raw keypad sample source.
///
/// Implementations read the hardware and return a bitmask of the buttons
/// currently held, already converted from active-low levels.
pub trait KeypadSource {
    /// Sample the current keypad state.
    async fn sample(&mut self) -> u16;
}

/// Result of one debounce round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEdges {
    /// Debounced button state after this round.
    pub state: u16,
    /// Bits that changed state this round.
    pub changed: u16,
}

impl KeyEdges {
    /// Bits that went from released to pressed this round.
    pub fn pressed(&self) -> u16 {
        self.changed & self.state
    }

    /// Bits that went from pressed to released this round.
    pub fn released(&self) -> u16 {
        self.changed & !self.state
    }
}

/// Two-sample vertical-counter debounce filter.
///
/// Per bit, two counter planes track how long the raw sample has disagreed
/// with the debounced state; a bit must disagree for two consecutive rounds
/// to register, which suppresses single-sample glitches without any timer.
/// State persists across calls for the lifetime of the input loop.
#[derive(Debug, Default)]
pub struct Debouncer {
    state: u16,
    cnt0: u16,
    cnt1: u16,
}

impl Debouncer {
    /// Create a filter with all buttons released.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: 0,
            cnt0: 0,
            cnt1: 0,
        }
    }

    /// Feed one raw sample; returns the debounced state and the edge mask.
    pub fn update(&mut self, sample: u16) -> KeyEdges {
        let delta = sample ^ self.state;
        self.cnt1 = (self.cnt1 ^ self.cnt0) & delta;
        self.cnt0 = !self.cnt0 & delta;

        // A bit has settled once it disagreed for two consecutive rounds:
        // the counter planes then read (cnt1, cnt0) = (1, 0).
        let toggle = delta & self.cnt1 & !self.cnt0;
        self.state ^= toggle;
        KeyEdges {
            state: self.state,
            changed: toggle,
        }
    }

    /// Current debounced state.
    pub fn state(&self) -> u16 {
        self.state
    }
}
