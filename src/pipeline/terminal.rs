//! Screen size signals.
//!
//! The screen is the container every top-level window resolves against.
//! Its size lives in reactive signals so code outside the session can track
//! resizes.

use spark_signals::{signal, Signal};

use crate::types::Size;

// =============================================================================
// Screen
// =============================================================================

pub struct Screen {
    width: Signal<u16>,
    height: Signal<u16>,
}

impl Screen {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: signal(width),
            height: signal(height),
        }
    }

    pub fn width(&self) -> u16 {
        self.width.get()
    }

    pub fn height(&self) -> u16 {
        self.height.get()
    }

    pub fn size(&self) -> Size {
        Size::new(i32::from(self.width()), i32::from(self.height()))
    }

    /// Returns whether the size changed.
    pub fn set_size(&self, width: u16, height: u16) -> bool {
        if self.width() == width && self.height() == height {
            return false;
        }
        self.width.set(width);
        self.height.set(height);
        true
    }

    /// Width signal for reactive tracking.
    pub fn width_signal(&self) -> Signal<u16> {
        self.width.clone()
    }

    /// Height signal for reactive tracking.
    pub fn height_signal(&self) -> Signal<u16> {
        self.height.clone()
    }
}

impl std::fmt::Debug for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Screen")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

// =============================================================================
// Terminal Detection
// =============================================================================

/// Query the real terminal dimensions.
///
/// Uses crossterm; `None` when stdout is not a terminal.
pub fn detect_terminal_size() -> Option<(u16, u16)> {
    crossterm::terminal::size().ok()
}
