//! Menu navigation state machine
//!
//! The cursor is either moving between settings or editing one of them.
//! Only an explicit select enters editing and only back leaves it.

use crate::settings::NUM_SETTINGS;

/// Navigation modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Rotation moves the highlight between settings
    #[default]
    Navigating,
    /// Rotation and select change the highlighted setting
    Editing,
}

/// Highlighted setting and whether it is being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NavigationCursor {
    slot: usize,
    mode: Mode,
}

impl NavigationCursor {
    /// Cursor on the first setting, not editing
    pub const fn new() -> Self {
        Self {
            slot: 0,
            mode: Mode::Navigating,
        }
    }

    /// Highlighted slot index, always below `NUM_SETTINGS`
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Current navigation mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// True while a setting is being edited
    pub fn is_editing(&self) -> bool {
        self.mode == Mode::Editing
    }

    /// Move the highlight up, stopping at the first slot
    pub fn previous(&mut self) {
        self.slot = self.slot.saturating_sub(1);
    }

    /// Move the highlight down, stopping at the last slot
    pub fn next(&mut self) {
        if self.slot < NUM_SETTINGS - 1 {
            self.slot += 1;
        }
    }

    /// Start editing the highlighted setting
    pub fn enter_edit(&mut self) {
        self.mode = Mode::Editing;
    }

    /// Return to navigation
    pub fn exit_edit(&mut self) {
        self.mode = Mode::Navigating;
    }
}
