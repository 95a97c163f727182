//! Aggregate device state
//!
//! Settings and the navigation cursor live together and are owned by the
//! control loop. Every other consumer gets a reference or a copy.

use quadpulse_protocol::ConfigPayload;

use super::events::InputEvents;
use super::machine::NavigationCursor;
use crate::settings::{SettingKind, SettingSlot, SettingsError, SettingsRegistry};
use crate::waveform::RunParameters;

/// Settings plus cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceState {
    pub settings: SettingsRegistry,
    pub cursor: NavigationCursor,
}

impl DeviceState {
    /// Power-on state
    pub const fn new() -> Self {
        Self {
            settings: SettingsRegistry::new(),
            cursor: NavigationCursor::new(),
        }
    }

    /// Apply one polling cycle's worth of input
    ///
    /// Returns true if any setting value was written, meaning the outputs
    /// must be reconfigured. Cursor movement alone returns false.
    pub fn handle_input(&mut self, events: &InputEvents) -> bool {
        let mut changed = false;

        if self.cursor.is_editing() {
            if events.back {
                self.cursor.exit_edit();
            } else {
                changed |= self.edit_current(events);
            }
        } else {
            if events.rotate_left {
                self.cursor.previous();
            }
            if events.rotate_right {
                self.cursor.next();
            }
            if events.select {
                self.cursor.enter_edit();
            }
        }

        if events.mode {
            changed |= self.settings.flip(SettingSlot::OutputVoltageRange).is_ok();
        }
        if events.enable {
            changed |= self.settings.flip(SettingSlot::RunEnabled).is_ok();
        }

        changed
    }

    fn edit_current(&mut self, events: &InputEvents) -> bool {
        let Ok(setting) = self.settings.by_index_mut(self.cursor.slot()) else {
            return false;
        };

        match setting.kind_mut() {
            SettingKind::Continuous(value) => {
                if events.select {
                    value.advance_digit();
                }
                if events.rotate_left {
                    value.decrement();
                }
                if events.rotate_right {
                    value.increment();
                }
                events.rotated()
            }
            SettingKind::Toggle(toggle) => {
                if events.rotated() || events.select {
                    toggle.flip();
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Replace all settings from a host configuration
    pub fn apply_remote(&mut self, config: &ConfigPayload) -> Result<(), SettingsError> {
        self.settings.apply_config(config)
    }

    /// Current configuration in wire form
    pub fn config_payload(&self) -> ConfigPayload {
        self.settings.config_payload()
    }

    /// Derive output parameters from the current settings
    pub fn run_parameters(&self) -> RunParameters {
        RunParameters::from_settings(&self.settings)
    }
}
