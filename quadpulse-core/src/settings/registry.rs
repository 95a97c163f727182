//! The fixed set of device settings
//!
//! Slot order is load-bearing: it is both the menu order on the display
//! and the field order of the configuration payload.

use quadpulse_protocol::ConfigPayload;

use super::setting::{Continuous, Setting, SettingsError, Toggle};

/// Number of settings
pub const NUM_SETTINGS: usize = 5;

/// Setting slots in menu/wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SettingSlot {
    /// Pulse repetition frequency (Hz)
    Frequency = 0,
    /// Standard or short pulses on outputs 1 and 2
    OutputTimingMode = 1,
    /// 0.45V or 5.0V range on outputs 1 and 2
    OutputVoltageRange = 2,
    /// Output 4 bias level (V, two decimals)
    BiasVoltage = 3,
    /// Outputs enabled
    RunEnabled = 4,
}

impl SettingSlot {
    /// All slots in order
    pub const ALL: [SettingSlot; NUM_SETTINGS] = [
        SettingSlot::Frequency,
        SettingSlot::OutputTimingMode,
        SettingSlot::OutputVoltageRange,
        SettingSlot::BiasVoltage,
        SettingSlot::RunEnabled,
    ];

    /// Position in menu and wire order
    pub fn index(self) -> usize {
        self as usize
    }
}

const FREQUENCY_DEFAULT: Continuous = Continuous::new(1000, 1, 125_000, 6, 0);
const BIAS_DEFAULT: Continuous = Continuous::new(0, -500, 500, 3, 2);

/// Ordered collection of all settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SettingsRegistry {
    settings: [Setting; NUM_SETTINGS],
}

impl Default for SettingsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsRegistry {
    /// Settings with their power-on values
    pub const fn new() -> Self {
        Self {
            settings: [
                Setting::continuous("Freq (Hz)", FREQUENCY_DEFAULT),
                Setting::toggle("On Time", Toggle::new(false, "LnG", "Shrt")),
                Setting::toggle("Out V", Toggle::new(false, "0.45V", "5.0V")),
                Setting::continuous("Bias V", BIAS_DEFAULT),
                Setting::toggle("Running", Toggle::new(false, "OFF", "ON")),
            ],
        }
    }

    /// Get access to a setting
    pub fn get(&self, slot: SettingSlot) -> &Setting {
        &self.settings[slot.index()]
    }

    /// Get mutable access to a setting
    pub fn get_mut(&mut self, slot: SettingSlot) -> &mut Setting {
        &mut self.settings[slot.index()]
    }

    /// Look up a setting by raw slot index
    pub fn by_index(&self, index: usize) -> Result<&Setting, SettingsError> {
        self.settings.get(index).ok_or(SettingsError::InvalidSlot)
    }

    /// Look up a setting by raw slot index for mutation
    pub fn by_index_mut(&mut self, index: usize) -> Result<&mut Setting, SettingsError> {
        self.settings.get_mut(index).ok_or(SettingsError::InvalidSlot)
    }

    /// Iterate settings in slot order
    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.settings.iter()
    }

    /// Number of settings
    pub fn len(&self) -> usize {
        NUM_SETTINGS
    }

    /// Always false; the set is fixed
    pub fn is_empty(&self) -> bool {
        false
    }

    fn continuous(&self, slot: SettingSlot) -> &Continuous {
        match self.get(slot).as_continuous() {
            Some(c) => c,
            // Slot kinds are fixed by `new`
            None => unreachable!(),
        }
    }

    fn continuous_mut(&mut self, slot: SettingSlot) -> &mut Continuous {
        match self.get_mut(slot).as_continuous_mut() {
            Some(c) => c,
            None => unreachable!(),
        }
    }

    fn toggle(&self, slot: SettingSlot) -> &Toggle {
        match self.get(slot).as_toggle() {
            Some(t) => t,
            None => unreachable!(),
        }
    }

    fn toggle_mut(&mut self, slot: SettingSlot) -> &mut Toggle {
        match self.get_mut(slot).as_toggle_mut() {
            Some(t) => t,
            None => unreachable!(),
        }
    }

    /// Frequency setting (raw fixed-point value and scale)
    pub fn frequency(&self) -> &Continuous {
        self.continuous(SettingSlot::Frequency)
    }

    /// Bias setting (raw fixed-point value and scale)
    pub fn bias(&self) -> &Continuous {
        self.continuous(SettingSlot::BiasVoltage)
    }

    /// Short pulses selected
    pub fn short_pulse(&self) -> bool {
        self.toggle(SettingSlot::OutputTimingMode).value()
    }

    /// 5.0V range selected
    pub fn high_voltage(&self) -> bool {
        self.toggle(SettingSlot::OutputVoltageRange).value()
    }

    /// Outputs enabled
    pub fn running(&self) -> bool {
        self.toggle(SettingSlot::RunEnabled).value()
    }

    /// Flip a toggle slot directly, regardless of the cursor
    pub fn flip(&mut self, slot: SettingSlot) -> Result<(), SettingsError> {
        self.get_mut(slot)
            .as_toggle_mut()
            .ok_or(SettingsError::WrongKind)?
            .flip();
        Ok(())
    }

    /// Force the run toggle, e.g. after the outputs were stopped by a fault
    pub fn set_running(&mut self, running: bool) {
        self.toggle_mut(SettingSlot::RunEnabled).set(running);
    }

    /// Replace every setting from a host configuration
    ///
    /// Either all five slots change or none do.
    pub fn apply_config(&mut self, config: &ConfigPayload) -> Result<(), SettingsError> {
        let frequency =
            i32::try_from(config.frequency_raw).map_err(|_| SettingsError::OutOfRange)?;
        if !self.frequency().contains(frequency) || !self.bias().contains(config.bias_raw) {
            return Err(SettingsError::OutOfRange);
        }

        self.continuous_mut(SettingSlot::Frequency).set(frequency)?;
        self.continuous_mut(SettingSlot::BiasVoltage).set(config.bias_raw)?;
        self.toggle_mut(SettingSlot::OutputTimingMode).set(config.short_pulse);
        self.toggle_mut(SettingSlot::OutputVoltageRange).set(config.high_voltage);
        self.toggle_mut(SettingSlot::RunEnabled).set(config.running);
        Ok(())
    }

    /// Snapshot of the wire-relevant fields
    pub fn config_payload(&self) -> ConfigPayload {
        ConfigPayload {
            // Frequency bounds are positive
            frequency_raw: self.frequency().value() as u32,
            short_pulse: self.short_pulse(),
            high_voltage: self.high_voltage(),
            bias_raw: self.bias().value(),
            running: self.running(),
        }
    }
}
