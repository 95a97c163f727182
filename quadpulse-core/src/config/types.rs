//! Configuration type definitions
//!
//! These are compile-time defaults today. There is no persistence layer;
//! the struct exists so the firmware reads its constants from one place.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::indicator::DEFAULT_BRIGHTNESS;

/// Errors found when validating a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A task period of zero
    ZeroPeriod,
    /// Bias full-scale of zero
    ZeroFullScale,
    /// Serial baud rate of zero
    ZeroBaud,
}

/// Device configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DeviceConfig {
    /// Control loop period (ms)
    pub control_period_ms: u32,
    /// Display refresh period (ms)
    pub display_period_ms: u32,
    /// Brightness cap for the indicators (0-255)
    pub led_brightness: u8,
    /// Bias magnitude that maps to the top DAC code (centivolts)
    pub bias_full_scale_centivolts: u16,
    /// Host link baud rate
    pub serial_baud: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            control_period_ms: 10,
            display_period_ms: 1,
            led_brightness: DEFAULT_BRIGHTNESS,
            bias_full_scale_centivolts: 500,
            serial_baud: 115_200,
        }
    }
}

impl DeviceConfig {
    /// Check the values are usable before starting the tasks
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.control_period_ms == 0 || self.display_period_ms == 0 {
            return Err(ConfigError::ZeroPeriod);
        }
        if self.bias_full_scale_centivolts == 0 {
            return Err(ConfigError::ZeroFullScale);
        }
        if self.serial_baud == 0 {
            return Err(ConfigError::ZeroBaud);
        }
        Ok(())
    }
}
