//! Run parameters derived from the settings

use crate::settings::SettingsRegistry;

use super::bias::BiasPath;
use super::WaveformError;

/// Output timer tick rate (100 ns ticks)
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Pulse shape on outputs 1 and 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PulseShape {
    /// Pulses track output 4's high time
    #[default]
    Standard = 0,
    /// Fixed 2 µs pulses
    Short = 1,
}

impl TryFrom<u8> for PulseShape {
    type Error = WaveformError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PulseShape::Standard),
            1 => Ok(PulseShape::Short),
            _ => Err(WaveformError::BadEnum),
        }
    }
}

/// Voltage range of outputs 1 and 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltageRange {
    /// 0.45 V
    #[default]
    Low = 0,
    /// 5.0 V
    High = 1,
}

impl TryFrom<u8> for VoltageRange {
    type Error = WaveformError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(VoltageRange::Low),
            1 => Ok(VoltageRange::High),
            _ => Err(WaveformError::BadEnum),
        }
    }
}

/// Convert a fixed-point frequency setting into a period in ticks
///
/// `period = TICKS_PER_SECOND * 10^decimal_loc / value`, truncated. A
/// non-positive frequency yields 0, which the timing plan rejects.
pub fn period_from_frequency(value: i32, decimal_loc: u8) -> u32 {
    if value <= 0 {
        return 0;
    }
    let scale = 10u64.saturating_pow(decimal_loc as u32);
    let period = TICKS_PER_SECOND.saturating_mul(scale) / value as u64;
    u32::try_from(period).unwrap_or(u32::MAX)
}

/// Everything the waveform engine needs for one configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunParameters {
    /// Period in 100 ns ticks
    pub period_ticks: u32,
    pub shape: PulseShape,
    pub voltage_range: VoltageRange,
    /// Output 4 bias in centivolts
    pub bias_centivolts: i32,
    /// Stop after one period (not selectable from the menu)
    pub single_shot: bool,
    /// Outputs enabled
    pub running: bool,
}

impl RunParameters {
    /// Derive parameters from the current settings
    pub fn from_settings(settings: &SettingsRegistry) -> Self {
        let frequency = settings.frequency();

        Self {
            period_ticks: period_from_frequency(frequency.value(), frequency.decimal_loc()),
            shape: if settings.short_pulse() {
                PulseShape::Short
            } else {
                PulseShape::Standard
            },
            voltage_range: if settings.high_voltage() {
                VoltageRange::High
            } else {
                VoltageRange::Low
            },
            // Bias is stored with two decimals
            bias_centivolts: settings.bias().value(),
            single_shot: false,
            running: settings.running(),
        }
    }

    /// Which half of output 4 the bias sign selects
    pub fn bias_path(&self) -> BiasPath {
        BiasPath::for_bias(self.bias_centivolts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quadpulse_protocol::ConfigPayload;

    #[test]
    fn test_period_from_frequency() {
        assert_eq!(period_from_frequency(1000, 0), 10_000);
        assert_eq!(period_from_frequency(1, 0), 10_000_000);
        assert_eq!(period_from_frequency(125_000, 0), 80);
        // Truncates toward zero
        assert_eq!(period_from_frequency(3, 0), 3_333_333);
        assert_eq!(period_from_frequency(15, 1), 6_666_666);
    }

    #[test]
    fn test_zero_frequency_gives_zero_period() {
        assert_eq!(period_from_frequency(0, 0), 0);
        assert_eq!(period_from_frequency(-5, 0), 0);
    }

    #[test]
    fn test_enum_conversions() {
        assert_eq!(PulseShape::try_from(1), Ok(PulseShape::Short));
        assert_eq!(PulseShape::try_from(2), Err(WaveformError::BadEnum));
        assert_eq!(VoltageRange::try_from(0), Ok(VoltageRange::Low));
        assert_eq!(VoltageRange::try_from(7), Err(WaveformError::BadEnum));
    }

    #[test]
    fn test_from_defaults() {
        let params = RunParameters::from_settings(&SettingsRegistry::new());
        assert_eq!(params.period_ticks, 10_000);
        assert_eq!(params.shape, PulseShape::Standard);
        assert_eq!(params.voltage_range, VoltageRange::Low);
        assert_eq!(params.bias_centivolts, 0);
        assert_eq!(params.bias_path(), BiasPath::Negative);
        assert!(!params.single_shot);
        assert!(!params.running);
    }

    #[test]
    fn test_from_configured_settings() {
        let mut settings = SettingsRegistry::new();
        settings
            .apply_config(&ConfigPayload {
                frequency_raw: 20_000,
                short_pulse: true,
                high_voltage: true,
                bias_raw: 250,
                running: true,
            })
            .unwrap();

        let params = RunParameters::from_settings(&settings);
        assert_eq!(params.period_ticks, 500);
        assert_eq!(params.shape, PulseShape::Short);
        assert_eq!(params.voltage_range, VoltageRange::High);
        assert_eq!(params.bias_centivolts, 250);
        assert_eq!(params.bias_path(), BiasPath::Positive);
        assert!(params.running);
    }
}
