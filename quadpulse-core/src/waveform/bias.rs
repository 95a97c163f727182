//! Output 4 bias level and polarity

use super::WaveformError;

/// Largest 12-bit DAC code
pub const DAC_MAX_CODE: u16 = 4095;

/// Half of output 4 that carries the pulse
///
/// The two halves drive complementary switches. Energizing both at once
/// shorts the bias supply, so exactly one path is ever selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BiasPath {
    Positive,
    Negative,
}

impl BiasPath {
    /// Positive bias uses the positive path; zero and negative use the negative path
    pub fn for_bias(bias_centivolts: i32) -> Self {
        if bias_centivolts > 0 {
            BiasPath::Positive
        } else {
            BiasPath::Negative
        }
    }
}

/// DAC code and path for one bias setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BiasLevel {
    pub path: BiasPath,
    pub dac_code: u16,
}

impl BiasLevel {
    /// Scale a bias onto the DAC
    ///
    /// `full_scale_centivolts` is the magnitude that maps to `DAC_MAX_CODE`.
    /// Magnitudes beyond it do not fit in 12 bits and are rejected.
    ///
    /// The device default is 5.00V, so the whole bias setting range spans the
    /// DAC and the analog stage after it supplies the gain. This differs from
    /// scaling by the 3.3V DAC reference (`|V| * 4096 / 3.3`), where settings
    /// above 3.3V wrap the 12-bit code.
    pub fn compute(bias_centivolts: i32, full_scale_centivolts: u16) -> Result<Self, WaveformError> {
        if full_scale_centivolts == 0 {
            return Err(WaveformError::BadRange);
        }

        let magnitude = bias_centivolts.unsigned_abs() as u64;
        let code = magnitude * DAC_MAX_CODE as u64 / full_scale_centivolts as u64;
        if code > DAC_MAX_CODE as u64 {
            return Err(WaveformError::BadRange);
        }

        Ok(Self {
            path: BiasPath::for_bias(bias_centivolts),
            dac_code: code as u16,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_selection() {
        assert_eq!(BiasPath::for_bias(1), BiasPath::Positive);
        assert_eq!(BiasPath::for_bias(0), BiasPath::Negative);
        assert_eq!(BiasPath::for_bias(-1), BiasPath::Negative);
    }

    #[test]
    fn test_full_scale() {
        let level = BiasLevel::compute(500, 500).unwrap();
        assert_eq!(level.dac_code, DAC_MAX_CODE);
        assert_eq!(level.path, BiasPath::Positive);

        let level = BiasLevel::compute(-500, 500).unwrap();
        assert_eq!(level.dac_code, DAC_MAX_CODE);
        assert_eq!(level.path, BiasPath::Negative);
    }

    #[test]
    fn test_midscale_truncates() {
        // 250 * 4095 / 500 = 2047.5
        assert_eq!(BiasLevel::compute(250, 500).unwrap().dac_code, 2047);
        assert_eq!(BiasLevel::compute(0, 500).unwrap().dac_code, 0);
    }

    #[test]
    fn test_default_full_scale_covers_setting_range() {
        let full_scale = crate::config::DeviceConfig::default().bias_full_scale_centivolts;
        assert_eq!(BiasLevel::compute(-500, full_scale).unwrap().dac_code, DAC_MAX_CODE);
        // 3.30V lands at 66% of the code range rather than at the top
        assert_eq!(BiasLevel::compute(330, full_scale).unwrap().dac_code, 2702);
        // A 3.3V full scale has no room for the top of the range
        assert_eq!(BiasLevel::compute(331, 330), Err(WaveformError::BadRange));
    }

    #[test]
    fn test_overflow_rejected() {
        assert_eq!(BiasLevel::compute(501, 500), Err(WaveformError::BadRange));
        assert_eq!(BiasLevel::compute(-400, 330), Err(WaveformError::BadRange));
        assert_eq!(BiasLevel::compute(0, 0), Err(WaveformError::BadRange));
    }
}
