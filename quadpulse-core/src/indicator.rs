//! Status indicator colour policy
//!
//! Four colour indicators mirror the outputs: 0 and 1 show the voltage
//! range of outputs 1 and 2, 2 is the run lamp and 3 shows the bias level.

use smart_leds::RGB8;

use crate::waveform::{RunParameters, VoltageRange};

/// Number of indicators on the front panel
pub const NUM_INDICATORS: usize = 4;

/// Default brightness cap for any colour component
pub const DEFAULT_BRIGHTNESS: u8 = 50;

/// Bias magnitude that lights indicator 3 at full brightness (5 V)
pub const FULL_BIAS_CENTIVOLTS: u32 = 500;

const OFF: RGB8 = RGB8 { r: 0, g: 0, b: 0 };

/// Colours for every indicator given the current run parameters
pub fn indicator_colors(params: &RunParameters, brightness: u8) -> [RGB8; NUM_INDICATORS] {
    if !params.running {
        return [OFF; NUM_INDICATORS];
    }

    let range = match params.voltage_range {
        VoltageRange::Low => RGB8::new(0, brightness, 0),
        VoltageRange::High => RGB8::new(brightness, 0, 0),
    };

    let level = (brightness as u32 * params.bias_centivolts.unsigned_abs() / FULL_BIAS_CENTIVOLTS)
        .min(brightness as u32) as u8;
    let bias = if params.bias_centivolts > 0 {
        // orange
        RGB8::new(level, level, 0)
    } else {
        // purple
        RGB8::new(level, 0, level)
    };

    [range, range, RGB8::new(brightness, 0, 0), bias]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::PulseShape;

    fn params(running: bool, voltage_range: VoltageRange, bias_centivolts: i32) -> RunParameters {
        RunParameters {
            period_ticks: 10_000,
            shape: PulseShape::Standard,
            voltage_range,
            bias_centivolts,
            single_shot: false,
            running,
        }
    }

    #[test]
    fn test_all_off_when_stopped() {
        let colors = indicator_colors(&params(false, VoltageRange::High, 300), 50);
        assert!(colors.iter().all(|c| *c == OFF));
    }

    #[test]
    fn test_range_colors() {
        let low = indicator_colors(&params(true, VoltageRange::Low, 0), 50);
        assert_eq!(low[0], RGB8::new(0, 50, 0));
        assert_eq!(low[1], RGB8::new(0, 50, 0));
        assert_eq!(low[2], RGB8::new(50, 0, 0));

        let high = indicator_colors(&params(true, VoltageRange::High, 0), 50);
        assert_eq!(high[0], RGB8::new(50, 0, 0));
        assert_eq!(high[1], RGB8::new(50, 0, 0));
    }

    #[test]
    fn test_bias_colors() {
        let positive = indicator_colors(&params(true, VoltageRange::Low, 250), 50);
        assert_eq!(positive[3], RGB8::new(25, 25, 0));

        let negative = indicator_colors(&params(true, VoltageRange::Low, -500), 50);
        assert_eq!(negative[3], RGB8::new(50, 0, 50));

        let zero = indicator_colors(&params(true, VoltageRange::Low, 0), 50);
        assert_eq!(zero[3], OFF);
    }
}
