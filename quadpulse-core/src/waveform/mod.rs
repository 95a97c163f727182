//! Waveform derivation
//!
//! Turns the settings into the numbers the timers need: the period and
//! pulse shape, a per-channel rise/fall plan, and the bias level and path
//! for output 4. Nothing here touches hardware.

pub mod bias;
pub mod params;
pub mod plan;

pub use bias::{BiasLevel, BiasPath, DAC_MAX_CODE};
pub use params::{period_from_frequency, PulseShape, RunParameters, VoltageRange, TICKS_PER_SECOND};
pub use plan::{ChannelTiming, ChannelTimingPlan, OutputChannel, TimeStepPolicy, SEQUENCE_LEN};

/// Errors raised while configuring the outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaveformError {
    /// Raw value does not name a known shape or range
    BadEnum,
    /// Period, offset or level cannot be represented
    BadRange,
    /// Hardware rejected the configuration
    ConfigError,
}

impl From<crate::traits::HardwareError> for WaveformError {
    fn from(_: crate::traits::HardwareError) -> Self {
        WaveformError::ConfigError
    }
}
