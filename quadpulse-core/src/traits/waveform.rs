//! Output timer hardware trait

use crate::waveform::{VoltageRange, SEQUENCE_LEN};

/// Errors reported by the timer/DAC layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HardwareError {
    /// Value does not fit the peripheral register
    InvalidValue,
    /// Peripheral is still running a previous transfer
    Busy,
}

/// Compare-sequence channels
///
/// Output 4 is split into its two polarity halves. Hardware must never have
/// `Out4Positive` and `Out4Negative` running at the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceChannel {
    Out2,
    Out3,
    Out4Positive,
    Out4Negative,
}

impl SequenceChannel {
    pub const ALL: [SequenceChannel; 4] = [
        SequenceChannel::Out2,
        SequenceChannel::Out3,
        SequenceChannel::Out4Positive,
        SequenceChannel::Out4Negative,
    ];
}

/// Synchronized output timers
///
/// Outputs 1-3 share one counter and output 4 runs on a second counter.
/// Both are slaved to a master counter, so nothing moves until
/// `start_master` and everything halts on `stop_master`.
///
/// Implementations program registers only; ordering and interlocks are the
/// caller's job.
pub trait WaveformHardware {
    /// Halt the master counter (and with it every slaved counter)
    fn stop_master(&mut self);

    /// Disable output 1's PWM channel
    fn stop_pulse(&mut self);

    /// Disable a compare channel and its sequence transfer
    fn stop_sequence(&mut self, channel: SequenceChannel);

    /// Disable the bias DAC
    fn stop_bias_level(&mut self);

    /// Zero every counter so the next start begins at tick 0
    fn reset_counters(&mut self);

    /// Switch the outputs 1 and 2 range relays
    fn set_output_relays(&mut self, range: VoltageRange);

    /// Load and enable the bias DAC
    fn set_bias_level(&mut self, dac_code: u16) -> Result<(), HardwareError>;

    /// Set the period of all counters in ticks
    fn set_period(&mut self, period_ticks: u32) -> Result<(), HardwareError>;

    /// Configure output 1 as PWM high for `pulse_ticks` and enable it
    fn start_pulse(&mut self, pulse_ticks: u32) -> Result<(), HardwareError>;

    /// Start a circular compare sequence on a channel
    ///
    /// The implementation copies `sequence` into its own transfer buffer.
    fn start_sequence(
        &mut self,
        channel: SequenceChannel,
        sequence: &[u32; SEQUENCE_LEN],
    ) -> Result<(), HardwareError>;

    /// Release the master counter
    fn start_master(&mut self);
}
