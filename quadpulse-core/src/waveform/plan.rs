//! Per-channel timing plan
//!
//! All offsets are 100 ns ticks measured from the start of output 1's
//! period. Output 1 rises at tick 0 in PWM mode; the other three channels
//! toggle on compare matches fed from a repeating `[rise, fall]` sequence.
//!
//! ```text
//!          0   ts  2ts                         fall4-3ts   fall4
//! out1     ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|_______________
//! out2     ____|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|________
//! out3     ________|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|________
//! out4     ________|‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾|
//! ```
//! (standard shape; outputs 2 and 3 both fall at `fall4 - 2ts`)

use super::params::PulseShape;
use super::WaveformError;

/// Periods at or above this use a 50% output 4 duty cycle
pub const HALF_DUTY_CUTOFF: u32 = 500;

/// Periods below this shrink the time step
pub const SCALED_STEP_CUTOFF: u32 = 350;

/// Spacing between channel edges at normal rates (5 µs)
pub const MAX_TIME_STEP: u32 = 50;

/// High time of short pulses (2 µs)
pub const SHORT_PULSE_TICKS: u32 = 20;

/// Output 4 low time in time steps when the duty cycle is shortened
pub const CH4_LOW_STEPS: u32 = 3;

/// `[rise, fall]` pairs per compare sequence
pub const SEQUENCE_REPEATS: usize = 10;

/// Length of a compare sequence
pub const SEQUENCE_LEN: usize = 2 * SEQUENCE_REPEATS;

/// Physical output channels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputChannel {
    Out1 = 0,
    Out2 = 1,
    Out3 = 2,
    Out4 = 3,
}

impl OutputChannel {
    pub const ALL: [OutputChannel; 4] = [
        OutputChannel::Out1,
        OutputChannel::Out2,
        OutputChannel::Out3,
        OutputChannel::Out4,
    ];

    /// Position in per-channel arrays
    pub fn index(self) -> usize {
        self as usize
    }
}

/// How the time step and output 4 fall are chosen for a period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeStepPolicy {
    /// Full time step, output 4 high for half the period
    HalfPeriod,
    /// Full time step, output 4 low for three steps
    ShortenedLow,
    /// Time step scaled with the period, output 4 low for three steps
    ScaledStep,
}

impl TimeStepPolicy {
    /// Pick the policy for a period
    pub fn select(period_ticks: u32) -> Self {
        if period_ticks >= HALF_DUTY_CUTOFF {
            TimeStepPolicy::HalfPeriod
        } else if period_ticks >= SCALED_STEP_CUTOFF {
            TimeStepPolicy::ShortenedLow
        } else {
            TimeStepPolicy::ScaledStep
        }
    }

    /// Edge spacing for this period (truncated)
    pub fn time_step(self, period_ticks: u32) -> u32 {
        match self {
            TimeStepPolicy::HalfPeriod | TimeStepPolicy::ShortenedLow => MAX_TIME_STEP,
            TimeStepPolicy::ScaledStep => {
                (MAX_TIME_STEP as u64 * period_ticks as u64 / SCALED_STEP_CUTOFF as u64) as u32
            }
        }
    }

    /// Output 4 fall before shifting onto output 1's origin
    pub fn base_fall(self, period_ticks: u32, time_step: u32) -> Option<u32> {
        match self {
            TimeStepPolicy::HalfPeriod => {
                let half = period_ticks / 2;
                Some(if period_ticks % 2 == 1 { half - 1 } else { half })
            }
            TimeStepPolicy::ShortenedLow | TimeStepPolicy::ScaledStep => {
                period_ticks.checked_sub(CH4_LOW_STEPS.checked_mul(time_step)?)
            }
        }
    }
}

/// Rise and fall offsets of one channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelTiming {
    pub rise: u32,
    pub fall: u32,
}

impl ChannelTiming {
    /// Compare sequence of repeated `[rise, fall]` pairs
    pub fn compare_sequence(&self) -> [u32; SEQUENCE_LEN] {
        let mut sequence = [0u32; SEQUENCE_LEN];
        for pair in sequence.chunks_exact_mut(2) {
            pair[0] = self.rise;
            pair[1] = self.fall;
        }
        sequence
    }
}

/// Timing for all four channels over one period
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelTimingPlan {
    pub period_ticks: u32,
    pub policy: TimeStepPolicy,
    pub time_step: u32,
    pub channels: [ChannelTiming; 4],
}

impl ChannelTimingPlan {
    /// Compute the plan for a period and pulse shape
    ///
    /// Fails with `BadRange` when the period is too short to place every
    /// edge strictly inside it in order.
    pub fn compute(period_ticks: u32, shape: PulseShape) -> Result<Self, WaveformError> {
        if period_ticks == 0 {
            return Err(WaveformError::BadRange);
        }

        let policy = TimeStepPolicy::select(period_ticks);
        let ts = policy.time_step(period_ticks);
        if ts == 0 {
            return Err(WaveformError::BadRange);
        }

        let base_fall = policy
            .base_fall(period_ticks, ts)
            .ok_or(WaveformError::BadRange)?;

        let shift = |value: u32, steps: u32| -> Result<u32, WaveformError> {
            steps
                .checked_mul(ts)
                .and_then(|offset| value.checked_add(offset))
                .ok_or(WaveformError::BadRange)
        };
        let back = |value: u32, steps: u32| -> Result<u32, WaveformError> {
            steps
                .checked_mul(ts)
                .and_then(|offset| value.checked_sub(offset))
                .ok_or(WaveformError::BadRange)
        };

        let ch4_rise = shift(0, 2)?;
        let ch4_fall = shift(base_fall, 2)?;
        let ch2_rise = ts;

        let (ch1_fall, ch2_fall) = match shape {
            PulseShape::Standard => (back(ch4_fall, 3)?, back(ch4_fall, 2)?),
            PulseShape::Short => (SHORT_PULSE_TICKS, ch2_rise + SHORT_PULSE_TICKS),
        };

        let plan = Self {
            period_ticks,
            policy,
            time_step: ts,
            channels: [
                ChannelTiming {
                    rise: 0,
                    fall: ch1_fall,
                },
                ChannelTiming {
                    rise: ch2_rise,
                    fall: ch2_fall,
                },
                ChannelTiming {
                    rise: ch4_rise,
                    fall: back(ch4_fall, 2)?,
                },
                ChannelTiming {
                    rise: ch4_rise,
                    fall: ch4_fall,
                },
            ],
        };

        if plan
            .channels
            .iter()
            .all(|c| c.rise < c.fall && c.fall < period_ticks)
        {
            Ok(plan)
        } else {
            Err(WaveformError::BadRange)
        }
    }

    /// Timing for one output
    pub fn channel(&self, channel: OutputChannel) -> &ChannelTiming {
        &self.channels[channel.index()]
    }

    /// PWM compare value for output 1
    pub fn pwm_pulse(&self) -> u32 {
        self.channel(OutputChannel::Out1).fall
    }
}
