//! Waveform engine
//!
//! Owns the output timers and is the only code that starts or stops them.
//! Every reconfiguration stops everything first, so a half-programmed set
//! of channels never runs.

use quadpulse_core::traits::{HardwareError, SequenceChannel, WaveformHardware};
use quadpulse_core::waveform::{
    BiasLevel, BiasPath, ChannelTimingPlan, OutputChannel, RunParameters, VoltageRange,
    WaveformError,
};

/// What is currently being generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActiveOutput {
    pub plan: ChannelTimingPlan,
    pub bias: BiasLevel,
    pub voltage_range: VoltageRange,
}

/// Drives a `WaveformHardware` from run parameters
pub struct WaveformEngine<H> {
    hw: H,
    bias_full_scale_centivolts: u16,
    active: Option<ActiveOutput>,
}

impl<H: WaveformHardware> WaveformEngine<H> {
    /// Take ownership of the timers and make sure they are stopped
    pub fn new(hw: H, bias_full_scale_centivolts: u16) -> Self {
        let mut engine = Self {
            hw,
            bias_full_scale_centivolts,
            active: None,
        };
        engine.disable_all();
        engine
    }

    /// Start or stop the outputs to match the parameters
    pub fn apply(&mut self, params: &RunParameters) -> Result<(), WaveformError> {
        if params.running {
            self.enable(params).map(|_| ())
        } else {
            self.disable_all();
            Ok(())
        }
    }

    /// Reprogram and start all outputs
    ///
    /// Outputs are stopped first and stay stopped if anything fails.
    /// Single-shot parameters run continuously.
    pub fn enable(&mut self, params: &RunParameters) -> Result<&ActiveOutput, WaveformError> {
        self.disable_all();

        let plan = ChannelTimingPlan::compute(params.period_ticks, params.shape)?;
        let bias = BiasLevel::compute(params.bias_centivolts, self.bias_full_scale_centivolts)?;

        if let Err(e) = self.program(&plan, &bias, params.voltage_range) {
            self.disable_all();
            return Err(e.into());
        }

        Ok(self.active.insert(ActiveOutput {
            plan,
            bias,
            voltage_range: params.voltage_range,
        }))
    }

    fn program(
        &mut self,
        plan: &ChannelTimingPlan,
        bias: &BiasLevel,
        range: VoltageRange,
    ) -> Result<(), HardwareError> {
        self.hw.set_bias_level(bias.dac_code)?;
        self.hw.set_output_relays(range);
        self.hw.set_period(plan.period_ticks)?;

        self.hw.start_pulse(plan.pwm_pulse())?;
        self.hw.start_sequence(
            SequenceChannel::Out2,
            &plan.channel(OutputChannel::Out2).compare_sequence(),
        )?;
        self.hw.start_sequence(
            SequenceChannel::Out3,
            &plan.channel(OutputChannel::Out3).compare_sequence(),
        )?;

        let out4 = match bias.path {
            BiasPath::Positive => SequenceChannel::Out4Positive,
            BiasPath::Negative => SequenceChannel::Out4Negative,
        };
        self.hw
            .start_sequence(out4, &plan.channel(OutputChannel::Out4).compare_sequence())?;

        self.hw.start_master();
        Ok(())
    }

    /// Stop every output and zero the counters
    ///
    /// Safe to call at any time, any number of times.
    pub fn disable_all(&mut self) {
        self.hw.stop_master();
        self.hw.stop_pulse();
        for channel in SequenceChannel::ALL {
            self.hw.stop_sequence(channel);
        }
        self.hw.stop_bias_level();
        self.hw.reset_counters();
        self.active = None;
    }

    /// True while the outputs are generating
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// The configuration currently running, if any
    pub fn active(&self) -> Option<&ActiveOutput> {
        self.active.as_ref()
    }

    /// Get access to the underlying timers
    pub fn hardware(&self) -> &H {
        &self.hw
    }
}
