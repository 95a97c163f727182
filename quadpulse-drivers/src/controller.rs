//! Control cycle coordinating settings, outputs and indicators
//!
//! The controller owns the device state, the waveform engine and the
//! indicator chain. Each cycle it:
//! - Applies host messages
//! - Applies front panel input
//! - Reprograms the outputs when a setting changed
//! - Refreshes the indicators, retrying while the chain is busy
//!
//! It does no I/O of its own; the caller drains the host queue, samples
//! the panel and acts on the returned [`Outcome`].

use quadpulse_core::config::DeviceConfig;
use quadpulse_core::indicator::indicator_colors;
use quadpulse_core::settings::SettingsError;
use quadpulse_core::state::{DeviceState, InputEvents};
use quadpulse_core::traits::{PulseStream, WaveformHardware};
use quadpulse_core::waveform::WaveformError;
use quadpulse_protocol::{ConfigPayload, HostMessage};

use crate::indicator::{IndicatorError, NeopixelSequencer};
use crate::waveform::WaveformEngine;

/// What one control cycle did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Outcome {
    /// Configuration to echo to the host, taken at the end of the cycle
    pub echo: Option<ConfigPayload>,
    /// A setting changed and the outputs were reprogrammed
    pub changed: bool,
    /// Last host configuration rejected this cycle
    pub rejected: Option<SettingsError>,
    /// Reprogramming failed; the outputs are stopped and the run toggle cleared
    pub fault: Option<WaveformError>,
    /// Indicator refresh did not go out (`Busy` is retried next cycle)
    pub indicators: Option<IndicatorError>,
}

/// Per-cycle coordinator
pub struct Controller<'a, H, S> {
    /// Settings and menu cursor
    state: DeviceState,
    /// Output timers
    engine: WaveformEngine<H>,
    /// Indicator frame builder
    indicators: NeopixelSequencer<'a>,
    /// Transport for indicator frames
    stream: S,
    /// Brightness cap for indicator colours
    led_brightness: u8,
    /// Indicators need sending
    indicators_pending: bool,
}

impl<'a, H: WaveformHardware, S: PulseStream> Controller<'a, H, S> {
    /// Create a controller in the power-on state
    ///
    /// The indicators are sent on the first cycle.
    pub fn new(
        engine: WaveformEngine<H>,
        indicators: NeopixelSequencer<'a>,
        stream: S,
        config: &DeviceConfig,
    ) -> Self {
        Self {
            state: DeviceState::new(),
            engine,
            indicators,
            stream,
            led_brightness: config.led_brightness,
            indicators_pending: true,
        }
    }

    /// Get current state
    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    /// Get access to the waveform engine
    pub fn engine(&self) -> &WaveformEngine<H> {
        &self.engine
    }

    /// Get access to the indicator stream
    pub fn stream(&self) -> &S {
        &self.stream
    }

    /// True while the outputs are generating
    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }

    /// Run one control cycle
    ///
    /// Host messages are handled in order before the panel input. A query
    /// never changes anything; it only asks for an echo.
    pub fn step<I>(&mut self, messages: I, events: &InputEvents) -> Outcome
    where
        I: IntoIterator<Item = HostMessage>,
    {
        let mut outcome = Outcome::default();
        let mut echo = false;
        let mut changed = false;

        for message in messages {
            match message {
                HostMessage::QueryConfig => echo = true,
                HostMessage::ApplyConfig(config) => match self.state.apply_remote(&config) {
                    Ok(()) => changed = true,
                    Err(e) => outcome.rejected = Some(e),
                },
            }
        }

        changed |= self.state.handle_input(events);

        if changed {
            outcome.changed = true;
            outcome.fault = self.reconfigure().err();
            self.indicators_pending = true;
            echo = true;
        }

        if self.indicators_pending {
            outcome.indicators = self.refresh_indicators().err();
            self.indicators_pending = outcome.indicators == Some(IndicatorError::Busy);
        }

        if echo {
            outcome.echo = Some(self.state.config_payload());
        }
        outcome
    }

    /// Bring the outputs in line with the settings
    fn reconfigure(&mut self) -> Result<(), WaveformError> {
        let params = self.state.run_parameters();
        if let Err(e) = self.engine.apply(&params) {
            self.engine.disable_all();
            self.state.settings.set_running(false);
            return Err(e);
        }
        Ok(())
    }

    fn refresh_indicators(&mut self) -> Result<(), IndicatorError> {
        let colors = indicator_colors(&self.state.run_parameters(), self.led_brightness);
        self.indicators.set_all(&colors)?;
        self.indicators.send(&mut self.stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::iter;
    use crate::indicator::neopixel::tests::MockStream;
    use crate::indicator::{TransmitFlag, LOW_BIT_TICKS};
    use crate::waveform::engine::tests::MockTimers;

    type TestController<'a> = Controller<'a, MockTimers, MockStream>;

    fn controller(flag: &TransmitFlag, hw: MockTimers) -> TestController<'_> {
        let config = DeviceConfig::default();
        let engine = WaveformEngine::new(hw, config.bias_full_scale_centivolts);
        Controller::new(engine, NeopixelSequencer::new(flag), MockStream::default(), &config)
    }

    fn idle() -> InputEvents {
        InputEvents::default()
    }

    fn running_config() -> ConfigPayload {
        ConfigPayload {
            frequency_raw: 1000,
            short_pulse: false,
            high_voltage: false,
            bias_raw: 250,
            running: true,
        }
    }

    #[test]
    fn test_query_replies_without_change() {
        let flag = TransmitFlag::new();
        let mut ctrl = controller(&flag, MockTimers::default());

        let outcome = ctrl.step([HostMessage::QueryConfig], &idle());

        assert_eq!(outcome.echo, Some(DeviceState::new().config_payload()));
        assert!(!outcome.changed);
        assert_eq!(*ctrl.state(), DeviceState::new());
        // Only the disable from construction touched the timers
        assert_eq!(ctrl.engine().hardware().counters_reset, 1);
        assert_eq!(ctrl.engine().hardware().period, None);
    }

    #[test]
    fn test_apply_reconfigures_and_echoes() {
        let flag = TransmitFlag::new();
        let mut ctrl = controller(&flag, MockTimers::default());
        let config = running_config();

        let outcome = ctrl.step([HostMessage::ApplyConfig(config)], &idle());

        assert!(outcome.changed);
        assert_eq!(outcome.echo, Some(config));
        assert_eq!(outcome.fault, None);
        assert!(ctrl.is_running());
        assert!(ctrl.engine().hardware().master_running);
        assert_eq!(ctrl.engine().hardware().period, Some(10_000));
    }

    #[test]
    fn test_rejected_apply_is_silent() {
        let flag = TransmitFlag::new();
        let mut ctrl = controller(&flag, MockTimers::default());
        let config = ConfigPayload {
            frequency_raw: 0,
            ..running_config()
        };

        let outcome = ctrl.step([HostMessage::ApplyConfig(config)], &idle());

        assert_eq!(outcome.rejected, Some(SettingsError::OutOfRange));
        assert_eq!(outcome.echo, None);
        assert!(!outcome.changed);
        assert_eq!(*ctrl.state(), DeviceState::new());
        assert!(!ctrl.is_running());
        assert_eq!(ctrl.engine().hardware().period, None);
    }

    #[test]
    fn test_engine_fault_stops_outputs() {
        let flag = TransmitFlag::new();
        let mut hw = MockTimers::default();
        hw.fail_period = true;
        let mut ctrl = controller(&flag, hw);

        let outcome = ctrl.step([HostMessage::ApplyConfig(running_config())], &idle());

        assert_eq!(outcome.fault, Some(WaveformError::ConfigError));
        assert!(ctrl.engine().hardware().all_stopped());
        assert!(!ctrl.is_running());

        // Nothing may claim the outputs are on
        assert!(!ctrl.state().settings.running());
        assert_eq!(outcome.echo.map(|c| c.running), Some(false));
        let sent = ctrl.stream().sent.as_ref().unwrap();
        assert!(sent.iter().all(|&d| d == LOW_BIT_TICKS));
    }

    #[test]
    fn test_busy_indicators_retry() {
        let flag = TransmitFlag::new();
        let mut ctrl = controller(&flag, MockTimers::default());

        // Start-up refresh claims the chain
        assert_eq!(ctrl.step(iter::empty(), &idle()).indicators, None);
        assert_eq!(ctrl.stream().starts, 1);

        let enable = InputEvents {
            enable: true,
            ..idle()
        };
        let outcome = ctrl.step(iter::empty(), &enable);
        assert!(outcome.changed);
        assert_eq!(outcome.indicators, Some(IndicatorError::Busy));

        // Still in flight
        assert_eq!(ctrl.step(iter::empty(), &idle()).indicators, Some(IndicatorError::Busy));
        assert_eq!(ctrl.stream().starts, 1);

        flag.release();
        assert_eq!(ctrl.step(iter::empty(), &idle()).indicators, None);
        assert_eq!(ctrl.stream().starts, 2);
        let sent = ctrl.stream().sent.as_ref().unwrap();
        assert!(sent.iter().any(|&d| d != LOW_BIT_TICKS));

        // Delivered, so nothing more to send
        flag.release();
        ctrl.step(iter::empty(), &idle());
        assert_eq!(ctrl.stream().starts, 2);
    }

    #[test]
    fn test_panel_change_echoes() {
        let flag = TransmitFlag::new();
        let mut ctrl = controller(&flag, MockTimers::default());
        let mode = InputEvents {
            mode: true,
            ..idle()
        };

        let outcome = ctrl.step(iter::empty(), &mode);

        assert!(outcome.changed);
        assert_eq!(outcome.echo.map(|c| c.high_voltage), Some(true));
        // Not enabled, so the outputs stay off
        assert!(!ctrl.is_running());
    }
}
