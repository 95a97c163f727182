//! Main control loop
//!
//! Feeds host messages and front panel input to the controller every
//! cycle, then publishes the result to the host and the display.

use defmt::*;
use embassy_stm32::gpio::Input;
use embassy_time::{Duration, Ticker};

use quadpulse_core::config::DeviceConfig;
use quadpulse_core::traits::{HardwareError, PulseStream};
use quadpulse_drivers::controller::{Controller, Outcome};
use quadpulse_drivers::indicator::{IndicatorError, LED_BUFFER_LEN};
use quadpulse_drivers::input::InputScanner;
use quadpulse_hal_stm32f4::OutputTimers;

use crate::channels::{CONFIG_REPORT, DISPLAY_SNAPSHOT, HOST_MSG, LED_FRAME};

/// Hands the duty buffer to the LED task
pub struct LedFrameStream;

impl PulseStream for LedFrameStream {
    fn start(&mut self, duties: &[u16]) -> Result<(), HardwareError> {
        let frame: [u16; LED_BUFFER_LEN] =
            duties.try_into().map_err(|_| HardwareError::InvalidValue)?;
        LED_FRAME.signal(frame);
        Ok(())
    }
}

/// Control task - main coordination loop
#[embassy_executor::task]
pub async fn control_task(
    mut controller: Controller<'static, OutputTimers, LedFrameStream>,
    mut scanner: InputScanner<'static, Input<'static>>,
    config: DeviceConfig,
) {
    info!("Control task started");

    let mut ticker = Ticker::every(Duration::from_millis(config.control_period_ms as u64));

    loop {
        let messages = core::iter::from_fn(|| HOST_MSG.try_receive().ok())
            .inspect(|msg| debug!("Host message: {:?}", msg));

        let events = scanner.poll();
        if !events.is_empty() {
            trace!("Input: {:?}", events);
        }

        let outcome = controller.step(messages, &events);
        log_outcome(&controller, &outcome);

        if let Some(payload) = outcome.echo {
            if CONFIG_REPORT.try_send(payload).is_err() {
                warn!("Report channel full, dropping config");
            }
        }

        DISPLAY_SNAPSHOT.lock(|snapshot| snapshot.set(*controller.state()));

        ticker.next().await;
    }
}

fn log_outcome(controller: &Controller<'static, OutputTimers, LedFrameStream>, outcome: &Outcome) {
    if let Some(e) = outcome.rejected {
        debug!("Config rejected: {:?}", e);
    }

    if outcome.changed {
        match outcome.fault {
            Some(e) => warn!("Output configuration failed, outputs stopped: {:?}", e),
            None => match controller.engine().active() {
                Some(active) => info!("Outputs running, period {} ticks", active.plan.period_ticks),
                None => info!("Outputs stopped"),
            },
        }
    }

    match outcome.indicators {
        Some(IndicatorError::Busy) => trace!("LED chain busy, retrying"),
        Some(e) => warn!("Indicator update failed: {:?}", e),
        None => {}
    }
}
