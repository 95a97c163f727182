//! Indicator chain transmit task
//!
//! Streams bit widths into TIM1 CH1 through the update DMA, one PWM period
//! per bit, then holds the line low for the latch.

use defmt::*;
use embassy_stm32::peripherals::{DMA2_CH5, TIM1};
use embassy_stm32::timer::simple_pwm::SimplePwm;
use embassy_stm32::timer::Channel;
use embassy_stm32::Peri;

use quadpulse_drivers::indicator::{BIT_PERIOD_TICKS, LED_BUFFER_LEN};

use crate::channels::{LED_FRAME, LED_TX};

/// Low bit slots appended for the latch (>50 µs)
const LATCH_SLOTS: usize = 40;

/// LED task - sends frames and releases the busy flag when done
#[embassy_executor::task]
pub async fn led_task(mut pwm: SimplePwm<'static, TIM1>, mut dma: Peri<'static, DMA2_CH5>) {
    info!("LED task started");

    let mut duties = [0u16; LED_BUFFER_LEN + LATCH_SLOTS];

    loop {
        let frame = LED_FRAME.wait().await;

        let max_duty = pwm.max_duty_cycle() as u32;
        for (out, &ticks) in duties.iter_mut().zip(frame.iter()) {
            *out = (ticks as u32 * max_duty / BIT_PERIOD_TICKS as u32) as u16;
        }

        pwm.waveform_up(dma.reborrow(), Channel::Ch1, &duties).await;
        LED_TX.release();
        trace!("LED frame sent");
    }
}
