//! Rotary encoder task
//!
//! Decodes every edge on either line and banks detents for the control
//! loop to drain.

use defmt::*;
use embassy_futures::select::select;
use embassy_stm32::exti::ExtiInput;

use quadpulse_drivers::input::QuadratureDecoder;

use crate::channels::ROTATION;

/// Encoder task - feeds the shared rotation counter
#[embassy_executor::task]
pub async fn encoder_task(mut a: ExtiInput<'static>, mut b: ExtiInput<'static>) {
    info!("Encoder task started");

    let mut decoder = QuadratureDecoder::new();

    loop {
        select(a.wait_for_any_edge(), b.wait_for_any_edge()).await;

        if let Some(rotation) = decoder.update(a.is_high(), b.is_high()) {
            ROTATION.record(rotation);
            trace!("Encoder: {:?}", rotation);
        }
    }
}
