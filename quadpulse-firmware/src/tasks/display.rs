//! Display refresh task

use defmt::*;
use embassy_time::{Duration, Ticker};

use quadpulse_core::display::render;

use crate::channels::DISPLAY_SNAPSHOT;
use crate::oled::OledStatus;

/// Display task - redraws the menu from the latest snapshot
#[embassy_executor::task]
pub async fn display_task(mut display: OledStatus, period_ms: u32) {
    info!("Display task started");

    let mut ticker = Ticker::every(Duration::from_millis(period_ms as u64));
    let mut last = None;

    loop {
        let state = DISPLAY_SNAPSHOT.lock(|snapshot| snapshot.get());

        if last != Some(state) {
            match render(&mut display, &state) {
                Ok(()) => {
                    last = Some(state);
                    trace!("Display updated");
                }
                Err(e) => warn!("Display update failed: {:?}", e),
            }
        }

        ticker.next().await;
    }
}
