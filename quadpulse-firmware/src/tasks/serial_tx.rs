//! Host link transmit task
//!
//! Frames and sends configuration reports queued by the control loop.

use defmt::*;
use embassy_stm32::usart::BufferedUartTx;
use embedded_io_async::Write;

use quadpulse_protocol::{encode, MAX_FRAME_SIZE};

use crate::channels::CONFIG_REPORT;

/// Serial TX task - sends configuration reports to the host
#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx<'static>) {
    info!("Serial TX task started");

    let mut buf = [0u8; MAX_FRAME_SIZE];

    loop {
        let payload = CONFIG_REPORT.receive().await;

        let len = match encode(&payload.to_bytes(), &mut buf) {
            Ok(len) => len,
            Err(e) => {
                warn!("Failed to frame config: {:?}", e);
                continue;
            }
        };

        if let Err(e) = tx.write_all(&buf[..len]).await {
            warn!("Failed to send config: {:?}", e);
        } else {
            trace!("Config sent ({} bytes)", len);
        }
    }
}
