//! Host link receive task
//!
//! Reassembles frames from the byte stream and forwards recognised
//! messages to the control loop.

use defmt::*;
use embassy_stm32::usart::BufferedUartRx;
use embassy_time::{Duration, Timer};
use embedded_io_async::Read;

use quadpulse_hal_stm32f4::UartBusError;
use quadpulse_protocol::{FrameAssembler, HostMessage, FRAME_DELIMITER};

use crate::channels::HOST_MSG;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Serial RX task - receives and parses frames from the host
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx<'static>) {
    info!("Serial RX task started");

    let mut assembler = FrameAssembler::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    if byte == FRAME_DELIMITER && assembler.overflowed_bytes() > 0 {
                        warn!("Frame too long, {} bytes dropped", assembler.overflowed_bytes());
                    }
                    let Some(payload) = assembler.feed(byte) else {
                        continue;
                    };

                    match HostMessage::from_payload(&payload) {
                        Some(msg) => {
                            if HOST_MSG.try_send(msg).is_err() {
                                warn!("Host channel full, dropping message");
                            }
                        }
                        None => {
                            debug!("Ignoring {} byte payload", payload.len());
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                let e = UartBusError::from(e);
                warn!("UART read error: {:?}", e);
                if !e.is_recoverable() {
                    assembler.reset();
                    Timer::after(Duration::from_millis(10)).await;
                }
            }
        }
    }
}
