//! Serial LED transmit trait

use super::waveform::HardwareError;

/// Pulse-width stream feeding a serial LED chain
///
/// Each value is the high time of one bit. `start` only queues the
/// transfer; completion is reported separately by whoever owns the
/// transfer, since it arrives from interrupt context.
pub trait PulseStream {
    fn start(&mut self, duties: &[u16]) -> Result<(), HardwareError>;
}
