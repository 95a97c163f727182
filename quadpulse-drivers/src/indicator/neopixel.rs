//! NeoPixel bit sequencer
//!
//! Each LED takes 24 bits in GRB order, most significant bit first. A bit
//! is one PWM period of 30 ticks at 20 MHz (1.5 µs) whose high time
//! encodes the value:
//!
//! ```text
//!  1:  ‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾______________   15 ticks high
//!  0:  ‾‾‾‾‾‾________________________    6 ticks high
//! ```
//!
//! The LEDs are chained in the opposite order to the outputs they label,
//! so logical indicator 0 is the last one on the wire.

use portable_atomic::{AtomicBool, Ordering};
use quadpulse_core::indicator::NUM_INDICATORS;
use quadpulse_core::traits::PulseStream;
use smart_leds::RGB8;

/// PWM period of one bit (ticks at 20 MHz)
pub const BIT_PERIOD_TICKS: u16 = 30;

/// High time of a 1 bit
pub const HIGH_BIT_TICKS: u16 = 15;

/// High time of a 0 bit
pub const LOW_BIT_TICKS: u16 = 6;

/// Bits per LED
pub const BITS_PER_LED: usize = 24;

/// Length of the whole chain's duty buffer
pub const LED_BUFFER_LEN: usize = NUM_INDICATORS * BITS_PER_LED;

/// Errors from indicator updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorError {
    /// A transmission is still in flight
    Busy,
    /// No indicator with that index
    BadRange,
}

/// In-flight marker shared with the transfer completion handler
///
/// Set by the sequencer when a transfer starts, cleared by whoever sees the
/// transfer finish. One writer per direction.
pub struct TransmitFlag {
    busy: AtomicBool,
}

impl TransmitFlag {
    /// Flag with no transfer in flight
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// True between a claim and its release
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Mark a transfer started; false if one already was
    fn try_claim(&self) -> bool {
        !self.busy.swap(true, Ordering::AcqRel)
    }

    /// Mark the transfer finished
    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }
}

impl Default for TransmitFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds and sends the duty buffer for the indicator chain
pub struct NeopixelSequencer<'a> {
    buffer: [u16; LED_BUFFER_LEN],
    flag: &'a TransmitFlag,
}

impl<'a> NeopixelSequencer<'a> {
    /// All indicators off
    pub fn new(flag: &'a TransmitFlag) -> Self {
        Self {
            buffer: [LOW_BIT_TICKS; LED_BUFFER_LEN],
            flag,
        }
    }

    /// Set one indicator's colour in the buffer
    ///
    /// Rejected while a transmission is in flight, since the transfer reads
    /// the buffer.
    pub fn set_color(&mut self, index: usize, color: RGB8) -> Result<(), IndicatorError> {
        if self.flag.is_busy() {
            return Err(IndicatorError::Busy);
        }
        if index >= NUM_INDICATORS {
            return Err(IndicatorError::BadRange);
        }

        let position = NUM_INDICATORS - index - 1;
        let bits = (color.g as u32) << 16 | (color.r as u32) << 8 | color.b as u32;
        let slot = &mut self.buffer[position * BITS_PER_LED..(position + 1) * BITS_PER_LED];
        for (i, duty) in slot.iter_mut().enumerate() {
            let bit = BITS_PER_LED - 1 - i;
            *duty = if bits & (1 << bit) != 0 {
                HIGH_BIT_TICKS
            } else {
                LOW_BIT_TICKS
            };
        }
        Ok(())
    }

    /// Set every indicator, in logical order
    pub fn set_all(&mut self, colors: &[RGB8; NUM_INDICATORS]) -> Result<(), IndicatorError> {
        for (index, color) in colors.iter().enumerate() {
            self.set_color(index, *color)?;
        }
        Ok(())
    }

    /// Start transmitting the buffer
    ///
    /// The flag stays set until `TransmitFlag::release` is called on
    /// completion.
    pub fn send<S: PulseStream>(&mut self, stream: &mut S) -> Result<(), IndicatorError> {
        if !self.flag.try_claim() {
            return Err(IndicatorError::Busy);
        }
        if stream.start(&self.buffer).is_err() {
            self.flag.release();
            return Err(IndicatorError::Busy);
        }
        Ok(())
    }

    /// True while the previous frame is still being sent
    pub fn is_busy(&self) -> bool {
        self.flag.is_busy()
    }

    /// Pulse widths of the last encoded frame
    pub fn buffer(&self) -> &[u16; LED_BUFFER_LEN] {
        &self.buffer
    }
}
