//! Serial colour indicators

pub mod neopixel;

pub use neopixel::{
    IndicatorError, NeopixelSequencer, TransmitFlag, BITS_PER_LED, BIT_PERIOD_TICKS,
    HIGH_BIT_TICKS, LED_BUFFER_LEN, LOW_BIT_TICKS,
};
