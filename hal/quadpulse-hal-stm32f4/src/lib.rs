//! STM32F4-specific HAL for the QuadPulse firmware
//!
//! Implements `quadpulse_core::traits::WaveformHardware` on the STM32F4
//! advanced and 32-bit general purpose timers, and provides serial helpers
//! for the host link.
//!
//! # Features
//!
//! - `stm32f407vg` - STM32F407VGT6 (reference board)
//! - `stm32f405rg` - STM32F405RGT6
//! - `defmt` - Enable debug formatting support
//!
//! # Usage
//!
//! Timer and DMA registers are programmed through `embassy_stm32::pac`
//! because embassy has no driver for trigger-chained timers with circular
//! compare DMA. Everything else (UART, I2C, GPIO) goes through embassy
//! drivers in the firmware.

#![no_std]

pub mod dma;
pub mod timers;
pub mod uart;

pub use timers::{OutputTimers, SequenceBuffers, TIMER_TICK_HZ};
pub use uart::{UartBusError, UartConfig};
