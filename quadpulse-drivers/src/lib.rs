//! Hardware driver implementations
//!
//! This crate provides the drivers that sit on top of the traits defined
//! in quadpulse-core:
//!
//! - Waveform engine (sequencing and interlocks for the output timers)
//! - NeoPixel indicator sequencer
//! - Quadrature encoder decoding and button edge detection
//! - Control cycle tying settings, outputs and indicators together

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod controller;
pub mod indicator;
pub mod input;
pub mod waveform;
