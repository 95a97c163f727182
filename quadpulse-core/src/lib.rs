//! Board-agnostic core logic for the QuadPulse stimulator
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Settings model and the navigation/input state machine
//! - Run parameter derivation and per-channel timing plans
//! - Indicator colour policy and display row layout
//! - Hardware abstraction traits (output timers, LED stream, display)
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod display;
pub mod indicator;
pub mod settings;
pub mod state;
pub mod traits;
pub mod waveform;
