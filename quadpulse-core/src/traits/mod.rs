//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod display;
pub mod indicator;
pub mod waveform;

pub use display::{DisplayError, StatusDisplay};
pub use indicator::PulseStream;
pub use waveform::{HardwareError, SequenceChannel, WaveformHardware};
