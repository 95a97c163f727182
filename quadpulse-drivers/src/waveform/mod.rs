//! Output waveform engine

pub mod engine;

pub use engine::{ActiveOutput, WaveformEngine};
