//! Front panel input
//!
//! Buttons are sampled once per control cycle. The encoder is decoded on
//! every line edge and drained one detent per cycle.

pub mod button;
pub mod encoder;
pub mod scanner;

pub use button::Button;
pub use encoder::{QuadratureDecoder, Rotation, RotationCounter};
pub use scanner::{Buttons, InputScanner};
