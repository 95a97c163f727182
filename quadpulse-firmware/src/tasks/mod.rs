//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod control;
pub mod display;
pub mod encoder;
pub mod led;
pub mod serial_rx;
pub mod serial_tx;

pub use control::control_task;
pub use display::display_task;
pub use encoder::encoder_task;
pub use led::led_task;
pub use serial_rx::serial_rx_task;
pub use serial_tx::serial_tx_task;
