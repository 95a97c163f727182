//! Device state and input handling
//!
//! Raw input edges are batched into `InputEvents` once per control cycle
//! and applied to the `DeviceState`, which owns the settings and the
//! navigation cursor.

pub mod device;
pub mod events;
pub mod machine;

pub use device::DeviceState;
pub use events::InputEvents;
pub use machine::{Mode, NavigationCursor};
