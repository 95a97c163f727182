//! User-adjustable settings
//!
//! The registry is the single source of truth for everything the user or
//! the host can change. Local input and remote configuration both write
//! through it.

pub mod registry;
pub mod setting;

pub use registry::{SettingSlot, SettingsRegistry, NUM_SETTINGS};
pub use setting::{Continuous, Setting, SettingKind, SettingsError, Toggle};
