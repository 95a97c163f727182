//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use quadpulse_core::state::DeviceState;
use quadpulse_drivers::indicator::{TransmitFlag, LED_BUFFER_LEN};
use quadpulse_drivers::input::RotationCounter;
use quadpulse_protocol::{ConfigPayload, HostMessage};

/// Channel capacity for host messages
const HOST_CHANNEL_SIZE: usize = 4;

/// Channel capacity for outgoing configuration reports
const REPORT_CHANNEL_SIZE: usize = 4;

/// Messages decoded from the host link
pub static HOST_MSG: Channel<CriticalSectionRawMutex, HostMessage, HOST_CHANNEL_SIZE> =
    Channel::new();

/// Configuration reports to send to the host
pub static CONFIG_REPORT: Channel<CriticalSectionRawMutex, ConfigPayload, REPORT_CHANNEL_SIZE> =
    Channel::new();

/// Bit pulse widths for the next LED chain transfer
pub static LED_FRAME: Signal<CriticalSectionRawMutex, [u16; LED_BUFFER_LEN]> = Signal::new();

/// Set while an LED chain transfer is in flight
pub static LED_TX: TransmitFlag = TransmitFlag::new();

/// Encoder detents not yet consumed by the control loop
pub static ROTATION: RotationCounter = RotationCounter::new();

/// Latest device state for the display task
pub static DISPLAY_SNAPSHOT: Mutex<CriticalSectionRawMutex, Cell<DeviceState>> =
    Mutex::new(Cell::new(DeviceState::new()));
